use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::moderation::ApprovalStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlogPost {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    /// Derived from the title at submission time; not user-editable.
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub category: BlogCategory,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub approval_status: ApprovalStatus,
    pub submitted_by: ObjectId,
    pub author_name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BlogCategory {
    #[serde(rename = "Market Trends")]
    MarketTrends,
    #[serde(rename = "Buying Guide")]
    BuyingGuide,
    #[serde(rename = "Selling Tips")]
    SellingTips,
    Investment,
    Lifestyle,
    News,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogPostDto {
    #[validate(length(min = 5, max = 150, message = "Title must be between 5 and 150 characters"))]
    pub title: String,
    #[validate(length(min = 50, message = "Content must be at least 50 characters"))]
    pub content: String,
    #[validate(length(max = 300, message = "Excerpt must be at most 300 characters"))]
    pub excerpt: Option<String>,
    #[validate(url(message = "Cover image must be a valid URL"))]
    pub cover_image: Option<String>,
    pub category: BlogCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Authors may park a post as a draft; defaults to published.
    pub status: Option<BlogStatus>,
}

/// URL-safe slug from the title, disambiguated with a millisecond timestamp so
/// two posts with the same title never collide.
pub fn derive_slug(title: &str, millis: i64) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("post");
    }
    format!("{}-{}", slug, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_and_url_safe() {
        let slug = derive_slug("Top 10 Tips for First-Time Buyers!", 1700000000000);
        assert_eq!(slug, "top-10-tips-for-first-time-buyers-1700000000000");
    }

    #[test]
    fn slug_collapses_consecutive_separators() {
        let slug = derive_slug("  Hello --- World  ", 42);
        assert_eq!(slug, "hello-world-42");
    }

    #[test]
    fn slug_of_symbol_only_title_falls_back() {
        let slug = derive_slug("???", 7);
        assert_eq!(slug, "post-7");
    }

    #[test]
    fn slug_is_deterministic_for_same_inputs() {
        assert_eq!(derive_slug("Same Title", 1), derive_slug("Same Title", 1));
        assert_ne!(derive_slug("Same Title", 1), derive_slug("Same Title", 2));
    }

    #[test]
    fn blog_status_uses_lowercase_wire_values() {
        assert_eq!(serde_json::to_value(BlogStatus::Published).unwrap(), "published");
        assert_eq!(BlogStatus::Draft.as_str(), "draft");
    }

    #[test]
    fn short_content_fails_validation() {
        let dto = CreateBlogPostDto {
            title: "Spring market outlook".to_string(),
            content: "Too short.".to_string(),
            excerpt: None,
            cover_image: None,
            category: BlogCategory::MarketTrends,
            tags: vec![],
            status: None,
        };

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("content"));
    }
}
