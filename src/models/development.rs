use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::moderation::ApprovalStatus;

/// A project / development listing (a whole estate rather than a single unit).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Development {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub location: String,
    pub developer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub key_highlights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    pub status: DevelopmentStatus,
    pub approval_status: ApprovalStatus,
    pub submitted_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentStatus {
    Upcoming,
    Trending,
    Launched,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDevelopmentDto {
    #[validate(length(min = 3, max = 150, message = "Name must be between 3 and 150 characters"))]
    pub name: String,
    #[validate(length(min = 2, max = 200, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 2, max = 150, message = "Developer is required"))]
    pub developer: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one key highlight is required"))]
    pub key_highlights: Vec<String>,
    pub amenities: Option<Vec<String>>,
    pub price_range: Option<String>,
    pub status: DevelopmentStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDevelopmentDto {
    #[validate(length(min = 3, max = 150, message = "Name must be between 3 and 150 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 200, message = "Location is required"))]
    pub location: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Developer is required"))]
    pub developer: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "At least one key highlight is required"))]
    pub key_highlights: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub price_range: Option<String>,
    pub status: Option<DevelopmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_highlights_fail_validation() {
        let dto = CreateDevelopmentDto {
            name: "Riverside Gardens".to_string(),
            location: "Austin, TX".to_string(),
            developer: "Lonestar Homes".to_string(),
            description: None,
            key_highlights: vec![],
            amenities: None,
            price_range: None,
            status: DevelopmentStatus::Upcoming,
        };

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("key_highlights"));
    }

    #[test]
    fn status_serializes_as_plain_name() {
        let value = serde_json::to_value(DevelopmentStatus::Trending).unwrap();
        assert_eq!(value, "Trending");
    }
}
