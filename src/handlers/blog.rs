use actix_web::{get, patch, post, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    Collection, Database,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::{require_admin, require_auth},
    models::blog::{derive_slug, BlogPost, BlogStatus, CreateBlogPostDto},
    moderation::{ApprovalStatus, ModerationPolicy},
    pagination::{PageQuery, Paginated},
    responses,
};

use super::find_page;

fn blog_posts(db: &Database) -> Collection<BlogPost> {
    db.collection::<BlogPost>("blog_posts")
}

/// Filter shared by every public blog read: live posts only.
fn public_filter() -> Document {
    doc! {
        "status": BlogStatus::Published.as_str(),
        "approval_status": ApprovalStatus::Approved.as_str(),
    }
}

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

impl BlogListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[get("/blog/posts")]
pub async fn list_posts(
    db: web::Data<Database>,
    query: web::Query<BlogListQuery>,
) -> AppResult<HttpResponse> {
    let mut filter = public_filter();
    if let Some(category) = &query.category {
        filter.insert("category", category);
    }

    let page = query.page_query();
    let (items, total) = find_page(&blog_posts(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[get("/blog/posts/{slug}")]
pub async fn get_post_by_slug(
    db: web::Data<Database>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut filter = public_filter();
    filter.insert("slug", slug.as_str());

    let post = blog_posts(&db)
        .find_one(filter, None)
        .await?
        .ok_or(AppError::NotFound("Blog post"))?;

    Ok(responses::ok(post))
}

#[post("/blog/posts")]
pub async fn create_post(
    req: HttpRequest,
    db: web::Data<Database>,
    post_data: web::Json<CreateBlogPostDto>,
) -> AppResult<HttpResponse> {
    post_data.validate()?;
    let caller = require_auth(&req.extensions())?;

    let now_millis = Utc::now().timestamp_millis();
    let now = DateTime::from_millis(now_millis);
    let mut post = BlogPost {
        id: None,
        title: post_data.title.clone(),
        slug: derive_slug(&post_data.title, now_millis),
        content: post_data.content.clone(),
        excerpt: post_data.excerpt.clone(),
        cover_image: post_data.cover_image.clone(),
        category: post_data.category,
        tags: post_data.tags.clone(),
        status: post_data.status.unwrap_or(BlogStatus::Published),
        approval_status: ModerationPolicy::BLOG_POSTS.initial_approval(caller.role),
        submitted_by: caller.id,
        author_name: caller.name.clone(),
        created_at: now,
        updated_at: now,
    };

    let result = blog_posts(&db).insert_one(&post, None).await?;
    post.id = result.inserted_id.as_object_id();

    Ok(responses::created(post))
}

#[derive(Debug, Deserialize)]
pub struct AdminBlogQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub approval_status: Option<String>,
    pub status: Option<String>,
}

#[get("/admin/blog/posts")]
pub async fn admin_list_posts(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<AdminBlogQuery>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;

    let mut filter = Document::new();
    if let Some(raw) = &query.approval_status {
        let approval = ApprovalStatus::parse(raw).ok_or_else(|| {
            AppError::InvalidInput(
                "Approval status must be one of Pending, Approved or Rejected".to_string(),
            )
        })?;
        filter.insert("approval_status", approval.as_str());
    }
    if let Some(status) = &query.status {
        filter.insert("status", status);
    }

    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (items, total) = find_page(&blog_posts(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[derive(Debug, Deserialize)]
pub struct BlogReviewDto {
    pub approval_status: String,
}

#[patch("/admin/blog/posts/{id}/approval")]
pub async fn review_post(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    review: web::Json<BlogReviewDto>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = ObjectId::parse_str(id.as_str())
        .map_err(|_| AppError::InvalidInput("Invalid blog post id".to_string()))?;

    let decision = ApprovalStatus::parse(&review.approval_status).ok_or_else(|| {
        AppError::InvalidInput(
            "Approval status must be one of Pending, Approved or Rejected".to_string(),
        )
    })?;

    let collection = blog_posts(&db);
    let result = collection
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": {
                "approval_status": decision.as_str(),
                "updated_at": DateTime::from_millis(Utc::now().timestamp_millis()),
            }},
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound("Blog post"));
    }

    let updated = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Blog post"))?;
    Ok(responses::ok(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_filter_requires_published_and_approved() {
        let filter = public_filter();
        assert_eq!(filter.get_str("status").unwrap(), "published");
        assert_eq!(filter.get_str("approval_status").unwrap(), "Approved");
    }
}
