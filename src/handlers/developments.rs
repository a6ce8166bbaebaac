use actix_web::{delete, get, post, put, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, DateTime, Document},
    Collection, Database,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::{require_admin, require_role_in},
    models::development::{CreateDevelopmentDto, Development, UpdateDevelopmentDto},
    models::user::UserRole,
    moderation::{ApprovalStatus, ModerationPolicy},
    pagination::{PageQuery, Paginated},
    responses,
};

use super::find_page;

fn developments(db: &Database) -> Collection<Development> {
    db.collection::<Development>("developments")
}

fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidInput("Invalid development id".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct DevelopmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

impl DevelopmentListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[get("/developments")]
pub async fn list_developments(
    db: web::Data<Database>,
    query: web::Query<DevelopmentListQuery>,
) -> AppResult<HttpResponse> {
    let mut filter = doc! { "approval_status": ApprovalStatus::Approved.as_str() };
    if let Some(status) = &query.status {
        filter.insert("status", status);
    }

    let page = query.page_query();
    let (items, total) = find_page(&developments(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[get("/admin/developments")]
pub async fn admin_list_developments(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<DevelopmentListQuery>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;

    let mut filter = Document::new();
    if let Some(status) = &query.status {
        filter.insert("status", status);
    }

    let page = query.page_query();
    let (items, total) = find_page(&developments(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[post("/admin/developments")]
pub async fn create_development(
    req: HttpRequest,
    db: web::Data<Database>,
    development_data: web::Json<CreateDevelopmentDto>,
) -> AppResult<HttpResponse> {
    development_data.validate()?;
    let caller = require_role_in(&req.extensions(), &[UserRole::Admin, UserRole::Agent])?;

    let now = DateTime::from_millis(Utc::now().timestamp_millis());
    let mut development = Development {
        id: None,
        name: development_data.name.clone(),
        location: development_data.location.clone(),
        developer: development_data.developer.clone(),
        description: development_data.description.clone(),
        key_highlights: development_data.key_highlights.clone(),
        amenities: development_data.amenities.clone(),
        price_range: development_data.price_range.clone(),
        status: development_data.status,
        approval_status: ModerationPolicy::DEVELOPMENTS.initial_approval(caller.role),
        submitted_by: caller.id,
        created_at: now,
        updated_at: now,
    };

    let result = developments(&db).insert_one(&development, None).await?;
    development.id = result.inserted_id.as_object_id();

    Ok(responses::created(development))
}

#[put("/admin/developments/{id}")]
pub async fn update_development(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    update: web::Json<UpdateDevelopmentDto>,
) -> AppResult<HttpResponse> {
    update.validate()?;
    require_admin(&req.extensions())?;
    let object_id = parse_object_id(&id)?;

    let mut changes = Document::new();
    if let Some(name) = &update.name {
        changes.insert("name", name);
    }
    if let Some(location) = &update.location {
        changes.insert("location", location);
    }
    if let Some(developer) = &update.developer {
        changes.insert("developer", developer);
    }
    if let Some(description) = &update.description {
        changes.insert("description", description);
    }
    if let Some(key_highlights) = &update.key_highlights {
        changes.insert("key_highlights", key_highlights.clone());
    }
    if let Some(amenities) = &update.amenities {
        changes.insert("amenities", amenities.clone());
    }
    if let Some(price_range) = &update.price_range {
        changes.insert("price_range", price_range);
    }
    if let Some(status) = update.status {
        changes.insert(
            "status",
            to_bson(&status).map_err(|e| AppError::Internal(e.to_string()))?,
        );
    }
    changes.insert("updated_at", DateTime::from_millis(Utc::now().timestamp_millis()));

    let collection = developments(&db);
    let result = collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": changes }, None)
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound("Development"));
    }

    let updated = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Development"))?;
    Ok(responses::ok(updated))
}

#[delete("/admin/developments/{id}")]
pub async fn delete_development(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = parse_object_id(&id)?;

    let result = developments(&db)
        .delete_one(doc! { "_id": object_id }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Development"));
    }

    Ok(responses::ok_message("Development deleted successfully"))
}
