use actix_web::{delete, get, patch, post, put, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, DateTime, Document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Collection, Database,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::{require_admin, require_auth},
    models::property::{CreatePropertyDto, ListingStatus, Property, UpdatePropertyDto},
    models::user::UserRole,
    moderation::{review_property, ApprovalStatus, ModerationPolicy},
    pagination::{PageQuery, Paginated},
    responses,
};

use super::find_page;

fn properties(db: &Database) -> Collection<Property> {
    db.collection::<Property>("properties")
}

fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidInput("Invalid property id".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct PropertyListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub property_type: Option<String>,
    pub city: Option<String>,
}

impl PropertyListQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[get("/properties")]
pub async fn list_properties(
    db: web::Data<Database>,
    query: web::Query<PropertyListQuery>,
) -> AppResult<HttpResponse> {
    let mut filter = doc! { "approval_status": ApprovalStatus::Approved.as_str() };
    if let Some(status) = &query.status {
        filter.insert("status", status);
    }
    if let Some(property_type) = &query.property_type {
        filter.insert("property_type", property_type);
    }
    if let Some(city) = &query.city {
        filter.insert("city", doc! { "$regex": format!("^{}$", regex_escape(city)), "$options": "i" });
    }

    let page = query.page_query();
    let (items, total) = find_page(&properties(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[get("/properties/my-listings")]
pub async fn my_listings(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<PropertyListQuery>,
) -> AppResult<HttpResponse> {
    let caller = require_auth(&req.extensions())?;

    let page = query.page_query();
    let filter = doc! { "submitted_by": caller.id };
    let (items, total) = find_page(&properties(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[get("/properties/{id}")]
pub async fn get_property(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let object_id = parse_object_id(&id)?;

    let property = properties(&db)
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    if property.approval_status != ApprovalStatus::Approved {
        // Unapproved listings are visible to their owner and to admins only;
        // everyone else gets the same answer as for a missing id.
        let caller = require_auth(&req.extensions()).map_err(|_| AppError::NotFound("Property"))?;
        if caller.role != UserRole::Admin && caller.id != property.submitted_by {
            return Err(AppError::NotFound("Property"));
        }
    }

    Ok(responses::ok(property))
}

#[post("/properties")]
pub async fn create_property(
    req: HttpRequest,
    db: web::Data<Database>,
    property_data: web::Json<CreatePropertyDto>,
) -> AppResult<HttpResponse> {
    property_data.validate()?;
    let caller = require_auth(&req.extensions())?;

    let approval = ModerationPolicy::PROPERTIES.initial_approval(caller.role);
    let status = match approval {
        ApprovalStatus::Approved => property_data.status.unwrap_or(ListingStatus::ForSale),
        _ => ListingStatus::PendingApproval,
    };

    let now = DateTime::from_millis(Utc::now().timestamp_millis());
    let mut property = Property {
        id: None,
        title: property_data.title.clone(),
        description: property_data.description.clone(),
        address: property_data.address.clone(),
        city: property_data.city.clone(),
        state: property_data.state.clone(),
        price: property_data.price,
        property_type: property_data.property_type,
        status,
        approval_status: approval,
        bedrooms: property_data.bedrooms,
        bathrooms: property_data.bathrooms,
        area_sqft: property_data.area_sqft,
        images: property_data.images.clone(),
        submitted_by: caller.id,
        views: 0,
        created_at: now,
        updated_at: now,
    };

    let result = properties(&db).insert_one(&property, None).await?;
    property.id = result.inserted_id.as_object_id();

    Ok(responses::created(property))
}

#[put("/properties/{id}")]
pub async fn update_property(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    update: web::Json<UpdatePropertyDto>,
) -> AppResult<HttpResponse> {
    update.validate()?;
    let caller = require_auth(&req.extensions())?;
    let object_id = parse_object_id(&id)?;

    let collection = properties(&db);
    let property = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    if caller.role != UserRole::Admin && caller.id != property.submitted_by {
        return Err(AppError::Forbidden(
            "You can only edit your own listings".to_string(),
        ));
    }

    let mut changes = owner_changes(&update)?;
    changes.insert("updated_at", DateTime::from_millis(Utc::now().timestamp_millis()));
    collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": changes }, None)
        .await?;

    let updated = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Property"))?;
    Ok(responses::ok(updated))
}

fn owner_changes(update: &UpdatePropertyDto) -> AppResult<Document> {
    let mut changes = Document::new();
    if let Some(title) = &update.title {
        changes.insert("title", title);
    }
    if let Some(description) = &update.description {
        changes.insert("description", description);
    }
    if let Some(address) = &update.address {
        changes.insert("address", address);
    }
    if let Some(city) = &update.city {
        changes.insert("city", city);
    }
    if let Some(state) = &update.state {
        changes.insert("state", state);
    }
    if let Some(price) = update.price {
        changes.insert("price", price);
    }
    if let Some(property_type) = update.property_type {
        changes.insert(
            "property_type",
            to_bson(&property_type).map_err(|e| AppError::Internal(e.to_string()))?,
        );
    }
    if let Some(status) = update.status {
        changes.insert("status", status.as_str());
    }
    if let Some(bedrooms) = update.bedrooms {
        changes.insert("bedrooms", bedrooms);
    }
    if let Some(bathrooms) = update.bathrooms {
        changes.insert("bathrooms", bathrooms);
    }
    if let Some(area_sqft) = update.area_sqft {
        changes.insert("area_sqft", area_sqft);
    }
    if let Some(images) = &update.images {
        changes.insert("images", images.clone());
    }
    Ok(changes)
}

#[delete("/properties/{id}")]
pub async fn delete_property(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = parse_object_id(&id)?;

    let result = properties(&db)
        .delete_one(doc! { "_id": object_id }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Property"));
    }

    Ok(responses::ok_message("Property deleted successfully"))
}

#[derive(Debug, Deserialize)]
pub struct ReviewDto {
    pub approval_status: String,
}

#[patch("/properties/{id}/update-status")]
pub async fn update_property_status(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    review: web::Json<ReviewDto>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = parse_object_id(&id)?;

    let decision = ApprovalStatus::parse(&review.approval_status).ok_or_else(|| {
        AppError::InvalidInput(
            "Approval status must be one of Pending, Approved or Rejected".to_string(),
        )
    })?;

    let collection = properties(&db);
    let property = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    let (approval, status_change) = review_property(decision, property.status);
    let mut changes = doc! {
        "approval_status": approval.as_str(),
        "updated_at": DateTime::from_millis(Utc::now().timestamp_millis()),
    };
    if let Some(status) = status_change {
        changes.insert("status", status.as_str());
    }

    collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": changes }, None)
        .await?;

    let updated = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("Property"))?;
    Ok(responses::ok(updated))
}

/// Single atomic `$inc`; concurrent hits never lose an increment.
#[patch("/properties/{id}/increment-view")]
pub async fn increment_view(
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let object_id = parse_object_id(&id)?;

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = properties(&db)
        .find_one_and_update(
            doc! { "_id": object_id },
            doc! {
                "$inc": { "views": 1 },
                "$set": { "updated_at": DateTime::from_millis(Utc::now().timestamp_millis()) },
            },
            options,
        )
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    Ok(responses::ok(json!({ "views": updated.views })))
}

#[derive(Debug, Deserialize)]
pub struct AdminPropertyQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub approval_status: Option<String>,
    pub status: Option<String>,
}

#[get("/admin/properties")]
pub async fn admin_list_properties(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<AdminPropertyQuery>,
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
    let (items, total) = find_page(&properties(&db), filter, &page).await?;
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

pub(crate) fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ch == ' ' {
            escaped.push(ch);
        } else {
            escaped.push('\\');
            escaped.push(ch);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_escape_neutralizes_metacharacters() {
        assert_eq!(regex_escape("New York"), "New York");
        assert_eq!(regex_escape("a.b*c"), "a\\.b\\*c");
    }

    #[test]
    fn review_dto_rejects_unknown_state() {
        assert!(ApprovalStatus::parse("Archived").is_none());
    }
}
