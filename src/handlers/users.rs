use actix_web::{get, patch, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    Collection, Database,
};
use serde::Deserialize;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::{require_admin, require_auth},
    models::user::{AgentProfile, UpdateRoleDto, User, UserResponse, UserRole},
    pagination::{PageQuery, Paginated},
    responses,
};

use super::find_page;
use super::properties::regex_escape;

fn users(db: &Database) -> Collection<User> {
    db.collection::<User>("users")
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[get("/admin/users")]
pub async fn admin_list_users(
    req: HttpRequest,
    db: web::Data<Database>,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;

    let mut filter = Document::new();
    if let Some(raw) = &query.role {
        let role = UserRole::parse(raw).ok_or_else(|| {
            AppError::InvalidInput("Role must be one of user, agent or admin".to_string())
        })?;
        filter.insert("role", role.as_str());
    }
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = regex_escape(term.trim());
        filter.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": &pattern, "$options": "i" } },
                doc! { "email": { "$regex": &pattern, "$options": "i" } },
            ],
        );
    }

    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (items, total) = find_page(&users(&db), filter, &page).await?;
    let items: Vec<UserResponse> = items.into_iter().map(UserResponse::from).collect();
    Ok(responses::ok(Paginated::new(items, &page, total)))
}

#[patch("/admin/users/{id}/role")]
pub async fn update_user_role(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
    update: web::Json<UpdateRoleDto>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = ObjectId::parse_str(id.as_str())
        .map_err(|_| AppError::InvalidInput("Invalid user id".to_string()))?;

    let new_role = UserRole::parse(&update.role).ok_or_else(|| {
        AppError::InvalidInput("Role must be one of user, agent or admin".to_string())
    })?;

    let collection = users(&db);
    let user = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    // The primary admin carries this flag so nobody, including themselves, can
    // demote it.
    if user.protected && new_role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "This account is protected and cannot be demoted".to_string(),
        ));
    }

    collection
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": {
                "role": new_role.as_str(),
                "updated_at": DateTime::from_millis(Utc::now().timestamp_millis()),
            }},
            None,
        )
        .await?;

    let updated = collection
        .find_one(doc! { "_id": object_id }, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(responses::ok(UserResponse::from(updated)))
}

#[get("/agents")]
pub async fn list_agents(
    db: web::Data<Database>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let filter = doc! { "role": UserRole::Agent.as_str() };
    let (items, total) = find_page(&users(&db), filter, &query).await?;
    let items: Vec<AgentProfile> = items.into_iter().map(AgentProfile::from).collect();
    Ok(responses::ok(Paginated::new(items, &query, total)))
}

#[get("/user/me")]
pub async fn get_current_user(req: HttpRequest, db: web::Data<Database>) -> AppResult<HttpResponse> {
    let caller = require_auth(&req.extensions())?;

    let user = users(&db)
        .find_one(doc! { "_id": caller.id }, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(responses::ok(UserResponse::from(user)))
}
