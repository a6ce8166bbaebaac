use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Extensions, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use chrono::Utc;
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::get_jwt_secret;
use crate::errors::{AppError, AppResult};
use crate::models::user::{User, UserRole};

pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id (ObjectId hex).
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

/// Verified identity of the caller, inserted into request extensions by the
/// [`Authentication`] middleware. Handlers never look at headers themselves.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

pub fn issue_token(user: &User) -> AppResult<String> {
    let id = user
        .id
        .ok_or_else(|| AppError::Internal("User record has no id".to_string()))?;
    let claims = Claims {
        sub: id.to_hex(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };
    encode_claims(&claims, &get_jwt_secret()?)
}

fn encode_claims(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

fn decode_identity(token: &str, secret: &str) -> Option<CallerIdentity> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .ok()?;

    Some(CallerIdentity {
        id: ObjectId::parse_str(&data.claims.sub).ok()?,
        email: data.claims.email,
        name: data.claims.name,
        role: UserRole::parse(&data.claims.role)?,
    })
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer ").map(|t| t.to_string()))
}

/// Verifies the bearer token once per request and attaches a [`CallerIdentity`]
/// on success. Requests without a valid token pass through with no identity;
/// handlers decide whether that matters.
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticationMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let (Some(token), Ok(secret)) = (bearer_token(&req), get_jwt_secret()) {
            if let Some(identity) = decode_identity(&token, &secret) {
                req.extensions_mut().insert(identity);
            }
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}

pub fn require_auth(extensions: &Extensions) -> AppResult<CallerIdentity> {
    extensions
        .get::<CallerIdentity>()
        .cloned()
        .ok_or(AppError::Unauthenticated)
}

pub fn require_admin(extensions: &Extensions) -> AppResult<CallerIdentity> {
    let caller = require_auth(extensions)?;
    if caller.role == UserRole::Admin {
        Ok(caller)
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

pub fn require_role_in(extensions: &Extensions, allowed: &[UserRole]) -> AppResult<CallerIdentity> {
    let caller = require_auth(extensions)?;
    if allowed.contains(&caller.role) {
        Ok(caller)
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn claims_for(role: &str) -> Claims {
        Claims {
            sub: ObjectId::new().to_hex(),
            email: "jo@x.com".to_string(),
            name: "Jo Lee".to_string(),
            role: role.to_string(),
            exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let claims = claims_for("agent");
        let token = encode_claims(&claims, SECRET).unwrap();

        let identity = decode_identity(&token, SECRET).unwrap();
        assert_eq!(identity.id.to_hex(), claims.sub);
        assert_eq!(identity.email, "jo@x.com");
        assert_eq!(identity.name, "Jo Lee");
        assert_eq!(identity.role, UserRole::Agent);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = claims_for("user");
        claims.exp = (Utc::now().timestamp() - 120) as usize;
        let token = encode_claims(&claims, SECRET).unwrap();

        assert!(decode_identity(&token, SECRET).is_none());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_claims(&claims_for("user"), "other-secret").unwrap();
        assert!(decode_identity(&token, SECRET).is_none());
    }

    #[test]
    fn unknown_role_in_claims_is_rejected() {
        let token = encode_claims(&claims_for("superuser"), SECRET).unwrap();
        assert!(decode_identity(&token, SECRET).is_none());
    }

    fn extensions_with(role: UserRole) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(CallerIdentity {
            id: ObjectId::new(),
            email: "jo@x.com".to_string(),
            name: "Jo Lee".to_string(),
            role,
        });
        extensions
    }

    #[test]
    fn require_auth_without_identity_fails() {
        let extensions = Extensions::new();
        assert!(matches!(
            require_auth(&extensions),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn require_admin_rejects_other_roles() {
        assert!(require_admin(&extensions_with(UserRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&extensions_with(UserRole::Agent)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn require_role_in_matches_allow_list() {
        let allowed = [UserRole::Admin, UserRole::Agent];
        assert!(require_role_in(&extensions_with(UserRole::Agent), &allowed).is_ok());
        assert!(matches!(
            require_role_in(&extensions_with(UserRole::User), &allowed),
            Err(AppError::Forbidden(_))
        ));
    }
}
