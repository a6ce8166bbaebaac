use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Application-wide error type, converted into the uniform JSON envelope
/// `{ "success": false, "error": ..., "details"? }` at the response boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Authentication required")]
    Unauthenticated,

    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("This endpoint is no longer available")]
    Gone,

    #[error("{0}")]
    Config(String),

    #[error("Database error")]
    Database(#[source] mongodb::error::Error),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        let text = err.to_string();
        // Surface configuration mistakes with a specific message instead of the
        // generic database error.
        if text.contains("connection string") || text.contains("invalid scheme") {
            AppError::Config("Database connection string is missing or malformed".to_string())
        } else {
            AppError::Database(err)
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Gone => StatusCode::GONE,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(err) = self {
            log::error!("database error: {}", err);
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });

        // Validation failures carry itemized per-field details.
        if let AppError::Validation(errors) = self {
            if let Ok(details) = serde_json::to_value(errors) {
                body["details"] = details;
            }
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("email", validator::ValidationError::new("email"));
        let error = AppError::Validation(errors);

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_credentials_maps_to_unauthorized() {
        let error = AppError::InvalidCredentials;

        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.to_string(), "Invalid credentials");
    }

    #[test]
    fn forbidden_maps_to_forbidden() {
        let error = AppError::Forbidden("Admin access required".to_string());

        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_includes_resource_name() {
        let error = AppError::NotFound("Property");

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Property not found");
    }

    #[test]
    fn conflict_maps_to_conflict() {
        let error = AppError::Conflict("User with this email already exists.".to_string());

        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn gone_maps_to_gone() {
        assert_eq!(AppError::Gone.status_code(), StatusCode::GONE);
    }

    #[test]
    fn config_maps_to_internal_server_error() {
        let error = AppError::Config("JWT signing secret is not set".to_string());

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_response_carries_details() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("title", validator::ValidationError::new("length"));
        let response = AppError::Validation(errors).error_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
