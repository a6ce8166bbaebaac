use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    /// Accounts with this flag set cannot have their role changed. Used for the
    /// primary admin so it can never be locked out by a demotion.
    #[serde(default)]
    pub protected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token_expires_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Agent,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserRole::User),
            "agent" => Some(UserRole::Agent),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 2, max = 80, message = "Name must be between 2 and 80 characters"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginDto {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordDto {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordDto {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleDto {
    pub role: String,
}

/// What the API returns for an account: everything except the password hash and
/// reset-token fields.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub protected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            protected: user.protected,
            phone: user.phone,
            bio: user.bio,
            photo_url: user.photo_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public agent profile: no email, no account metadata.
#[derive(Debug, Serialize)]
pub struct AgentProfile {
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<User> for AgentProfile {
    fn from(user: User) -> Self {
        AgentProfile {
            id: user.id,
            name: user.name,
            phone: user.phone,
            bio: user.bio,
            photo_url: user.photo_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_values() {
        for role in [UserRole::User, UserRole::Agent, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("superadmin"), None);
    }

    #[test]
    fn signup_rejects_short_password() {
        let dto = CreateUserDto {
            name: "Jo Lee".to_string(),
            email: "jo@x.com".to_string(),
            password: "12345".to_string(),
        };

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn signup_rejects_malformed_email() {
        let dto = CreateUserDto {
            name: "Jo Lee".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };

        assert!(dto.validate().is_err());
    }

    #[test]
    fn user_response_drops_credential_fields() {
        let user = User {
            id: None,
            name: "Jo Lee".to_string(),
            email: "jo@x.com".to_string(),
            password: "$2b$12$hash".to_string(),
            role: UserRole::User,
            protected: false,
            phone: None,
            bio: None,
            photo_url: None,
            reset_token_hash: Some("digest".to_string()),
            reset_token_expires_at: None,
            created_at: DateTime::from_millis(0),
            updated_at: DateTime::from_millis(0),
        };

        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("reset_token_hash").is_none());
        assert_eq!(value["role"], "user");
    }
}
