//! User API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::is_valid_id;
use crate::data::types::{UserRole, UserRow};
use crate::utils::time::secs_to_datetime_lossy;

/// User DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: secs_to_datetime_lossy(row.created_at),
            updated_at: secs_to_datetime_lossy(row.updated_at),
        }
    }
}

/// Response carrying a single user
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserDto,
}

impl UserResponse {
    pub fn new(row: UserRow) -> Self {
        Self {
            success: true,
            user: row.into(),
        }
    }
}

/// Response for GET /users
#[derive(Debug, Serialize, ToSchema)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserDto>,
}

impl UsersResponse {
    pub fn new(rows: Vec<UserRow>) -> Self {
        Self {
            success: true,
            users: rows.into_iter().map(UserDto::from).collect(),
        }
    }
}

/// Request body for creating a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Please enter your name"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Request body for PUT /users/role
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(custom(function = "validate_id"))]
    pub id: String,
    pub role: UserRole,
}

fn validate_id(id: &str) -> Result<(), validator::ValidationError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_id").with_message("Invalid user id".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_defaults_role() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name": "Ada", "email": "ada@example.com"}"#).unwrap();
        assert_eq!(req.role, UserRole::User);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_rejects_bad_email() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name": "Ada", "email": "not-an-email"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_role_request_rejects_bad_id() {
        let req: UpdateRoleRequest =
            serde_json::from_str(r#"{"id": "a b", "role": "admin"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_role_fails_to_parse() {
        let parsed = serde_json::from_str::<UpdateRoleRequest>(r#"{"id": "u1", "role": "root"}"#);
        assert!(parsed.is_err());
    }
}
