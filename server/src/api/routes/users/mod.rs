//! User API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::{ApiError, MessageResponse};
use crate::data::TransactionalService;
use crate::data::cache::CacheService;

use types::{CreateUserRequest, UpdateRoleRequest, UserResponse, UsersResponse};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub database: Arc<TransactionalService>,
    pub cache: Arc<CacheService>,
}

/// Build Users API routes
pub fn routes(database: Arc<TransactionalService>, cache: Arc<CacheService>) -> Router<()> {
    let state = UsersApiState { database, cache };

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/role", put(update_user_role))
        .route("/{id}", get(get_user).delete(delete_user))
        .with_state(state)
}

fn user_not_found() -> ApiError {
    ApiError::not_found("USER_NOT_FOUND", "User not found")
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .database
        .repository()
        .create_user(Some(&state.cache), body.name.trim(), &body.email, body.role)
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(user_id = %user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::new(user))))
}

/// List all users, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = UsersResponse)
    )
)]
pub async fn list_users(
    State(state): State<UsersApiState>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state
        .database
        .repository()
        .list_users()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UsersResponse::new(users)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<UsersApiState>,
    path: IdPath,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .database
        .repository()
        .get_user(Some(&state.cache), &path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserResponse::new(user)))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/api/v1/users/role",
    tag = "users",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn update_user_role(
    State(state): State<UsersApiState>,
    ValidatedJson(body): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .database
        .repository()
        .update_user_role(Some(&state.cache), &body.id, body.role)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(user_not_found)?;

    tracing::debug!(user_id = %user.id, role = %user.role, "User role updated");
    Ok(Json(UserResponse::new(user)))
}

/// Delete a user and their orders
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<UsersApiState>,
    path: IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_user(Some(&state.cache), &path.id)
        .await
        .map_err(ApiError::from_data)?;

    if !deleted {
        return Err(user_not_found());
    }

    tracing::debug!(user_id = %path.id, "User deleted");
    Ok(Json(MessageResponse::ok("User deleted successfully!")))
}
