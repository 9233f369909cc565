//! Analytics API endpoints
//!
//! Each endpoint returns the trailing 12-month creation series of one
//! entity kind, oldest bucket first.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::data::types::EntityKind;
use crate::domain::AnalyticsService;
use crate::domain::analytics::PeriodBucket;

use types::{CoursesAnalyticsResponse, OrdersAnalyticsResponse, UsersAnalyticsResponse};

/// Shared state for Analytics API endpoints
#[derive(Clone)]
pub struct AnalyticsApiState {
    pub analytics: Arc<AnalyticsService>,
}

/// Build Analytics API routes
pub fn routes(analytics: Arc<AnalyticsService>) -> Router<()> {
    let state = AnalyticsApiState { analytics };

    Router::new()
        .route("/users", get(get_users_analytics))
        .route("/courses", get(get_courses_analytics))
        .route("/orders", get(get_orders_analytics))
        .with_state(state)
}

async fn series(state: &AnalyticsApiState, kind: EntityKind) -> Result<Vec<PeriodBucket>, ApiError> {
    state
        .analytics
        .last_12_months(kind)
        .await
        .map_err(ApiError::from_data)
}

/// User registrations over the last 12 months
#[utoipa::path(
    get,
    path = "/api/v1/analytics/users",
    tag = "analytics",
    responses(
        (status = 200, description = "12-bucket user series", body = UsersAnalyticsResponse),
        (status = 500, description = "Database failure", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_users_analytics(
    State(state): State<AnalyticsApiState>,
) -> Result<Json<UsersAnalyticsResponse>, ApiError> {
    let series = series(&state, EntityKind::Users).await?;
    Ok(Json(UsersAnalyticsResponse::new(series)))
}

/// Course creations over the last 12 months
#[utoipa::path(
    get,
    path = "/api/v1/analytics/courses",
    tag = "analytics",
    responses(
        (status = 200, description = "12-bucket course series", body = CoursesAnalyticsResponse),
        (status = 500, description = "Database failure", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_courses_analytics(
    State(state): State<AnalyticsApiState>,
) -> Result<Json<CoursesAnalyticsResponse>, ApiError> {
    let series = series(&state, EntityKind::Courses).await?;
    Ok(Json(CoursesAnalyticsResponse::new(series)))
}

/// Orders placed over the last 12 months
#[utoipa::path(
    get,
    path = "/api/v1/analytics/orders",
    tag = "analytics",
    responses(
        (status = 200, description = "12-bucket order series", body = OrdersAnalyticsResponse),
        (status = 500, description = "Database failure", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_orders_analytics(
    State(state): State<AnalyticsApiState>,
) -> Result<Json<OrdersAnalyticsResponse>, ApiError> {
    let series = series(&state, EntityKind::Orders).await?;
    Ok(Json(OrdersAnalyticsResponse::new(series)))
}
