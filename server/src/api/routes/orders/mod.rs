//! Order API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::cache::CacheService;

use types::{CreateOrderRequest, OrderDto, OrderResponse, OrdersResponse};

/// Shared state for Orders API endpoints
#[derive(Clone)]
pub struct OrdersApiState {
    pub database: Arc<TransactionalService>,
    pub cache: Arc<CacheService>,
}

/// Build Orders API routes
pub fn routes(database: Arc<TransactionalService>, cache: Arc<CacheService>) -> Router<()> {
    let state = OrdersApiState { database, cache };

    Router::new()
        .route("/", get(list_orders).post(create_order))
        .with_state(state)
}

/// Place an order for a course
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Unknown user or course", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<OrdersApiState>,
    ValidatedJson(body): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state
        .database
        .repository()
        .create_order(Some(&state.cache), &body.user_id, &body.course_id)
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(
        order_id = %order.id,
        user_id = %order.user_id,
        course_id = %order.course_id,
        "Order created"
    );
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order: order.into(),
        }),
    ))
}

/// List all orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    responses(
        (status = 200, description = "All orders", body = OrdersResponse)
    )
)]
pub async fn list_orders(
    State(state): State<OrdersApiState>,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state
        .database
        .repository()
        .list_orders()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(OrdersResponse {
        success: true,
        orders: orders.into_iter().map(OrderDto::from).collect(),
    }))
}
