//! Order API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::validate_ref_id;
use crate::data::types::OrderRow;
use crate::utils::time::secs_to_datetime_lossy;

/// Order DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for OrderDto {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            created_at: secs_to_datetime_lossy(row.created_at),
        }
    }
}

/// Response carrying a single order
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub success: bool,
    pub order: OrderDto,
}

/// Response for GET /orders
#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderDto>,
}

/// Request body for placing an order
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(custom(function = "validate_ref_id"))]
    pub user_id: String,
    #[validate(custom(function = "validate_ref_id"))]
    pub course_id: String,
}
