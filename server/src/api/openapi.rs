//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{analytics, courses, health, orders, users};
use crate::api::types::{ErrorResponse, MessageResponse};
use crate::data::types::UserRole;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LearnHub API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Learning management backend"
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "analytics", description = "Trailing 12-month creation series"),
        (name = "users", description = "User management"),
        (name = "courses", description = "Course catalogue"),
        (name = "orders", description = "Course orders")
    ),
    paths(
        // Health
        health::health,
        health::ping,
        // Analytics
        analytics::get_users_analytics,
        analytics::get_courses_analytics,
        analytics::get_orders_analytics,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user_role,
        users::delete_user,
        // Courses
        courses::create_course,
        courses::list_courses,
        courses::get_course,
        courses::update_course,
        courses::search_courses,
        courses::delete_course,
        courses::list_reviews,
        courses::add_review,
        courses::add_review_reply,
        courses::list_questions,
        courses::add_question,
        courses::add_answer,
        // Orders
        orders::create_order,
        orders::list_orders,
    ),
    components(schemas(
        // API types
        ErrorResponse,
        MessageResponse,
        // Health
        health::HealthResponse,
        // Analytics
        analytics::types::PeriodBucketDto,
        analytics::types::UsersAnalyticsResponse,
        analytics::types::CoursesAnalyticsResponse,
        analytics::types::OrdersAnalyticsResponse,
        // Users
        UserRole,
        users::types::UserDto,
        users::types::UserResponse,
        users::types::UsersResponse,
        users::types::CreateUserRequest,
        users::types::UpdateRoleRequest,
        // Courses
        courses::types::CourseDto,
        courses::types::CourseResponse,
        courses::types::CoursesResponse,
        courses::types::CreateCourseRequest,
        courses::types::UpdateCourseRequest,
        courses::types::PaginationDto,
        courses::types::SearchCoursesResponse,
        courses::types::ReplyDto,
        courses::types::ReviewDto,
        courses::types::QuestionDto,
        courses::types::ReviewResponse,
        courses::types::ReviewsResponse,
        courses::types::ReplyResponse,
        courses::types::QuestionResponse,
        courses::types::QuestionsResponse,
        courses::types::CreateReviewRequest,
        courses::types::CreateReplyRequest,
        courses::types::CreateQuestionRequest,
        courses::types::CreateAnswerRequest,
        // Orders
        orders::types::OrderDto,
        orders::types::OrderResponse,
        orders::types::OrdersResponse,
        orders::types::CreateOrderRequest,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LearnHub API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_analytics_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/analytics/users",
            "/api/v1/analytics/courses",
            "/api/v1/analytics/orders",
            "/api/v1/users/role",
            "/api/v1/users/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
