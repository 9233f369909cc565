//! Course API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::validate_ref_id;
use crate::core::constants::{SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT};
use crate::data::types::{CoursePage, CourseRow, CourseUpdate, QuestionRow, ReplyRow, ReviewRow};
use crate::utils::time::secs_to_datetime_lossy;

/// Course DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Mean review rating, 0 before the first review
    pub ratings: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourseRow> for CourseDto {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            ratings: row.ratings,
            created_at: secs_to_datetime_lossy(row.created_at),
            updated_at: secs_to_datetime_lossy(row.updated_at),
        }
    }
}

/// Response carrying a single course
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub success: bool,
    pub course: CourseDto,
}

impl CourseResponse {
    pub fn new(row: CourseRow) -> Self {
        Self {
            success: true,
            course: row.into(),
        }
    }
}

/// Response for GET /courses
#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesResponse {
    pub success: bool,
    pub courses: Vec<CourseDto>,
}

impl CoursesResponse {
    pub fn new(rows: Vec<CourseRow>) -> Self {
        Self {
            success: true,
            courses: rows.into_iter().map(CourseDto::from).collect(),
        }
    }
}

/// Request body for creating a course
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Course name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
}

/// Request body for a partial course update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Course name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
}

impl UpdateCourseRequest {
    /// `None` when the request changes nothing
    pub fn into_update(self) -> Option<CourseUpdate> {
        if self.name.is_none() && self.description.is_none() && self.price.is_none() {
            return None;
        }
        Some(CourseUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description,
            price: self.price,
        })
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    SEARCH_DEFAULT_LIMIT
}

/// Query string for GET /courses/search
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchCoursesQuery {
    /// Phrase matched against course names, ignoring case and spaces
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationDto {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_courses: u64,
}

/// Response for GET /courses/search
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchCoursesResponse {
    pub success: bool,
    pub courses: Vec<CourseDto>,
    pub pagination: PaginationDto,
}

impl SearchCoursesResponse {
    pub fn new(page: CoursePage, current_page: u32, limit: u32) -> Self {
        let limit = u64::from(limit.clamp(1, SEARCH_MAX_LIMIT));
        Self {
            success: true,
            courses: page.courses.into_iter().map(CourseDto::from).collect(),
            pagination: PaginationDto {
                current_page,
                total_pages: page.total.div_ceil(limit),
                total_courses: page.total,
            },
        }
    }
}

/// Reply to a review, or answer to a question
#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyDto {
    pub id: String,
    pub user_id: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReplyRow> for ReplyDto {
    fn from(row: ReplyRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            comment: row.body,
            created_at: secs_to_datetime_lossy(row.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewDto {
    pub id: String,
    pub user_id: String,
    pub comment: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyDto>,
}

impl From<ReviewRow> for ReviewDto {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            comment: row.comment,
            rating: row.rating,
            created_at: secs_to_datetime_lossy(row.created_at),
            replies: row.replies.into_iter().map(ReplyDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionDto {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<ReplyDto>,
}

impl From<QuestionRow> for QuestionDto {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            question: row.question,
            created_at: secs_to_datetime_lossy(row.created_at),
            answers: row.answers.into_iter().map(ReplyDto::from).collect(),
        }
    }
}

/// New review plus the course with its refreshed rating
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub success: bool,
    pub review: ReviewDto,
    pub course: CourseDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<ReviewDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyResponse {
    pub success: bool,
    pub reply: ReplyDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub success: bool,
    pub question: QuestionDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<QuestionDto>,
}

/// Request body for reviewing a purchased course
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(custom(function = "validate_ref_id"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 2000, message = "Please enter a review"))]
    pub review: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
}

/// Request body for replying to a review
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplyRequest {
    #[validate(custom(function = "validate_ref_id"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 2000, message = "Please enter a comment"))]
    pub comment: String,
}

/// Request body for asking a question
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(custom(function = "validate_ref_id"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 2000, message = "Please enter a question"))]
    pub question: String,
}

/// Request body for answering a question
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnswerRequest {
    #[validate(custom(function = "validate_ref_id"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 2000, message = "Please enter an answer"))]
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_course_request_validation() {
        let ok: CreateCourseRequest =
            serde_json::from_str(r#"{"name": "Rust 101", "price": 49.5}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.description.is_empty());

        let negative: CreateCourseRequest =
            serde_json::from_str(r#"{"name": "Rust 101", "price": -1}"#).unwrap();
        assert!(negative.validate().is_err());

        let unnamed: CreateCourseRequest =
            serde_json::from_str(r#"{"name": "", "price": 0}"#).unwrap();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_update_request_without_fields_changes_nothing() {
        let empty: UpdateCourseRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());
        assert!(empty.into_update().is_none());

        let renamed: UpdateCourseRequest =
            serde_json::from_str(r#"{"name": "  Rust 201 "}"#).unwrap();
        let update = renamed.into_update().unwrap();
        assert_eq!(update.name.as_deref(), Some("Rust 201"));
        assert!(update.price.is_none());

        let negative: UpdateCourseRequest = serde_json::from_str(r#"{"price": -3}"#).unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_search_query_defaults_and_limits() {
        let query: SearchCoursesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.title, "");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, SEARCH_DEFAULT_LIMIT);

        let too_big: SearchCoursesQuery =
            serde_json::from_str(r#"{"limit": 1000}"#).unwrap();
        assert!(too_big.validate().is_err());

        let page_zero: SearchCoursesQuery = serde_json::from_str(r#"{"page": 0}"#).unwrap();
        assert!(page_zero.validate().is_err());
    }

    #[test]
    fn test_pagination_rounds_pages_up() {
        let page = CoursePage {
            courses: Vec::new(),
            total: 21,
        };
        let response = SearchCoursesResponse::new(page, 3, 10);
        assert_eq!(response.pagination.total_pages, 3);
        assert_eq!(response.pagination.current_page, 3);
        assert_eq!(response.pagination.total_courses, 21);
    }

    #[test]
    fn test_review_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let body = format!(r#"{{"user_id": "u1", "review": "Nice", "rating": {rating}}}"#);
            let request: CreateReviewRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(request.validate().is_ok(), ok, "rating {rating}");
        }
    }
}
