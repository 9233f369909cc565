//! Course API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::extractors::{IdPath, ThreadPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, MessageResponse};
use crate::data::TransactionalService;
use crate::data::cache::CacheService;
use crate::data::types::CourseRow;

use types::{
    CourseResponse, CoursesResponse, CreateAnswerRequest, CreateCourseRequest,
    CreateQuestionRequest, CreateReplyRequest, CreateReviewRequest, QuestionResponse,
    QuestionsResponse, ReplyResponse, ReviewResponse, ReviewsResponse, SearchCoursesQuery,
    SearchCoursesResponse, UpdateCourseRequest,
};

/// Shared state for Courses API endpoints
#[derive(Clone)]
pub struct CoursesApiState {
    pub database: Arc<TransactionalService>,
    pub cache: Arc<CacheService>,
}

/// Build Courses API routes
pub fn routes(database: Arc<TransactionalService>, cache: Arc<CacheService>) -> Router<()> {
    let state = CoursesApiState { database, cache };

    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/search", get(search_courses))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{id}/reviews", get(list_reviews).post(add_review))
        .route("/{id}/reviews/{thread_id}/replies", post(add_review_reply))
        .route("/{id}/questions", get(list_questions).post(add_question))
        .route("/{id}/questions/{thread_id}/answers", post(add_answer))
        .with_state(state)
}

fn course_not_found() -> ApiError {
    ApiError::not_found("COURSE_NOT_FOUND", "Course not found")
}

async fn require_course(state: &CoursesApiState, id: &str) -> Result<CourseRow, ApiError> {
    state
        .database
        .repository()
        .get_course(Some(&state.cache), id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(course_not_found)
}

/// Create a course
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn create_course(
    State(state): State<CoursesApiState>,
    ValidatedJson(body): ValidatedJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    let course = state
        .database
        .repository()
        .create_course(
            Some(&state.cache),
            body.name.trim(),
            &body.description,
            body.price,
        )
        .await
        .map_err(ApiError::from_data)?;

    tracing::debug!(course_id = %course.id, "Course created");
    Ok((StatusCode::CREATED, Json(CourseResponse::new(course))))
}

/// List all courses, newest first
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "courses",
    responses(
        (status = 200, description = "All courses", body = CoursesResponse)
    )
)]
pub async fn list_courses(
    State(state): State<CoursesApiState>,
) -> Result<Json<CoursesResponse>, ApiError> {
    let courses = state
        .database
        .repository()
        .list_courses()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(CoursesResponse::new(courses)))
}

/// Get a course by ID
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn get_course(
    State(state): State<CoursesApiState>,
    path: IdPath,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = state
        .database
        .repository()
        .get_course(Some(&state.cache), &path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(course_not_found)?;

    Ok(Json(CourseResponse::new(course)))
}

/// Update a course's name, description or price
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn update_course(
    State(state): State<CoursesApiState>,
    path: IdPath,
    ValidatedJson(body): ValidatedJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let update = body
        .into_update()
        .ok_or_else(|| ApiError::bad_request("NO_CHANGES", "Nothing to update"))?;

    let course = state
        .database
        .repository()
        .update_course(Some(&state.cache), &path.id, &update)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(course_not_found)?;

    tracing::debug!(course_id = %course.id, "Course updated");
    Ok(Json(CourseResponse::new(course)))
}

/// Search courses by name
#[utoipa::path(
    get,
    path = "/api/v1/courses/search",
    tag = "courses",
    params(SearchCoursesQuery),
    responses(
        (status = 200, description = "Matching courses", body = SearchCoursesResponse),
        (status = 400, description = "Invalid query", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn search_courses(
    State(state): State<CoursesApiState>,
    ValidatedQuery(query): ValidatedQuery<SearchCoursesQuery>,
) -> Result<Json<SearchCoursesResponse>, ApiError> {
    let page = state
        .database
        .repository()
        .search_courses(&query.title, query.page, query.limit)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(SearchCoursesResponse::new(page, query.page, query.limit)))
}

/// Delete a course and its orders
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn delete_course(
    State(state): State<CoursesApiState>,
    path: IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .database
        .repository()
        .delete_course(Some(&state.cache), &path.id)
        .await
        .map_err(ApiError::from_data)?;

    if !deleted {
        return Err(course_not_found());
    }

    tracing::debug!(course_id = %path.id, "Course deleted");
    Ok(Json(MessageResponse::ok("Course deleted successfully!")))
}

// ==================== Reviews ====================

/// List a course's reviews with their replies
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/reviews",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Reviews, oldest first", body = ReviewsResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<CoursesApiState>,
    path: IdPath,
) -> Result<Json<ReviewsResponse>, ApiError> {
    require_course(&state, &path.id).await?;
    let reviews = state
        .database
        .repository()
        .list_reviews(&path.id)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(ReviewsResponse {
        success: true,
        reviews: reviews.into_iter().map(Into::into).collect(),
    }))
}

/// Review a purchased course
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/reviews",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review added", body = ReviewResponse),
        (status = 400, description = "Invalid request", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Course not found or not purchased", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_review(
    State(state): State<CoursesApiState>,
    path: IdPath,
    ValidatedJson(body): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    require_course(&state, &path.id).await?;

    let repo = state.database.repository();
    let eligible = repo
        .has_purchased(&body.user_id, &path.id)
        .await
        .map_err(ApiError::from_data)?;
    if !eligible {
        return Err(ApiError::not_found(
            "NOT_ELIGIBLE",
            "You are not eligible to access this course",
        ));
    }

    let review = repo
        .add_review(
            Some(&state.cache),
            &path.id,
            &body.user_id,
            body.review.trim(),
            body.rating,
        )
        .await
        .map_err(ApiError::from_data)?;
    let course = require_course(&state, &path.id).await?;

    tracing::debug!(course_id = %path.id, review_id = %review.id, "Review added");
    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            success: true,
            review: review.into(),
            course: course.into(),
        }),
    ))
}

/// Reply to a review
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/reviews/{thread_id}/replies",
    tag = "courses",
    params(
        ("id" = String, Path, description = "Course ID"),
        ("thread_id" = String, Path, description = "Review ID")
    ),
    request_body = CreateReplyRequest,
    responses(
        (status = 201, description = "Reply added", body = ReplyResponse),
        (status = 404, description = "Course or review not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Unknown user", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_review_reply(
    State(state): State<CoursesApiState>,
    path: ThreadPath,
    ValidatedJson(body): ValidatedJson<CreateReplyRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), ApiError> {
    require_course(&state, &path.id).await?;
    let reply = state
        .database
        .repository()
        .add_review_reply(&path.id, &path.thread_id, &body.user_id, body.comment.trim())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("REVIEW_NOT_FOUND", "Review not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse {
            success: true,
            reply: reply.into(),
        }),
    ))
}

// ==================== Questions ====================

/// List a course's questions with their answers
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/questions",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Questions, oldest first", body = QuestionsResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn list_questions(
    State(state): State<CoursesApiState>,
    path: IdPath,
) -> Result<Json<QuestionsResponse>, ApiError> {
    require_course(&state, &path.id).await?;
    let questions = state
        .database
        .repository()
        .list_questions(&path.id)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(QuestionsResponse {
        success: true,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

/// Ask a question on a course
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/questions",
    tag = "courses",
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question added", body = QuestionResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Unknown user", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_question(
    State(state): State<CoursesApiState>,
    path: IdPath,
    ValidatedJson(body): ValidatedJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    require_course(&state, &path.id).await?;
    let question = state
        .database
        .repository()
        .add_question(&path.id, &body.user_id, body.question.trim())
        .await
        .map_err(ApiError::from_data)?;

    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse {
            success: true,
            question: question.into(),
        }),
    ))
}

/// Answer a question
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/questions/{thread_id}/answers",
    tag = "courses",
    params(
        ("id" = String, Path, description = "Course ID"),
        ("thread_id" = String, Path, description = "Question ID")
    ),
    request_body = CreateAnswerRequest,
    responses(
        (status = 201, description = "Answer added", body = ReplyResponse),
        (status = 400, description = "Question is not on this course", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn add_answer(
    State(state): State<CoursesApiState>,
    path: ThreadPath,
    ValidatedJson(body): ValidatedJson<CreateAnswerRequest>,
) -> Result<(StatusCode, Json<ReplyResponse>), ApiError> {
    require_course(&state, &path.id).await?;
    let answer = state
        .database
        .repository()
        .add_answer(&path.id, &path.thread_id, &body.user_id, body.answer.trim())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::bad_request("INVALID_QUESTION_ID", "Invalid question id"))?;

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse {
            success: true,
            reply: answer.into(),
        }),
    ))
}
