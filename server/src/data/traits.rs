//! Repository trait for the transactional store
//!
//! Handlers and services talk to this trait, never to a concrete backend.
//! Methods taking `cache` use it for reads when `Some` and invalidate the
//! affected keys after writes.

use async_trait::async_trait;

use crate::data::cache::CacheService;
use crate::data::error::DataError;
use crate::data::types::{
    CoursePage, CourseRow, CourseUpdate, CreatedAt, EntityKind, OrderRow, QuestionRow, ReplyRow,
    ReviewRow, UserRole, UserRow,
};

#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        cache: Option<&CacheService>,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<UserRow, DataError>;

    async fn get_user(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<UserRow>, DataError>;

    /// All users, newest first
    async fn list_users(&self) -> Result<Vec<UserRow>, DataError>;

    async fn update_user_role(
        &self,
        cache: Option<&CacheService>,
        id: &str,
        role: UserRole,
    ) -> Result<Option<UserRow>, DataError>;

    async fn delete_user(&self, cache: Option<&CacheService>, id: &str)
    -> Result<bool, DataError>;

    // ==================== Course Operations ====================

    async fn create_course(
        &self,
        cache: Option<&CacheService>,
        name: &str,
        description: &str,
        price: f64,
    ) -> Result<CourseRow, DataError>;

    async fn get_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<CourseRow>, DataError>;

    /// All courses, newest first
    async fn list_courses(&self) -> Result<Vec<CourseRow>, DataError>;

    /// `None` when the course does not exist
    async fn update_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
        update: &CourseUpdate,
    ) -> Result<Option<CourseRow>, DataError>;

    /// Case-insensitive name search, `page` starting at 1
    async fn search_courses(
        &self,
        title: &str,
        page: u32,
        limit: u32,
    ) -> Result<CoursePage, DataError>;

    async fn delete_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<bool, DataError>;

    // ==================== Order Operations ====================

    /// Fails with `DataError::Conflict` if the user or course does not exist
    async fn create_order(
        &self,
        cache: Option<&CacheService>,
        user_id: &str,
        course_id: &str,
    ) -> Result<OrderRow, DataError>;

    /// All orders, newest first
    async fn list_orders(&self) -> Result<Vec<OrderRow>, DataError>;

    async fn has_purchased(&self, user_id: &str, course_id: &str) -> Result<bool, DataError>;

    // ==================== Course Threads ====================

    /// Also recomputes the course's mean rating
    async fn add_review(
        &self,
        cache: Option<&CacheService>,
        course_id: &str,
        user_id: &str,
        comment: &str,
        rating: i64,
    ) -> Result<ReviewRow, DataError>;

    /// `None` when the review does not belong to the course
    async fn add_review_reply(
        &self,
        course_id: &str,
        review_id: &str,
        user_id: &str,
        comment: &str,
    ) -> Result<Option<ReplyRow>, DataError>;

    async fn list_reviews(&self, course_id: &str) -> Result<Vec<ReviewRow>, DataError>;

    async fn add_question(
        &self,
        course_id: &str,
        user_id: &str,
        question: &str,
    ) -> Result<QuestionRow, DataError>;

    /// `None` when the question does not belong to the course
    async fn add_answer(
        &self,
        course_id: &str,
        question_id: &str,
        user_id: &str,
        answer: &str,
    ) -> Result<Option<ReplyRow>, DataError>;

    async fn list_questions(&self, course_id: &str) -> Result<Vec<QuestionRow>, DataError>;

    // ==================== Analytics ====================

    /// Every creation timestamp for an entity kind
    async fn list_created_at(&self, kind: EntityKind) -> Result<Vec<CreatedAt>, DataError>;
}
