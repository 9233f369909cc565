//! TransactionalRepository implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::cache::CacheService;
use crate::data::error::DataError;
use crate::data::traits::TransactionalRepository;
use crate::data::types::{
    CoursePage, CourseRow, CourseUpdate, CreatedAt, EntityKind, OrderRow, QuestionRow, ReplyRow,
    ReviewRow, UserRole, UserRow,
};

use super::SqliteService;
use super::repositories::{analytics, course, order, thread, user};

#[async_trait]
impl TransactionalRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        cache: Option<&CacheService>,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), cache, name, email, role)
            .await
            .map_err(Into::into)
    }

    async fn get_user(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), cache, id)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError> {
        user::list_users(self.pool()).await.map_err(Into::into)
    }

    async fn update_user_role(
        &self,
        cache: Option<&CacheService>,
        id: &str,
        role: UserRole,
    ) -> Result<Option<UserRow>, DataError> {
        user::update_user_role(self.pool(), cache, id, role)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<bool, DataError> {
        user::delete_user(self.pool(), cache, id)
            .await
            .map_err(Into::into)
    }

    // ==================== Course Operations ====================

    async fn create_course(
        &self,
        cache: Option<&CacheService>,
        name: &str,
        description: &str,
        price: f64,
    ) -> Result<CourseRow, DataError> {
        course::create_course(self.pool(), cache, name, description, price)
            .await
            .map_err(Into::into)
    }

    async fn get_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<CourseRow>, DataError> {
        course::get_course(self.pool(), cache, id)
            .await
            .map_err(Into::into)
    }

    async fn list_courses(&self) -> Result<Vec<CourseRow>, DataError> {
        course::list_courses(self.pool()).await.map_err(Into::into)
    }

    async fn update_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
        update: &CourseUpdate,
    ) -> Result<Option<CourseRow>, DataError> {
        course::update_course(self.pool(), cache, id, update)
            .await
            .map_err(Into::into)
    }

    async fn search_courses(
        &self,
        title: &str,
        page: u32,
        limit: u32,
    ) -> Result<CoursePage, DataError> {
        course::search_courses(self.pool(), title, page, limit)
            .await
            .map_err(Into::into)
    }

    async fn delete_course(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<bool, DataError> {
        course::delete_course(self.pool(), cache, id)
            .await
            .map_err(Into::into)
    }

    // ==================== Order Operations ====================

    async fn create_order(
        &self,
        cache: Option<&CacheService>,
        user_id: &str,
        course_id: &str,
    ) -> Result<OrderRow, DataError> {
        order::create_order(self.pool(), cache, user_id, course_id)
            .await
            .map_err(Into::into)
    }

    async fn list_orders(&self) -> Result<Vec<OrderRow>, DataError> {
        order::list_orders(self.pool()).await.map_err(Into::into)
    }

    async fn has_purchased(&self, user_id: &str, course_id: &str) -> Result<bool, DataError> {
        thread::has_purchased(self.pool(), user_id, course_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Course Threads ====================

    async fn add_review(
        &self,
        cache: Option<&CacheService>,
        course_id: &str,
        user_id: &str,
        comment: &str,
        rating: i64,
    ) -> Result<ReviewRow, DataError> {
        thread::add_review(self.pool(), cache, course_id, user_id, comment, rating)
            .await
            .map_err(Into::into)
    }

    async fn add_review_reply(
        &self,
        course_id: &str,
        review_id: &str,
        user_id: &str,
        comment: &str,
    ) -> Result<Option<ReplyRow>, DataError> {
        thread::add_review_reply(self.pool(), course_id, review_id, user_id, comment)
            .await
            .map_err(Into::into)
    }

    async fn list_reviews(&self, course_id: &str) -> Result<Vec<ReviewRow>, DataError> {
        thread::list_reviews(self.pool(), course_id)
            .await
            .map_err(Into::into)
    }

    async fn add_question(
        &self,
        course_id: &str,
        user_id: &str,
        question: &str,
    ) -> Result<QuestionRow, DataError> {
        thread::add_question(self.pool(), course_id, user_id, question)
            .await
            .map_err(Into::into)
    }

    async fn add_answer(
        &self,
        course_id: &str,
        question_id: &str,
        user_id: &str,
        answer: &str,
    ) -> Result<Option<ReplyRow>, DataError> {
        thread::add_answer(self.pool(), course_id, question_id, user_id, answer)
            .await
            .map_err(Into::into)
    }

    async fn list_questions(&self, course_id: &str) -> Result<Vec<QuestionRow>, DataError> {
        thread::list_questions(self.pool(), course_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Analytics ====================

    async fn list_created_at(&self, kind: EntityKind) -> Result<Vec<CreatedAt>, DataError> {
        analytics::list_created_at(self.pool(), kind)
            .await
            .map_err(Into::into)
    }
}
