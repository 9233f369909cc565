//! Row types for the transactional store
//!
//! Timestamps are Unix seconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::UserRole;
use crate::domain::analytics::Timestamped;
use crate::utils::time::secs_to_datetime;

/// User row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Course row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Mean review rating, 0 until the first review
    pub ratings: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial course update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// One page of a course name search
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub courses: Vec<CourseRow>,
    /// Matches across all pages
    pub total: u64,
}

/// Review of a course with its replies, oldest reply first
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    pub comment: String,
    pub rating: i64,
    pub created_at: i64,
    pub replies: Vec<ReplyRow>,
}

/// Reply in a review or question thread
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyRow {
    pub id: String,
    /// Review or question this reply belongs to
    pub parent_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: i64,
}

/// Question on a course with its answers, oldest answer first
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRow {
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    pub question: String,
    pub created_at: i64,
    pub answers: Vec<ReplyRow>,
}

/// Order row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub created_at: i64,
}

/// Bare creation timestamp, as loaded for analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAt(pub i64);

impl Timestamped for CreatedAt {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.0)
    }
}

impl Timestamped for UserRow {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.created_at)
    }
}

impl Timestamped for CourseRow {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.created_at)
    }
}

impl Timestamped for OrderRow {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        secs_to_datetime(self.created_at)
    }
}
