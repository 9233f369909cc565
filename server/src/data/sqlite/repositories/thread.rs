//! Course review and question threads
//!
//! A review carries a 1-5 rating; writing one recomputes the course's mean
//! rating in the same transaction. Replies and answers are flat lists under
//! their parent.

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::invalidate;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::sqlite::SqliteError;
use crate::data::types::{QuestionRow, ReplyRow, ReviewRow};
use crate::utils::time::now_secs;

const UNKNOWN_REF: &str = "Unknown user or course";

type ReplyTuple = (String, String, String, String, i64);

fn to_reply((id, parent_id, user_id, body, created_at): ReplyTuple) -> ReplyRow {
    ReplyRow {
        id,
        parent_id,
        user_id,
        body,
        created_at,
    }
}

/// Whether `user_id` holds an order for `course_id`
pub async fn has_purchased(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
) -> Result<bool, SqliteError> {
    let found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE user_id = ? AND course_id = ?)")
            .bind(user_id)
            .bind(course_id)
            .fetch_one(pool)
            .await?;
    Ok(found)
}

// ==================== Reviews ====================

/// Add a review and refresh the course's mean rating
pub async fn add_review(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    course_id: &str,
    user_id: &str,
    comment: &str,
    rating: i64,
) -> Result<ReviewRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_secs();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO course_reviews (id, course_id, user_id, comment, rating, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(course_id)
    .bind(user_id)
    .bind(comment)
    .bind(rating)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::from_write(e, "Duplicate review entered", UNKNOWN_REF))?;

    sqlx::query(
        "UPDATE courses SET ratings = (SELECT AVG(rating) FROM course_reviews WHERE course_id = ?), updated_at = ? WHERE id = ?",
    )
    .bind(course_id)
    .bind(now)
    .bind(course_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    invalidate(cache, &[CacheKey::course(course_id)]).await;

    Ok(ReviewRow {
        id,
        course_id: course_id.to_string(),
        user_id: user_id.to_string(),
        comment: comment.to_string(),
        rating,
        created_at: now,
        replies: Vec::new(),
    })
}

/// Reply to a review. Returns `None` when the review is not on that course.
pub async fn add_review_reply(
    pool: &SqlitePool,
    course_id: &str,
    review_id: &str,
    user_id: &str,
    comment: &str,
) -> Result<Option<ReplyRow>, SqliteError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM course_reviews WHERE id = ? AND course_id = ?)",
    )
    .bind(review_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    if !exists {
        return Ok(None);
    }

    let id = cuid2::create_id();
    let now = now_secs();
    sqlx::query(
        "INSERT INTO review_replies (id, review_id, user_id, comment, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(review_id)
    .bind(user_id)
    .bind(comment)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Duplicate reply entered", UNKNOWN_REF))?;

    Ok(Some(ReplyRow {
        id,
        parent_id: review_id.to_string(),
        user_id: user_id.to_string(),
        body: comment.to_string(),
        created_at: now,
    }))
}

/// Reviews of a course, oldest first, each with its replies
pub async fn list_reviews(pool: &SqlitePool, course_id: &str) -> Result<Vec<ReviewRow>, SqliteError> {
    let reviews = sqlx::query_as::<_, (String, String, String, String, i64, i64)>(
        "SELECT id, course_id, user_id, comment, rating, created_at FROM course_reviews WHERE course_id = ? ORDER BY created_at, id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    let replies = sqlx::query_as::<_, ReplyTuple>(
        "SELECT r.id, r.review_id, r.user_id, r.comment, r.created_at FROM review_replies r JOIN course_reviews v ON v.id = r.review_id WHERE v.course_id = ? ORDER BY r.created_at, r.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    let mut rows: Vec<ReviewRow> = reviews
        .into_iter()
        .map(|(id, course_id, user_id, comment, rating, created_at)| ReviewRow {
            id,
            course_id,
            user_id,
            comment,
            rating,
            created_at,
            replies: Vec::new(),
        })
        .collect();
    attach(&mut rows, replies, |r| &r.id, |r, reply| r.replies.push(reply));
    Ok(rows)
}

// ==================== Questions ====================

/// Ask a question on a course
pub async fn add_question(
    pool: &SqlitePool,
    course_id: &str,
    user_id: &str,
    question: &str,
) -> Result<QuestionRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_secs();

    sqlx::query(
        "INSERT INTO course_questions (id, course_id, user_id, question, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(course_id)
    .bind(user_id)
    .bind(question)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Duplicate question entered", UNKNOWN_REF))?;

    Ok(QuestionRow {
        id,
        course_id: course_id.to_string(),
        user_id: user_id.to_string(),
        question: question.to_string(),
        created_at: now,
        answers: Vec::new(),
    })
}

/// Answer a question. Returns `None` when the question is not on that course.
pub async fn add_answer(
    pool: &SqlitePool,
    course_id: &str,
    question_id: &str,
    user_id: &str,
    answer: &str,
) -> Result<Option<ReplyRow>, SqliteError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM course_questions WHERE id = ? AND course_id = ?)",
    )
    .bind(question_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    if !exists {
        return Ok(None);
    }

    let id = cuid2::create_id();
    let now = now_secs();
    sqlx::query(
        "INSERT INTO question_answers (id, question_id, user_id, answer, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(question_id)
    .bind(user_id)
    .bind(answer)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Duplicate answer entered", UNKNOWN_REF))?;

    Ok(Some(ReplyRow {
        id,
        parent_id: question_id.to_string(),
        user_id: user_id.to_string(),
        body: answer.to_string(),
        created_at: now,
    }))
}

/// Questions on a course, oldest first, each with its answers
pub async fn list_questions(
    pool: &SqlitePool,
    course_id: &str,
) -> Result<Vec<QuestionRow>, SqliteError> {
    let questions = sqlx::query_as::<_, (String, String, String, String, i64)>(
        "SELECT id, course_id, user_id, question, created_at FROM course_questions WHERE course_id = ? ORDER BY created_at, id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    let answers = sqlx::query_as::<_, ReplyTuple>(
        "SELECT a.id, a.question_id, a.user_id, a.answer, a.created_at FROM question_answers a JOIN course_questions q ON q.id = a.question_id WHERE q.course_id = ? ORDER BY a.created_at, a.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    let mut rows: Vec<QuestionRow> = questions
        .into_iter()
        .map(|(id, course_id, user_id, question, created_at)| QuestionRow {
            id,
            course_id,
            user_id,
            question,
            created_at,
            answers: Vec::new(),
        })
        .collect();
    attach(&mut rows, answers, |q| &q.id, |q, answer| q.answers.push(answer));
    Ok(rows)
}

/// Distribute replies onto their parents, keeping reply order
fn attach<P>(
    parents: &mut [P],
    replies: Vec<ReplyTuple>,
    id: impl Fn(&P) -> &String,
    push: impl Fn(&mut P, ReplyRow),
) {
    let index: HashMap<String, usize> = parents
        .iter()
        .enumerate()
        .map(|(i, p)| (id(p).clone(), i))
        .collect();
    for reply in replies.into_iter().map(to_reply) {
        if let Some(&i) = index.get(&reply.parent_id) {
            push(&mut parents[i], reply);
        }
    }
}
