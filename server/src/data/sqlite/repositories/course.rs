//! Course repository for SQLite operations
//!
//! `get_course` is cache-through when a cache is passed. Anything that
//! changes a stored course (update, delete, a new review) drops its entry.

use std::time::Duration;

use sqlx::SqlitePool;

use super::invalidate;
use crate::core::constants::CACHE_TTL_COURSE;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::sqlite::SqliteError;
use crate::data::types::{CoursePage, CourseRow, CourseUpdate, EntityKind};
use crate::utils::time::now_secs;

type CourseTuple = (String, String, String, f64, f64, i64, i64);

const SELECT_COURSE: &str =
    "SELECT id, name, description, price, ratings, created_at, updated_at FROM courses";

/// Name match used by search: case-insensitive, spaces ignored on both sides
const NAME_MATCH: &str = "REPLACE(LOWER(name), ' ', '') LIKE ? ESCAPE '\\'";

fn to_row(
    (id, name, description, price, ratings, created_at, updated_at): CourseTuple,
) -> CourseRow {
    CourseRow {
        id,
        name,
        description,
        price,
        ratings,
        created_at,
        updated_at,
    }
}

pub async fn create_course(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    name: &str,
    description: &str,
    price: f64,
) -> Result<CourseRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_secs();

    sqlx::query(
        "INSERT INTO courses (id, name, description, price, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    invalidate(cache, &[CacheKey::analytics(EntityKind::Courses)]).await;

    Ok(CourseRow {
        id,
        name: name.to_string(),
        description: description.to_string(),
        price,
        ratings: 0.0,
        created_at: now,
        updated_at: now,
    })
}

/// Get a course by ID (with optional caching)
pub async fn get_course(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
) -> Result<Option<CourseRow>, SqliteError> {
    let Some(cache) = cache else {
        return get_course_from_db(pool, id).await;
    };

    let key = CacheKey::course(id);
    match cache.get::<CourseRow>(&key).await {
        Ok(Some(course)) => {
            tracing::trace!(%id, "Course cache hit");
            return Ok(Some(course));
        }
        Err(e) => tracing::warn!(%id, error = %e, "Cache get error"),
        Ok(None) => {}
    }

    let result = get_course_from_db(pool, id).await?;
    if let Some(course) = &result
        && let Err(e) = cache
            .set(&key, course, Some(Duration::from_secs(CACHE_TTL_COURSE)))
            .await
    {
        tracing::warn!(%id, error = %e, "Cache set error");
    }

    Ok(result)
}

async fn get_course_from_db(pool: &SqlitePool, id: &str) -> Result<Option<CourseRow>, SqliteError> {
    let row = sqlx::query_as::<_, CourseTuple>(&format!("{SELECT_COURSE} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(to_row))
}

/// All courses, newest first
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<CourseRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CourseTuple>(&format!(
        "{SELECT_COURSE} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_row).collect())
}

/// Apply a partial update. Returns `None` when the course does not exist.
pub async fn update_course(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
    update: &CourseUpdate,
) -> Result<Option<CourseRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE courses SET name = COALESCE(?, name), description = COALESCE(?, description), price = COALESCE(?, price), updated_at = ? WHERE id = ?",
    )
    .bind(update.name.as_deref())
    .bind(update.description.as_deref())
    .bind(update.price)
    .bind(now_secs())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    invalidate(cache, &[CacheKey::course(id)]).await;

    get_course_from_db(pool, id).await
}

/// Turn a search phrase into a LIKE pattern over space-stripped lowercase names
fn name_pattern(title: &str) -> String {
    let mut pattern = String::from("%");
    for c in title.chars().filter(|c| !c.is_whitespace()) {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.extend(c.to_lowercase());
    }
    pattern.push('%');
    pattern
}

/// Courses whose name contains `title`, newest first.
///
/// `page` starts at 1. An empty title matches every course.
pub async fn search_courses(
    pool: &SqlitePool,
    title: &str,
    page: u32,
    limit: u32,
) -> Result<CoursePage, SqliteError> {
    let pattern = name_pattern(title);
    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM courses WHERE {NAME_MATCH}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, CourseTuple>(&format!(
        "{SELECT_COURSE} WHERE {NAME_MATCH} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    ))
    .bind(&pattern)
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(CoursePage {
        courses: rows.into_iter().map(to_row).collect(),
        total: u64::try_from(total).unwrap_or(0),
    })
}

/// Delete a course and, through the foreign keys, its orders and threads.
pub async fn delete_course(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;

    if deleted {
        invalidate(
            cache,
            &[
                CacheKey::course(id),
                CacheKey::analytics(EntityKind::Courses),
                CacheKey::analytics(EntityKind::Orders),
            ],
        )
        .await;
    }

    Ok(deleted)
}
