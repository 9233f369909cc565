//! Order repository for SQLite operations

use sqlx::SqlitePool;

use super::invalidate;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::sqlite::SqliteError;
use crate::data::types::{EntityKind, OrderRow};
use crate::utils::time::now_secs;

/// Record a purchase. Fails with `Conflict` when the user or course is unknown.
pub async fn create_order(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    user_id: &str,
    course_id: &str,
) -> Result<OrderRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_secs();

    sqlx::query("INSERT INTO orders (id, user_id, course_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(course_id)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| {
            SqliteError::from_write(e, "Duplicate order entered", "Unknown user or course")
        })?;

    invalidate(cache, &[CacheKey::analytics(EntityKind::Orders)]).await;

    Ok(OrderRow {
        id,
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        created_at: now,
    })
}

/// All orders, newest first
pub async fn list_orders(pool: &SqlitePool) -> Result<Vec<OrderRow>, SqliteError> {
    let rows = sqlx::query_as::<_, (String, String, String, i64)>(
        "SELECT id, user_id, course_id, created_at FROM orders ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, user_id, course_id, created_at)| OrderRow {
            id,
            user_id,
            course_id,
            created_at,
        })
        .collect())
}
