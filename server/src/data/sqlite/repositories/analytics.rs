//! Creation-time scans feeding the analytics series

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{CreatedAt, EntityKind};

/// Every creation timestamp of `kind`, in no particular order
pub async fn list_created_at(
    pool: &SqlitePool,
    kind: EntityKind,
) -> Result<Vec<CreatedAt>, SqliteError> {
    // Table name comes from a closed enum, never from input
    let sql = format!("SELECT created_at FROM {}", kind.table());
    let rows: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(rows.into_iter().map(CreatedAt).collect())
}
