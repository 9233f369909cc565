//! Database migration system
//!
//! A fresh database receives the full current schema in one step. Existing
//! databases replay every versioned migration above their recorded version.

use std::time::Instant;

use sqlx::SqlitePool;

use super::error::SqliteError;
use super::schema::{SCHEMA, SCHEMA_VERSION};
use crate::utils::crypto::sha256_hex;
use crate::utils::time::now_secs;

/// Version 2: indexes backing the analytics creation-time scans
const MIGRATION_V2: &str = "
CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at);
CREATE INDEX IF NOT EXISTS idx_courses_created_at ON courses(created_at);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)
";

/// Version 3: course ratings plus review and question threads
const MIGRATION_V3: &str = "
ALTER TABLE courses ADD COLUMN ratings REAL NOT NULL DEFAULT 0;
CREATE TABLE IF NOT EXISTS course_reviews (id TEXT PRIMARY KEY, course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE, user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE, comment TEXT NOT NULL, rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5), created_at INTEGER NOT NULL);
CREATE TABLE IF NOT EXISTS review_replies (id TEXT PRIMARY KEY, review_id TEXT NOT NULL REFERENCES course_reviews(id) ON DELETE CASCADE, user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE, comment TEXT NOT NULL, created_at INTEGER NOT NULL);
CREATE INDEX IF NOT EXISTS idx_course_reviews_course ON course_reviews(course_id);
CREATE INDEX IF NOT EXISTS idx_review_replies_review ON review_replies(review_id);
CREATE TABLE IF NOT EXISTS course_questions (id TEXT PRIMARY KEY, course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE, user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE, question TEXT NOT NULL, created_at INTEGER NOT NULL);
CREATE TABLE IF NOT EXISTS question_answers (id TEXT PRIMARY KEY, question_id TEXT NOT NULL REFERENCES course_questions(id) ON DELETE CASCADE, user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE, answer TEXT NOT NULL, created_at INTEGER NOT NULL);
CREATE INDEX IF NOT EXISTS idx_course_questions_course ON course_questions(course_id);
CREATE INDEX IF NOT EXISTS idx_question_answers_question ON question_answers(question_id)
";

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteError> {
    let initialized: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if !initialized {
        tracing::debug!(version = SCHEMA_VERSION, "Initializing database schema");
        return apply_initial_schema(pool).await;
    }

    let current: i32 = sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
        .fetch_optional(pool)
        .await?
        .unwrap_or(0);

    if current >= SCHEMA_VERSION {
        tracing::debug!(version = current, "Database schema is up to date");
        return Ok(());
    }

    for version in (current + 1)..=SCHEMA_VERSION {
        tracing::debug!(version, "Applying migration");
        apply_migration(pool, version).await?;
    }

    Ok(())
}

async fn apply_initial_schema(pool: &SqlitePool) -> Result<(), SqliteError> {
    let start = Instant::now();
    let mut tx = pool.begin().await?;

    sqlx::raw_sql(SCHEMA).execute(&mut *tx).await?;

    let now = now_secs();
    sqlx::query(
        "INSERT INTO schema_version (id, version, applied_at, description) VALUES (1, ?, ?, 'Initial schema')",
    )
    .bind(SCHEMA_VERSION)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let elapsed_ms = start.elapsed().as_millis() as i64;
    record_migration(&mut tx, SCHEMA_VERSION, "initial_schema", SCHEMA, now, elapsed_ms).await?;

    tx.commit().await?;

    tracing::debug!(elapsed_ms, "Applied initial schema");
    Ok(())
}

async fn apply_migration(pool: &SqlitePool, version: i32) -> Result<(), SqliteError> {
    match version {
        // Version 1 only ever arrives through the initial schema
        1 => Ok(()),
        2 => apply_versioned_migration(pool, 2, "add_created_at_indexes", MIGRATION_V2).await,
        3 => apply_versioned_migration(pool, 3, "add_course_threads", MIGRATION_V3).await,
        _ => Err(SqliteError::MigrationFailed {
            version,
            name: "unknown".to_string(),
            error: format!("Unknown migration version: {}", version),
        }),
    }
}

async fn apply_versioned_migration(
    pool: &SqlitePool,
    version: i32,
    name: &str,
    sql: &str,
) -> Result<(), SqliteError> {
    let start = Instant::now();
    let mut tx = pool.begin().await?;

    for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| SqliteError::MigrationFailed {
                version,
                name: name.to_string(),
                error: format!(
                    "Failed at statement: {} - {}",
                    &statement[..statement.len().min(50)],
                    e
                ),
            })?;
    }

    let now = now_secs();
    sqlx::query("UPDATE schema_version SET version = ?, applied_at = ?, description = ? WHERE id = 1")
        .bind(version)
        .bind(now)
        .bind(name)
        .execute(&mut *tx)
        .await?;

    let elapsed_ms = start.elapsed().as_millis() as i64;
    record_migration(&mut tx, version, name, sql, now, elapsed_ms).await?;

    tx.commit().await?;

    tracing::debug!(version, name, elapsed_ms, "Applied migration");
    Ok(())
}

async fn record_migration(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    version: i32,
    name: &str,
    sql: &str,
    applied_at: i64,
    elapsed_ms: i64,
) -> Result<(), SqliteError> {
    sqlx::query(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, success) VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(version)
    .bind(name)
    .bind(applied_at)
    .bind(sha256_hex(sql))
    .bind(elapsed_ms)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
