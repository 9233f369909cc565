//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl SqliteError {
    /// Classify a failed write.
    ///
    /// Unique violations become `Conflict(duplicate)`, foreign-key violations
    /// become `Conflict(missing_ref)`, anything else stays a database error.
    pub fn from_write(e: sqlx::Error, duplicate: &str, missing_ref: &str) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return Self::Conflict(duplicate.to_string());
            }
            if db.is_foreign_key_violation() {
                return Self::Conflict(missing_ref.to_string());
            }
        }
        Self::Database(e)
    }
}
