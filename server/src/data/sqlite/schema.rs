//! SQLite schema definitions
//!
//! `SCHEMA` is the complete current schema, applied as-is to a fresh
//! database. Older databases are brought forward by the versioned
//! migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 3;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    role TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('user', 'admin')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Courses
-- =============================================================================
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 200),
    description TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL CHECK(price >= 0),
    ratings REAL NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 3. Orders (references users + courses)
-- =============================================================================
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
CREATE INDEX IF NOT EXISTS idx_orders_course ON orders(course_id);

-- =============================================================================
-- 4. Course reviews and replies
-- =============================================================================
CREATE TABLE IF NOT EXISTS course_reviews (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    comment TEXT NOT NULL,
    rating INTEGER NOT NULL CHECK(rating BETWEEN 1 AND 5),
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS review_replies (
    id TEXT PRIMARY KEY,
    review_id TEXT NOT NULL REFERENCES course_reviews(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    comment TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_course_reviews_course ON course_reviews(course_id);
CREATE INDEX IF NOT EXISTS idx_review_replies_review ON review_replies(review_id);

-- =============================================================================
-- 5. Course questions and answers
-- =============================================================================
CREATE TABLE IF NOT EXISTS course_questions (
    id TEXT PRIMARY KEY,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    question TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS question_answers (
    id TEXT PRIMARY KEY,
    question_id TEXT NOT NULL REFERENCES course_questions(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    answer TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_course_questions_course ON course_questions(course_id);
CREATE INDEX IF NOT EXISTS idx_question_answers_question ON question_answers(question_id);

-- =============================================================================
-- 6. Analytics: creation-time scans
-- =============================================================================
CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at);
CREATE INDEX IF NOT EXISTS idx_courses_created_at ON courses(created_at);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_contains_required_tables() {
        for table in [
            "schema_version",
            "schema_migrations",
            "users",
            "courses",
            "orders",
            "course_reviews",
            "review_replies",
            "course_questions",
            "question_answers",
        ] {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
                "Schema missing table: {table}"
            );
        }
    }

    #[test]
    fn test_every_entity_table_has_created_at_index() {
        for kind in crate::data::types::EntityKind::all() {
            let index = format!("ON {}(created_at)", kind.table());
            assert!(SCHEMA.contains(&index), "Schema missing index: {index}");
        }
    }

    #[tokio::test]
    async fn test_schema_applies_cleanly() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            tables,
            [
                "course_questions",
                "course_reviews",
                "courses",
                "orders",
                "question_answers",
                "review_replies",
                "schema_migrations",
                "schema_version",
                "users"
            ]
        );
    }
}
