//! User repository for SQLite operations
//!
//! `get_user` is cache-through when a cache is passed. Mutations invalidate
//! the user's entries and the affected analytics series after the write.

use std::time::Duration;

use sqlx::SqlitePool;

use super::invalidate;
use crate::core::constants::{CACHE_TTL_NEGATIVE, CACHE_TTL_USER};
use crate::data::cache::{CacheKey, CacheService};
use crate::data::sqlite::SqliteError;
use crate::data::types::{EntityKind, UserRole, UserRow};
use crate::utils::time::now_secs;

type UserTuple = (String, String, String, String, i64, i64);

const SELECT_USER: &str = "SELECT id, name, email, role, created_at, updated_at FROM users";

fn to_row((id, name, email, role, created_at, updated_at): UserTuple) -> UserRow {
    let role = UserRole::parse(&role).unwrap_or_else(|| {
        tracing::warn!(%id, %role, "Unknown user role in database, treating as user");
        UserRole::User
    });
    UserRow {
        id,
        name,
        email,
        role,
        created_at,
        updated_at,
    }
}

/// Create a new user with a generated CUID2 ID
pub async fn create_user(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    name: &str,
    email: &str,
    role: UserRole,
) -> Result<UserRow, SqliteError> {
    let id = cuid2::create_id();
    let now = now_secs();

    sqlx::query(
        "INSERT INTO users (id, name, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Duplicate email entered", "Unknown user reference"))?;

    invalidate(cache, &[CacheKey::analytics(EntityKind::Users)]).await;

    Ok(UserRow {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID (with optional caching)
pub async fn get_user(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let Some(cache) = cache else {
        return get_user_from_db(pool, id).await;
    };

    let key = CacheKey::user(id);
    let neg_key = CacheKey::user_negative(id);

    match cache.get::<UserRow>(&key).await {
        Ok(Some(user)) => {
            tracing::trace!(%id, "User cache hit");
            return Ok(Some(user));
        }
        Err(e) => tracing::warn!(%id, error = %e, "Cache get error"),
        Ok(None) => {}
    }

    if cache.exists(&neg_key).await.unwrap_or(false) {
        tracing::trace!(%id, "User negative cache hit");
        return Ok(None);
    }

    let result = get_user_from_db(pool, id).await?;

    let stored = match &result {
        Some(user) => {
            cache
                .set(&key, user, Some(Duration::from_secs(CACHE_TTL_USER)))
                .await
        }
        None => {
            cache
                .set_raw(&neg_key, vec![], Some(Duration::from_secs(CACHE_TTL_NEGATIVE)))
                .await
        }
    };
    if let Err(e) = stored {
        tracing::warn!(%id, error = %e, "Cache set error");
    }

    Ok(result)
}

async fn get_user_from_db(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(to_row))
}

/// All users, newest first
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, SqliteError> {
    let rows = sqlx::query_as::<_, UserTuple>(&format!(
        "{SELECT_USER} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_row).collect())
}

/// Change a user's role. Returns `None` when the user does not exist.
pub async fn update_user_role(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
    role: UserRole,
) -> Result<Option<UserRow>, SqliteError> {
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(now_secs())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    invalidate(cache, &[CacheKey::user(id)]).await;

    get_user_from_db(pool, id).await
}

/// Delete a user and, through the foreign key, their orders.
pub async fn delete_user(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;

    if deleted {
        invalidate(
            cache,
            &[
                CacheKey::user(id),
                CacheKey::analytics(EntityKind::Users),
                CacheKey::analytics(EntityKind::Orders),
            ],
        )
        .await;
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::test_support::insert_user_at;

    #[tokio::test]
    async fn test_create_user() {
        let db = SqliteService::in_memory().await;
        let user = create_user(db.pool(), None, "Ada", "ada@learnhub.test", UserRole::User)
            .await
            .unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.name, "Ada");
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_conflicts() {
        let db = SqliteService::in_memory().await;
        create_user(db.pool(), None, "Ada", "ada@learnhub.test", UserRole::User)
            .await
            .unwrap();

        let err = create_user(db.pool(), None, "Other", "ada@learnhub.test", UserRole::Admin)
            .await
            .unwrap_err();
        match err {
            SqliteError::Conflict(msg) => assert_eq!(msg, "Duplicate email entered"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_user() {
        let db = SqliteService::in_memory().await;
        let created = create_user(db.pool(), None, "Ada", "ada@learnhub.test", UserRole::Admin)
            .await
            .unwrap();

        let fetched = get_user(db.pool(), None, &created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
        assert!(get_user(db.pool(), None, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_user_populates_cache() {
        let db = SqliteService::in_memory().await;
        let cache = CacheService::in_memory(100);
        let created = create_user(db.pool(), Some(&cache), "Ada", "ada@learnhub.test", UserRole::User)
            .await
            .unwrap();

        get_user(db.pool(), Some(&cache), &created.id).await.unwrap();
        let cached: Option<UserRow> = cache.get(&CacheKey::user(&created.id)).await.unwrap();
        assert_eq!(cached, Some(created));
    }

    #[tokio::test]
    async fn test_get_missing_user_sets_negative_entry() {
        let db = SqliteService::in_memory().await;
        let cache = CacheService::in_memory(100);

        assert!(get_user(db.pool(), Some(&cache), "ghost").await.unwrap().is_none());
        assert!(cache.exists(&CacheKey::user_negative("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_users_newest_first() {
        let db = SqliteService::in_memory().await;
        insert_user_at(db.pool(), "old", 1_000).await;
        insert_user_at(db.pool(), "new", 3_000).await;
        insert_user_at(db.pool(), "mid", 2_000).await;

        let ids: Vec<String> = list_users(db.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_update_user_role_invalidates_cache() {
        let db = SqliteService::in_memory().await;
        let cache = CacheService::in_memory(100);
        let created = create_user(db.pool(), Some(&cache), "Ada", "ada@learnhub.test", UserRole::User)
            .await
            .unwrap();
        get_user(db.pool(), Some(&cache), &created.id).await.unwrap();

        let updated = update_user_role(db.pool(), Some(&cache), &created.id, UserRole::Admin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, UserRole::Admin);

        let fetched = get_user(db.pool(), Some(&cache), &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_update_role_of_missing_user() {
        let db = SqliteService::in_memory().await;
        let result = update_user_role(db.pool(), None, "ghost", UserRole::Admin)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = SqliteService::in_memory().await;
        let cache = CacheService::in_memory(100);
        let created = create_user(db.pool(), Some(&cache), "Ada", "ada@learnhub.test", UserRole::User)
            .await
            .unwrap();
        get_user(db.pool(), Some(&cache), &created.id).await.unwrap();
        cache
            .set_raw(&CacheKey::analytics(EntityKind::Users), vec![1], None)
            .await
            .unwrap();

        assert!(delete_user(db.pool(), Some(&cache), &created.id).await.unwrap());
        assert!(!delete_user(db.pool(), Some(&cache), &created.id).await.unwrap());

        assert!(!cache.exists(&CacheKey::user(&created.id)).await.unwrap());
        assert!(!cache.exists(&CacheKey::analytics(EntityKind::Users)).await.unwrap());
        assert!(get_user(db.pool(), Some(&cache), &created.id).await.unwrap().is_none());
    }
}
