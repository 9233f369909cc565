//! Data storage layer
//!
//! - `sqlite` - Transactional store for users, courses and orders
//! - `cache` - In-memory and Redis caching
//! - `types` - Row types and shared enums
//! - `traits` - Repository trait handlers and services depend on
//! - `error` - Unified error type

pub mod cache;
pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::TransactionalRepository;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::storage::AppStorage;

/// Transactional database service
///
/// Owns the SQLite service and hands out repository trait objects.
pub struct TransactionalService {
    sqlite: Arc<SqliteService>,
}

impl TransactionalService {
    /// Open the SQLite database under the data directory
    pub async fn init(storage: &AppStorage) -> Result<Self, DataError> {
        let service = SqliteService::init(storage).await?;
        Ok(Self {
            sqlite: Arc::new(service),
        })
    }

    /// Wrap an already-initialized SQLite service
    pub fn from_sqlite(sqlite: SqliteService) -> Self {
        Self {
            sqlite: Arc::new(sqlite),
        }
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        self.sqlite.checkpoint().await.map_err(Into::into)
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        self.sqlite.close().await
    }

    /// Start the background WAL checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sqlite.start_checkpoint_task(shutdown_rx)
    }

    /// Repository trait object for data operations
    pub fn repository(&self) -> Box<dyn TransactionalRepository + Send + Sync> {
        Box::new(Arc::clone(&self.sqlite))
    }
}

#[cfg(test)]
impl TransactionalService {
    /// Migrated in-memory database
    pub async fn in_memory() -> Self {
        Self::from_sqlite(SqliteService::in_memory().await)
    }

    pub fn pool(&self) -> &sqlite::SqlitePool {
        self.sqlite.pool()
    }
}
