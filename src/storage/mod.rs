// Permission storage module

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{TeamFilter, TeamId, TeamPermission};

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Item not found: {0}")]
    NotFound(String),
}

impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(what) => StorageError::NotFound(what),
            other => StorageError::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable CRUD over team plugin permission records
///
/// Every call is a single round trip; a failed call leaves no partial write behind.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Persist a new grant, stamping the current time
    async fn create(&self, plugin_id: &str, team_id: TeamId, pages: &[String]) -> Result<TeamPermission>;

    /// Records for one team, or every record ordered by team id for [`TeamFilter::All`]
    async fn get_by_team(&self, filter: TeamFilter) -> Result<Vec<TeamPermission>>;

    async fn get_by_id(&self, id: i64) -> Result<TeamPermission>;

    /// Overwrite the addressed record and stamp a fresh modification time
    async fn patch(&self, id: i64, team_id: TeamId, plugin_id: &str, pages: &[String]) -> Result<TeamPermission>;

    async fn delete(&self, id: i64) -> Result<()>;
}

pub mod manager;
pub mod orm_storage;

// Re-export commonly used types
pub use manager::StorageConfig;
pub use orm_storage::OrmPermissionStore;
