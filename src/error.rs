use crate::storage::StorageError;
use crate::types::TeamId;
use crate::validation::PageAccessError;

#[derive(thiserror::Error, Debug)]
pub enum AccessError {
    #[error("{0}")]
    InvalidPageAccess(#[from] PageAccessError),

    #[error("A permission already exists for team {team_id} and plugin {plugin_id}. Consider patching the existing permission")]
    DuplicateGrant { team_id: TeamId, plugin_id: String },

    #[error("Unknown pluginId: {0}")]
    UnknownPlugin(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Patch request for permission {id} is not later than the latest db entry (supplied {supplied}, stored {stored})")]
    StaleWrite { id: i64, supplied: i64, stored: i64 },

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AccessError {
    /// Rejected input that must not be retried unchanged
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AccessError::InvalidPageAccess(_)
                | AccessError::DuplicateGrant { .. }
                | AccessError::UnknownPlugin(_)
        )
    }
}

// Storage level "not found" keeps its meaning at the service boundary
impl From<StorageError> for AccessError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AccessError::NotFound(what),
            other => AccessError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;
