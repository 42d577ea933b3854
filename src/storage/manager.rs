// Storage bootstrap: database location, connection and migrations
use crate::migration::Migrator;
use crate::storage::orm_storage::OrmPermissionStore;
use crate::storage::{Result, StorageError};
use sea_orm_migration::MigratorTrait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Simple storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub sqlite_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("team-plugin-perms");
        Self {
            sqlite_path: data_dir.join("team_plugin_perms.db"),
        }
    }
}

impl StorageConfig {
    /// Create config with custom database path
    pub fn with_db_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            sqlite_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the database URL for SeaORM, creating the file when missing
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.sqlite_path.display())
    }
}

/// Open the permission store and bring its schema up to date
pub async fn connect(config: &StorageConfig) -> Result<OrmPermissionStore> {
    if let Some(parent) = config.sqlite_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Database(format!("Failed to create database directory {:?}: {}", parent, e))
            })?;
        }
    }

    let store = OrmPermissionStore::new(&config.database_url()).await?;

    Migrator::up(store.connection(), None)
        .await
        .map_err(|e| StorageError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Permission store ready at {:?}", config.sqlite_path);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_requests_create_mode() {
        let config = StorageConfig::with_db_path("/var/lib/perms/perms.db");
        assert_eq!(config.database_url(), "sqlite:/var/lib/perms/perms.db?mode=rwc");
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::with_db_path(dir.path().join("nested").join("perms.db"));

        connect(&config).await.unwrap();
        // Second start runs the same migrations against the existing file
        connect(&config).await.unwrap();
        assert!(config.sqlite_path.exists());
    }
}
