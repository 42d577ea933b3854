//! 基于 SeaORM 的权限存储实现
//!
//! 使用 SQLite 保存团队插件权限记录

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    NotSet, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};

use super::{PermissionStore, Result, StorageError};
use crate::entities::{prelude::*, team_plugin_permission, TeamPluginPermissionActiveModel};
use crate::types::{encode_pages, TeamFilter, TeamId, TeamPermission};

/// SeaORM 权限存储
#[derive(Debug, Clone)]
pub struct OrmPermissionStore {
    /// 数据库连接
    db: DatabaseConnection,
}

impl OrmPermissionStore {
    /// 连接数据库并应用性能设置
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Initializing SeaORM permission store, database: {}", database_url);

        let db = Database::connect(database_url)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to connect to database: {}", e)))?;

        Self::apply_performance_settings(&db).await;

        Ok(Self { db })
    }

    /// 获取数据库连接
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 应用性能优化设置
    async fn apply_performance_settings(db: &DatabaseConnection) {
        let settings = [
            "PRAGMA journal_mode = WAL",
            "PRAGMA synchronous = NORMAL",
            "PRAGMA temp_store = memory",
            "PRAGMA busy_timeout = 30000",
        ];

        for setting in settings {
            if let Err(e) = db
                .execute(sea_orm::Statement::from_string(
                    sea_orm::DatabaseBackend::Sqlite,
                    setting.to_string(),
                ))
                .await
            {
                tracing::warn!("Failed to apply database setting {}: {}", setting, e);
            }
        }
    }

    async fn find_model(&self, id: i64) -> Result<team_plugin_permission::Model> {
        TeamPluginPermission::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query permission {}: {}", id, e)))?
            .ok_or_else(|| StorageError::NotFound(format!("Team permission {} not found", id)))
    }
}

#[async_trait]
impl PermissionStore for OrmPermissionStore {
    async fn create(&self, plugin_id: &str, team_id: TeamId, pages: &[String]) -> Result<TeamPermission> {
        let model = TeamPluginPermissionActiveModel {
            id: NotSet,
            team_id: Set(team_id),
            plugin_id: Set(plugin_id.to_string()),
            last_modified: Set(chrono::Utc::now().timestamp()),
            page_access: Set(encode_pages(pages)),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to create permission: {}", e)))?;

        debug!(id = inserted.id, team_id, plugin_id, "Stored team plugin permission");
        Ok(inserted.into_permission())
    }

    async fn get_by_team(&self, filter: TeamFilter) -> Result<Vec<TeamPermission>> {
        let mut query = TeamPluginPermission::find();
        if let TeamFilter::Team(team_id) = filter {
            query = query.filter(TeamPluginPermissionColumn::TeamId.eq(team_id));
        }

        let models = query
            .order_by_asc(TeamPluginPermissionColumn::TeamId)
            .order_by_asc(TeamPluginPermissionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query permissions: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into_permission()).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<TeamPermission> {
        Ok(self.find_model(id).await?.into_permission())
    }

    async fn patch(&self, id: i64, team_id: TeamId, plugin_id: &str, pages: &[String]) -> Result<TeamPermission> {
        let existing = self.find_model(id).await?;

        let mut active: team_plugin_permission::ActiveModel = existing.into();
        active.team_id = Set(team_id);
        active.plugin_id = Set(plugin_id.to_string());
        active.last_modified = Set(chrono::Utc::now().timestamp());
        active.page_access = Set(encode_pages(pages));

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to patch permission {}: {}", id, e)))?;

        Ok(updated.into_permission())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = TeamPluginPermission::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to delete permission {}: {}", id, e)))?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound(format!("Team permission {} not found", id)));
        }

        Ok(())
    }
}
