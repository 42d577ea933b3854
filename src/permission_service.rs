//! Team plugin permission service.
//!
//! Every mutation runs the store call and the matching index update inside
//! one write lock, so readers never see one without the other. A failed
//! store call returns before the index is touched.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AccessError, Result};
use crate::permission_index::{PermissionIndex, RebuildSummary};
use crate::plugin_catalog::PluginCatalog;
use crate::storage::PermissionStore;
use crate::types::{TeamFilter, TeamId, TeamPermission};
use crate::validation::validate_page_access;

pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
    catalog: Arc<dyn PluginCatalog>,
    index: RwLock<PermissionIndex>,
    enforcement_enabled: bool,
}

impl PermissionService {
    /// Create a service with an empty index; call [`Self::rebuild_index`] before serving
    pub fn new(store: Arc<dyn PermissionStore>, catalog: Arc<dyn PluginCatalog>) -> Self {
        Self {
            store,
            catalog,
            index: RwLock::new(PermissionIndex::new()),
            enforcement_enabled: true,
        }
    }

    pub fn with_enforcement(mut self, enabled: bool) -> Self {
        self.enforcement_enabled = enabled;
        self
    }

    pub fn enforcement_enabled(&self) -> bool {
        self.enforcement_enabled
    }

    pub fn catalog(&self) -> &Arc<dyn PluginCatalog> {
        &self.catalog
    }

    /// Replace the index with one derived from every stored record
    pub async fn rebuild_index(&self) -> Result<RebuildSummary> {
        let mut index = self.index.write().await;

        info!("Loading in saved team plugin permissions...");
        let records = self.store.get_by_team(TeamFilter::All).await?;
        let plugins = self.catalog.plugins();

        let (rebuilt, summary) = PermissionIndex::rebuild(&records, &plugins);
        *index = rebuilt;

        info!(
            records = summary.records,
            governed_plugins = summary.governed_plugins,
            dashboards = summary.dashboards,
            "Team plugin permission index rebuilt"
        );
        Ok(summary)
    }

    /// Refresh the plugin catalog and re-derive the index against it
    pub async fn reload_catalog(&self) -> Result<RebuildSummary> {
        let count = self.catalog.reload()?;
        debug!(plugins = count, "Plugin catalog reloaded");
        self.rebuild_index().await
    }

    pub async fn add_permission<S: AsRef<str>>(
        &self,
        plugin_id: &str,
        team_id: TeamId,
        pages: &[S],
    ) -> Result<TeamPermission> {
        let pages = validate_page_access(pages)?;

        let mut index = self.index.write().await;

        let existing = self.store.get_by_team(TeamFilter::Team(team_id)).await?;
        if existing
            .iter()
            .any(|p| p.team_id == team_id && p.plugin_id == plugin_id)
        {
            return Err(AccessError::DuplicateGrant {
                team_id,
                plugin_id: plugin_id.to_string(),
            });
        }

        let record = self.store.create(plugin_id, team_id, &pages).await?;

        match self.catalog.plugin(plugin_id) {
            Some(plugin) => index.apply_grant(&plugin, team_id, &record.page_access),
            None => debug!(plugin_id, "Plugin not loaded, index update deferred to next rebuild"),
        }

        info!(id = record.id, team_id, plugin_id, "Team plugin permission created");
        Ok(record)
    }

    /// Overwrite the pages of a permission.
    ///
    /// `last_modified` (unix seconds) must be strictly later than the stored value.
    pub async fn patch_permission<S: AsRef<str>>(
        &self,
        id: i64,
        last_modified: i64,
        pages: &[S],
    ) -> Result<TeamPermission> {
        let mut index = self.index.write().await;

        let existing = self.store.get_by_id(id).await?;
        let stored = existing.last_modified.timestamp();
        if last_modified <= stored {
            return Err(AccessError::StaleWrite {
                id,
                supplied: last_modified,
                stored,
            });
        }

        let pages = validate_page_access(pages)?;
        let updated = self
            .store
            .patch(id, existing.team_id, &existing.plugin_id, &pages)
            .await?;

        if let Some(plugin) = self.catalog.plugin(&existing.plugin_id) {
            index.revoke_grant(&plugin, existing.team_id, &existing.page_access);
            index.apply_grant(&plugin, updated.team_id, &updated.page_access);
        }

        info!(id, team_id = updated.team_id, plugin_id = %updated.plugin_id, "Team-based permission patched");
        Ok(updated)
    }

    /// Delete a permission and return the record that was removed
    pub async fn delete_permission(&self, id: i64) -> Result<TeamPermission> {
        let mut index = self.index.write().await;

        let existing = self.store.get_by_id(id).await?;
        self.store.delete(id).await?;

        if let Some(plugin) = self.catalog.plugin(&existing.plugin_id) {
            index.revoke_grant(&plugin, existing.team_id, &existing.page_access);
        }

        info!(id, team_id = existing.team_id, plugin_id = %existing.plugin_id, "Team-based permission removed");
        Ok(existing)
    }

    pub async fn get_permissions_for_team(&self, filter: TeamFilter) -> Result<Vec<TeamPermission>> {
        let _index = self.index.read().await;
        Ok(self.store.get_by_team(filter).await?)
    }

    pub async fn get_permission(&self, id: i64) -> Result<TeamPermission> {
        let _index = self.index.read().await;
        Ok(self.store.get_by_id(id).await?)
    }

    /// Teams allowed on a governed dashboard
    pub async fn dashboard_teams(&self, uid: &str) -> Option<BTreeSet<TeamId>> {
        self.index.read().await.dashboard_teams(uid).cloned()
    }

    /// Whether a user in `user_teams` may open the dashboard
    pub async fn can_access_dashboard(&self, uid: &str, user_teams: &[TeamId], is_admin: bool) -> bool {
        if is_admin || !self.enforcement_enabled {
            return true;
        }

        let index = self.index.read().await;
        match index.dashboard_teams(uid) {
            None => true,
            Some(teams) => {
                let allowed = user_teams.iter().any(|team| teams.contains(team));
                if !allowed {
                    warn!(uid, ?user_teams, "Dashboard access denied by team plugin permissions");
                }
                allowed
            }
        }
    }
}
