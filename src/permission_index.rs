//! In-memory permission index.
//!
//! Holds, per plugin, which teams may open which pages, and the derived
//! dashboard uid → teams map read on every dashboard request. The index is
//! owned by [`crate::permission_service::PermissionService`] and only ever
//! mutated behind its lock.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::plugin_catalog::Plugin;
use crate::types::{TeamId, TeamPermission, WILDCARD_PAGE};

/// Page slot inside a plugin's grants
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageKey {
    /// Every page of the plugin
    Wildcard,
    Named(String),
}

impl PageKey {
    pub fn from_page(page: &str) -> Self {
        if page == WILDCARD_PAGE {
            PageKey::Wildcard
        } else {
            PageKey::Named(page.to_string())
        }
    }
}

/// Team sets per page of a single plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginGrants {
    pages: BTreeMap<PageKey, BTreeSet<TeamId>>,
}

impl PluginGrants {
    /// Replace whatever the team held on this plugin with `pages`
    pub fn grant<S: AsRef<str>>(&mut self, team_id: TeamId, pages: &[S]) {
        self.revoke_all(team_id);
        for page in pages {
            self.pages
                .entry(PageKey::from_page(page.as_ref()))
                .or_default()
                .insert(team_id);
        }
    }

    /// Remove the team from the listed pages only
    pub fn revoke<S: AsRef<str>>(&mut self, team_id: TeamId, pages: &[S]) {
        for page in pages {
            let key = PageKey::from_page(page.as_ref());
            if let Some(teams) = self.pages.get_mut(&key) {
                teams.remove(&team_id);
                if teams.is_empty() {
                    self.pages.remove(&key);
                }
            }
        }
    }

    pub fn revoke_all(&mut self, team_id: TeamId) {
        self.pages.retain(|_, teams| {
            teams.remove(&team_id);
            !teams.is_empty()
        });
    }

    pub fn teams(&self, key: &PageKey) -> Option<&BTreeSet<TeamId>> {
        self.pages.get(key)
    }

    pub fn wildcard_teams(&self) -> Option<&BTreeSet<TeamId>> {
        self.teams(&PageKey::Wildcard)
    }

    /// Teams allowed on the named page: the wildcard holders when any exist,
    /// otherwise the page's own grants
    pub fn teams_for_page(&self, page: &str) -> BTreeSet<TeamId> {
        if let Some(wildcard) = self.wildcard_teams() {
            return wildcard.clone();
        }
        self.teams(&PageKey::Named(page.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Counters reported after a full rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RebuildSummary {
    pub records: usize,
    pub governed_plugins: usize,
    pub dashboards: usize,
}

#[derive(Debug, Default)]
pub struct PermissionIndex {
    plugins: HashMap<String, PluginGrants>,
    dashboards: HashMap<String, BTreeSet<TeamId>>,
}

impl PermissionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from every stored record and the current catalog
    pub fn rebuild(records: &[TeamPermission], plugins: &[Plugin]) -> (Self, RebuildSummary) {
        let mut index = Self::new();
        for record in records {
            index.fold_grant(&record.plugin_id, record.team_id, &record.page_access);
        }

        let mut summary = RebuildSummary {
            records: records.len(),
            ..RebuildSummary::default()
        };

        for plugin in plugins.iter().filter(|p| !p.core) {
            if !index.plugins.contains_key(&plugin.id) {
                tracing::warn!(plugin_id = %plugin.id, "Permission not defined for plugin");
            }
            if plugin.has_dashboards() {
                summary.governed_plugins += 1;
            }
            index.recompute_dashboards(plugin);
        }

        summary.dashboards = index.dashboard_count();
        (index, summary)
    }

    /// Record a grant without touching dashboards
    pub fn fold_grant<S: AsRef<str>>(&mut self, plugin_id: &str, team_id: TeamId, pages: &[S]) {
        self.plugins
            .entry(plugin_id.to_string())
            .or_default()
            .grant(team_id, pages);
    }

    pub fn apply_grant<S: AsRef<str>>(&mut self, plugin: &Plugin, team_id: TeamId, pages: &[S]) {
        self.fold_grant(&plugin.id, team_id, pages);
        self.recompute_dashboards(plugin);
    }

    /// Remove the team from `pages` of the plugin and refresh its dashboards
    pub fn revoke_grant<S: AsRef<str>>(&mut self, plugin: &Plugin, team_id: TeamId, pages: &[S]) {
        if let Some(grants) = self.plugins.get_mut(&plugin.id) {
            grants.revoke(team_id, pages);
            if grants.is_empty() {
                self.plugins.remove(&plugin.id);
            }
        }
        self.recompute_dashboards(plugin);
    }

    /// Re-derive the team set of every dashboard the plugin ships.
    ///
    /// Dashboards of a plugin without grants stay present with an empty set.
    pub fn recompute_dashboards(&mut self, plugin: &Plugin) {
        if plugin.core {
            return;
        }

        let grants = self.plugins.get(&plugin.id);
        for (page, uid) in plugin.dashboards() {
            let teams = grants
                .map(|g| g.teams_for_page(page))
                .unwrap_or_default();
            self.dashboards.insert(uid.to_string(), teams);
        }
    }

    /// Teams allowed on a dashboard, `None` when the dashboard is not governed
    pub fn dashboard_teams(&self, uid: &str) -> Option<&BTreeSet<TeamId>> {
        self.dashboards.get(uid)
    }

    pub fn plugin_grants(&self, plugin_id: &str) -> Option<&PluginGrants> {
        self.plugins.get(plugin_id)
    }

    pub fn dashboard_count(&self) -> usize {
        self.dashboards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin_catalog::{IncludeType, PluginInclude};
    use chrono::Utc;

    fn dashboard(name: &str, uid: &str) -> PluginInclude {
        PluginInclude {
            include_type: IncludeType::Dashboard,
            name: name.to_string(),
            uid: Some(uid.to_string()),
        }
    }

    fn plugin(id: &str, includes: Vec<PluginInclude>) -> Plugin {
        Plugin {
            id: id.to_string(),
            name: id.to_string(),
            core: false,
            includes,
        }
    }

    fn acme() -> Plugin {
        plugin(
            "acme-app",
            vec![dashboard("x", "uid-x"), dashboard("y", "uid-y")],
        )
    }

    fn record(id: i64, team_id: TeamId, plugin_id: &str, pages: &[&str]) -> TeamPermission {
        TeamPermission {
            id,
            team_id,
            plugin_id: plugin_id.to_string(),
            page_access: pages.iter().map(|p| p.to_string()).collect(),
            last_modified: Utc::now(),
        }
    }

    fn teams(index: &PermissionIndex, uid: &str) -> Vec<TeamId> {
        index
            .dashboard_teams(uid)
            .map(|t| t.iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn wildcard_grant_reaches_every_dashboard() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 4, &["*"]);

        assert_eq!(teams(&index, "uid-x"), vec![4]);
        assert_eq!(teams(&index, "uid-y"), vec![4]);
    }

    #[test]
    fn named_grant_reaches_only_matching_dashboard() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 4, &["x"]);

        assert_eq!(teams(&index, "uid-x"), vec![4]);
        assert!(teams(&index, "uid-y").is_empty());
    }

    #[test]
    fn wildcard_set_replaces_named_grants() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 1, &["*"]);
        index.apply_grant(&acme(), 2, &["y"]);

        assert_eq!(teams(&index, "uid-x"), vec![1]);
        assert_eq!(teams(&index, "uid-y"), vec![1]);

        // Named grants come back once no team holds the wildcard
        index.revoke_grant(&acme(), 1, &["*"]);
        assert!(teams(&index, "uid-x").is_empty());
        assert_eq!(teams(&index, "uid-y"), vec![2]);
    }

    #[test]
    fn regrant_replaces_previous_pages() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 4, &["x"]);
        index.apply_grant(&acme(), 4, &["*"]);

        let grants = index.plugin_grants("acme-app").unwrap();
        assert!(grants.wildcard_teams().unwrap().contains(&4));
        assert!(grants.teams(&PageKey::Named("x".to_string())).is_none());

        index.apply_grant(&acme(), 4, &["y"]);
        let grants = index.plugin_grants("acme-app").unwrap();
        assert!(grants.wildcard_teams().is_none());
        assert_eq!(teams(&index, "uid-x"), Vec::<TeamId>::new());
        assert_eq!(teams(&index, "uid-y"), vec![4]);
    }

    #[test]
    fn revoke_after_grant_leaves_dashboards_admin_only() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 4, &["x"]);
        index.revoke_grant(&acme(), 4, &["x"]);

        assert!(index.plugin_grants("acme-app").is_none());
        assert_eq!(index.dashboard_teams("uid-x"), Some(&BTreeSet::new()));
        assert_eq!(index.dashboard_teams("uid-y"), Some(&BTreeSet::new()));
    }

    #[test]
    fn patch_style_revoke_then_grant_moves_team() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 4, &["x", "y"]);
        index.apply_grant(&acme(), 9, &["x"]);

        index.revoke_grant(&acme(), 4, &["x", "y"]);
        index.apply_grant(&acme(), 4, &["y"]);

        assert_eq!(teams(&index, "uid-x"), vec![9]);
        assert_eq!(teams(&index, "uid-y"), vec![4]);
    }

    #[test]
    fn revoke_keeps_other_teams() {
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 1, &["x"]);
        index.apply_grant(&acme(), 2, &["x"]);
        index.revoke_grant(&acme(), 1, &["x"]);

        assert_eq!(teams(&index, "uid-x"), vec![2]);
    }

    #[test]
    fn rebuild_without_grants_marks_dashboards_admin_only() {
        let plugins = vec![
            acme(),
            plugin(
                "panel-only",
                vec![PluginInclude {
                    include_type: IncludeType::Panel,
                    name: "Gauge".to_string(),
                    uid: Some("gauge".to_string()),
                }],
            ),
        ];

        let (index, summary) = PermissionIndex::rebuild(&[], &plugins);

        assert_eq!(index.dashboard_teams("uid-x"), Some(&BTreeSet::new()));
        assert_eq!(index.dashboard_teams("uid-y"), Some(&BTreeSet::new()));
        assert!(index.dashboard_teams("gauge").is_none());
        assert!(index.plugin_grants("panel-only").is_none());
        assert_eq!(
            summary,
            RebuildSummary {
                records: 0,
                governed_plugins: 1,
                dashboards: 2
            }
        );
    }

    #[test]
    fn rebuild_replays_stored_records() {
        let records = vec![
            record(1, 2, "acme-app", &["*"]),
            record(2, 3, "acme-app", &["y"]),
            record(3, 3, "removed-app", &["z"]),
        ];

        let (index, summary) = PermissionIndex::rebuild(&records, &[acme()]);

        assert_eq!(teams(&index, "uid-x"), vec![2]);
        assert_eq!(teams(&index, "uid-y"), vec![2]);
        assert!(index.plugin_grants("removed-app").is_some());
        assert_eq!(summary.records, 3);
        assert_eq!(index.dashboard_count(), 2);
    }

    #[test]
    fn core_plugins_are_not_governed() {
        let mut core = acme();
        core.core = true;

        let (index, summary) = PermissionIndex::rebuild(&[], &[core]);
        assert!(index.dashboard_teams("uid-x").is_none());
        assert_eq!(summary.governed_plugins, 0);
    }

    #[test]
    fn grants_partition_by_plugin() {
        let other = plugin("other-app", vec![dashboard("x", "other-x")]);
        let mut index = PermissionIndex::new();
        index.apply_grant(&acme(), 1, &["x"]);
        index.apply_grant(&other, 1, &["*"]);
        index.revoke_grant(&other, 1, &["*"]);

        assert_eq!(teams(&index, "uid-x"), vec![1]);
        assert!(teams(&index, "other-x").is_empty());
    }
}
