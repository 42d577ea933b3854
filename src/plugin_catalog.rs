//! Read contract over the installed plugin catalog.
//!
//! The catalog itself is owned by the host; this crate only needs to list
//! plugins and find the dashboard includes of one plugin.

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Kind of resource a plugin ships
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncludeType {
    Dashboard,
    Page,
    Panel,
    Datasource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInclude {
    #[serde(rename = "type")]
    pub include_type: IncludeType,
    pub name: String,
    #[serde(default)]
    pub uid: Option<String>,
}

impl PluginInclude {
    /// Dashboard uid when this include is an addressable dashboard
    pub fn dashboard_uid(&self) -> Option<&str> {
        match (self.include_type, self.uid.as_deref()) {
            (IncludeType::Dashboard, Some(uid)) if !uid.is_empty() => Some(uid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Bundled with the host; never governed by team permissions
    #[serde(default)]
    pub core: bool,
    #[serde(default)]
    pub includes: Vec<PluginInclude>,
}

impl Plugin {
    /// (page name, dashboard uid) for every dashboard include
    pub fn dashboards(&self) -> impl Iterator<Item = (&str, &str)> {
        self.includes
            .iter()
            .filter_map(|include| include.dashboard_uid().map(|uid| (include.name.as_str(), uid)))
    }

    pub fn has_dashboards(&self) -> bool {
        self.dashboards().next().is_some()
    }
}

pub trait PluginCatalog: Send + Sync {
    /// Snapshot of every installed plugin
    fn plugins(&self) -> Vec<Plugin>;

    fn plugin(&self, plugin_id: &str) -> Option<Plugin>;

    fn contains(&self, plugin_id: &str) -> bool {
        self.plugin(plugin_id).is_some()
    }

    /// Refresh from the catalog's source, returning the number of plugins now known
    fn reload(&self) -> Result<usize> {
        Ok(self.plugins().len())
    }
}

/// Catalog held in memory, optionally backed by a JSON file
#[derive(Debug, Default)]
pub struct StaticPluginCatalog {
    plugins: RwLock<HashMap<String, Plugin>>,
    source: Option<PathBuf>,
}

impl StaticPluginCatalog {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self {
            plugins: RwLock::new(Self::key_by_id(plugins)),
            source: None,
        }
    }

    /// Load a JSON array of plugins; a missing file yields an empty catalog
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let plugins = Self::read_file(&path)?;
        tracing::info!("Loaded {} plugins from {:?}", plugins.len(), path);

        Ok(Self {
            plugins: RwLock::new(Self::key_by_id(plugins)),
            source: Some(path),
        })
    }

    /// Swap the whole catalog
    pub fn replace(&self, plugins: Vec<Plugin>) {
        let mut guard = self.plugins.write().unwrap_or_else(|e| e.into_inner());
        *guard = Self::key_by_id(plugins);
    }

    fn read_file(path: &Path) -> Result<Vec<Plugin>> {
        if !path.exists() {
            tracing::warn!("Plugin catalog file {:?} not found, starting empty", path);
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path)?;
        let plugins: Vec<Plugin> = serde_json::from_str(&content).map_err(|e| {
            AccessError::ConfigError(format!("Failed to parse plugin catalog {:?}: {}", path, e))
        })?;

        for plugin in plugins.iter().filter(|p| !p.core) {
            for include in plugin.includes.iter().filter(|i| i.dashboard_uid().is_none()) {
                tracing::debug!(
                    plugin_id = %plugin.id,
                    include = %include.name,
                    include_type = %include.include_type,
                    "Include has no dashboard uid, access is not governed"
                );
            }
        }
        Ok(plugins)
    }

    fn key_by_id(plugins: Vec<Plugin>) -> HashMap<String, Plugin> {
        plugins.into_iter().map(|p| (p.id.clone(), p)).collect()
    }
}

impl PluginCatalog for StaticPluginCatalog {
    fn plugins(&self) -> Vec<Plugin> {
        let guard = self.plugins.read().unwrap_or_else(|e| e.into_inner());
        let mut plugins: Vec<Plugin> = guard.values().cloned().collect();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));
        plugins
    }

    fn plugin(&self, plugin_id: &str) -> Option<Plugin> {
        let guard = self.plugins.read().unwrap_or_else(|e| e.into_inner());
        guard.get(plugin_id).cloned()
    }

    fn reload(&self) -> Result<usize> {
        let path = self.source.as_ref().ok_or_else(|| {
            AccessError::ConfigError("Plugin catalog has no backing file to reload".to_string())
        })?;

        let plugins = Self::read_file(path)?;
        let count = plugins.len();
        self.replace(plugins);
        tracing::info!("Reloaded plugin catalog from {:?}: {} plugins", path, count);
        Ok(count)
    }
}
