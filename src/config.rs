use crate::error::{AccessError, Result};
use crate::storage::StorageConfig;
use crate::types::TeamId;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".team-plugin-perms";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: Option<LoggingSettings>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub plugins: PluginSettings,
    #[serde(default)]
    pub team_permissions: TeamPermissionSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8860,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct LoggingSettings {
    pub level: String,
    pub file_name: Option<String>,
    /// Directory for the log file, defaults to the config directory's `logs`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_name: Some("team-plugin-perms.log".to_string()),
            dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct PluginSettings {
    /// JSON array describing installed plugins
    pub catalog_path: PathBuf,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            catalog_path: default_config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("plugins.json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct TeamPermissionSettings {
    /// Enforce dashboard access checks; the index is maintained either way
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Teams accepted by the API; empty accepts any positive id
    #[serde(default)]
    pub known_teams: Vec<TeamId>,
}

fn default_enabled() -> bool {
    true
}

impl Default for TeamPermissionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            known_teams: Vec::new(),
        }
    }
}

/// `~/.team-plugin-perms`
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        default_config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .ok_or_else(|| AccessError::ConfigError("Could not find home directory".to_string()))
    }

    /// Read the config file, writing defaults when it does not exist yet
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AccessError::ConfigError(format!("Failed to read config file: {}", e)))?;

            serde_json::from_str::<AppConfig>(&content).map_err(|e| {
                AccessError::ConfigError(format!(
                    "Failed to parse AppConfig: {}. Please fix the config file or delete it to use defaults.",
                    e
                ))
            })
        } else {
            let default_config = AppConfig::default();
            default_config.save_to(path)?;
            tracing::info!("Created new default config file at {:?}", path);
            Ok(default_config)
        }
    }

    /// Write through a temp file and rename
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AccessError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let file = File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    pub fn logging(&self) -> LoggingSettings {
        self.logging.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8860);
        assert!(config.team_permissions.enabled);
        assert!(config.team_permissions.known_teams.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"server": {"host": "0.0.0.0", "port": 9000}, "team_permissions": {"enabled": false, "known_teams": [1, 2]}}"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:9000");
        assert!(!config.team_permissions.enabled);
        assert_eq!(config.team_permissions.known_teams, vec![1, 2]);
        assert_eq!(config.logging().level, "info");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.storage = StorageConfig::with_db_path(dir.path().join("perms.db"));
        config.plugins.catalog_path = dir.path().join("plugins.json");
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.storage.sqlite_path, dir.path().join("perms.db"));
        assert_eq!(loaded.plugins.catalog_path, dir.path().join("plugins.json"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(AccessError::ConfigError(_))));
    }
}
