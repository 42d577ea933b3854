use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::storage::StorageConfig;
use crate::types::TeamId;

/// Command line options for the team plugin permission service.
#[derive(Parser, Debug)]
#[command(author, version, about = "Team-based page access for plugin dashboards")]
pub struct Cli {
    /// Path to the JSON config file (default: ~/.team-plugin-perms/config.json)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Port for the HTTP server
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Plugin catalog JSON file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Rebuild the permission index and print a summary
    Rebuild,
    /// Print stored permissions of a team, -1 for every team
    List {
        #[arg(long, allow_hyphen_values = true)]
        team_id: TeamId,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    /// Apply flag values on top of the loaded config
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = &self.db {
            config.storage = StorageConfig::with_db_path(db);
        }
        if let Some(catalog) = &self.catalog {
            config.plugins.catalog_path = catalog.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["team-plugin-perms"]);
        assert_eq!(cli.command(), Command::Serve);
        assert!(cli.config.is_none());
    }

    #[test]
    fn list_accepts_all_teams_sentinel() {
        let cli = Cli::parse_from(["team-plugin-perms", "list", "--team-id", "-1"]);
        assert_eq!(cli.command(), Command::List { team_id: -1 });
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "team-plugin-perms",
            "--port",
            "9100",
            "--db",
            "/tmp/perms.db",
            "rebuild",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(cli.command(), Command::Rebuild);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("/tmp/perms.db"));
    }
}
