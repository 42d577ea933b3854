pub mod api;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod logging;
pub mod migration;
pub mod permission_index;
pub mod permission_service;
pub mod plugin_catalog;
pub mod storage;
pub mod teams;
pub mod types;
pub mod validation;

use std::path::PathBuf;
use std::sync::Arc;

use api::{AppState, API_PREFIX};
use cli::{Cli, Command};
use config::AppConfig;
use error::{AccessError, Result};
use permission_service::PermissionService;
use plugin_catalog::StaticPluginCatalog;
use teams::StaticTeamDirectory;
use types::TeamFilter;

/// Connect the store, load the plugin catalog and wire up the service.
///
/// The index is empty until [`PermissionService::rebuild_index`] runs.
pub async fn build_service(config: &AppConfig) -> Result<PermissionService> {
    let store = storage::manager::connect(&config.storage).await?;
    let catalog = StaticPluginCatalog::from_file(&config.plugins.catalog_path)?;

    Ok(PermissionService::new(Arc::new(store), Arc::new(catalog))
        .with_enforcement(config.team_permissions.enabled))
}

/// Serve the HTTP API until ctrl-c
pub async fn serve(config: &AppConfig, service: Arc<PermissionService>) -> Result<()> {
    #[cfg(unix)]
    spawn_catalog_reloader(service.clone())?;

    let state = AppState {
        service,
        teams: Arc::new(StaticTeamDirectory::from_config(
            &config.team_permissions.known_teams,
        )),
    };
    let app = api::router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AccessError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Team plugin permission API listening on http://{}{}", addr, API_PREFIX);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping server");
        })
        .await
        .map_err(|e| AccessError::NetworkError(format!("Server error: {}", e)))?;

    Ok(())
}

// SIGHUP re-reads the plugin catalog and rebuilds the index against it
#[cfg(unix)]
fn spawn_catalog_reloader(service: Arc<PermissionService>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            match service.reload_catalog().await {
                Ok(summary) => tracing::info!(
                    dashboards = summary.dashboards,
                    "Plugin catalog reloaded on SIGHUP"
                ),
                Err(e) => tracing::error!("Failed to reload plugin catalog: {}", e),
            }
        }
    });
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    // 1) Config first, flags on top
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };
    let mut config = AppConfig::load_from(&config_path)?;
    cli.apply_overrides(&mut config);

    // 2) Logging before anything that logs
    let log_dir = config_path
        .parent()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let _log_guard = logging::init(&config.logging(), &log_dir)?;
    tracing::info!("Starting team plugin permission service");

    // 3) Store, catalog, then one full rebuild before any request is served
    let service = Arc::new(build_service(&config).await?);
    let summary = service.rebuild_index().await?;
    tracing::info!(
        enforcement = service.enforcement_enabled(),
        "Team plugin permission index ready"
    );

    match cli.command() {
        Command::Serve => serve(&config, service).await,
        Command::Rebuild => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::List { team_id } => {
            let permissions = service
                .get_permissions_for_team(TeamFilter::from(team_id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&permissions)?);
            Ok(())
        }
    }
}
