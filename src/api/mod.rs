//! HTTP boundary for team plugin permissions.

pub mod error;
pub mod team_permissions;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::permission_service::PermissionService;
use crate::teams::TeamDirectory;

pub use error::ApiError;

pub const API_PREFIX: &str = "/api/team-plugin-perms";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PermissionService>,
    pub teams: Arc<dyn TeamDirectory>,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, team_permissions::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
