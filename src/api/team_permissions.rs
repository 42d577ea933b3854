use std::collections::BTreeSet;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::error::AccessError;
use crate::types::{TeamFilter, TeamId, TeamPermission, ALL_TEAMS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_permissions)
                .post(create_permission)
                .patch(patch_permission)
                .delete(delete_permission),
        )
        .route("/dashboards/{uid}", get(dashboard_access))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamPermissionsCommand {
    pub team_id: TeamId,
    pub plugin_id: String,
    pub page_access: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTeamPermissionsCommand {
    pub id: i64,
    /// Unix seconds of the version the caller last read
    pub last_modified: i64,
    pub page_access: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTeamPermissionsCommand {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardAccessResponse {
    pub uid: String,
    pub teams: BTreeSet<TeamId>,
}

fn bad_request_data<E: std::fmt::Display>(err: E) -> ApiError {
    tracing::debug!("Rejected request payload: {}", err);
    ApiError::BadRequest("bad request data".to_string())
}

async fn ensure_team(state: &AppState, team_id: TeamId) -> Result<(), ApiError> {
    if state.teams.team_exists(team_id).await {
        Ok(())
    } else {
        Err(ApiError::NotFound("Team not found".to_string()))
    }
}

async fn create_permission(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeamPermissionsCommand>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(cmd) = payload.map_err(bad_request_data)?;

    ensure_team(&state, cmd.team_id).await?;
    if !state.service.catalog().contains(&cmd.plugin_id) {
        return Err(AccessError::UnknownPlugin(cmd.plugin_id).into());
    }

    state
        .service
        .add_permission(&cmd.plugin_id, cmd.team_id, &cmd.page_access)
        .await?;

    Ok(MessageResponse::new("Team plugin permission created"))
}

async fn list_permissions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<TeamPermission>>, ApiError> {
    let Query(query) = query.map_err(bad_request_data)?;

    let team_id = match query.team_id {
        None | Some(0) => {
            return Err(ApiError::BadRequest(
                "teamId query parameter is required".to_string(),
            ))
        }
        Some(team_id) => team_id,
    };

    if team_id != ALL_TEAMS {
        ensure_team(&state, team_id).await?;
    }

    let permissions = state
        .service
        .get_permissions_for_team(TeamFilter::from(team_id))
        .await?;
    Ok(Json(permissions))
}

async fn patch_permission(
    State(state): State<AppState>,
    payload: Result<Json<PatchTeamPermissionsCommand>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(cmd) = payload.map_err(bad_request_data)?;

    state
        .service
        .patch_permission(cmd.id, cmd.last_modified, &cmd.page_access)
        .await?;

    Ok(MessageResponse::new("Team-based permission patched"))
}

async fn delete_permission(
    State(state): State<AppState>,
    payload: Result<Json<DeleteTeamPermissionsCommand>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(cmd) = payload.map_err(bad_request_data)?;

    state.service.delete_permission(cmd.id).await?;

    Ok(MessageResponse::new("Team-based permission removed"))
}

async fn dashboard_access(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<DashboardAccessResponse>, ApiError> {
    let teams = state.service.dashboard_teams(&uid).await.ok_or_else(|| {
        ApiError::NotFound("Dashboard is not governed by team plugin permissions".to_string())
    })?;

    Ok(Json(DashboardAccessResponse { uid, teams }))
}
