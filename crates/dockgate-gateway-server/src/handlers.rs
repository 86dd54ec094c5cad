//! HTTP endpoint handlers for the container routes

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use dockgate_engine::bollard::models::{ContainerInspectResponse, ContainerSummary};
use dockgate_gateway::{BulkFailure, ContainerId, ErrorKind, GatewayError, LifecycleAction};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// List containers
#[instrument(skip(state))]
pub async fn list_containers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ContainerSummary>>, AppError> {
    info!("[GET] - list");
    let containers = state.gateway.list(query.status.as_deref()).await?;
    Ok(Json(containers))
}

/// Inspect one container
#[instrument(skip(state))]
pub async fn inspect_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContainerInspectResponse>, AppError> {
    info!("[GET] - inspect");
    let id = ContainerId::new(id)?;
    Ok(Json(state.gateway.inspect(&id).await?))
}

/// Full log text of one container
#[instrument(skip(state))]
pub async fn container_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, AppError> {
    info!("[GET] - logs");
    let id = ContainerId::new(id)?;
    Ok(state.gateway.logs(&id).await?)
}

#[instrument(skip(state))]
pub async fn delete_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    info!("[DELETE] - delete");
    let id = ContainerId::new(id)?;
    state.gateway.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk lifecycle action named by the last path segment. Shares its path
/// with delete, so a container may be called `stop` and still be removed.
pub async fn apply_action(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    payload: Result<Json<Vec<ContainerId>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let action = LifecycleAction::parse(&segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown action: {segment}")))?;
    bulk(state, action, payload).await
}

/// A rejected body (malformed JSON, a blank id) fails before any container is
/// touched.
#[instrument(skip(state, payload))]
async fn bulk(
    state: AppState,
    action: LifecycleAction,
    payload: Result<Json<Vec<ContainerId>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    info!("[PUT] - {}", action);
    let Json(ids) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    state.gateway.apply(action, &ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health() -> &'static str {
    "healthy"
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(msg) => AppError::BadRequest(msg),
            GatewayError::NotFound(msg) => AppError::NotFound(msg),
            GatewayError::Engine(msg) => AppError::Internal(msg),
        }
    }
}

impl From<BulkFailure> for AppError {
    fn from(failure: BulkFailure) -> Self {
        let message = failure.to_string();
        match failure.kind() {
            ErrorKind::Validation => AppError::BadRequest(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Engine => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NotFound(msg) => {
                warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::Internal(msg) => {
                error!("Engine error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (GatewayError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (GatewayError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (GatewayError::Engine("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_bulk_failure_keeps_kind_and_id() {
        let failure = BulkFailure {
            action: LifecycleAction::Kill,
            id: ContainerId::new("c3").unwrap(),
            error: GatewayError::NotFound("No such container: c3".into()),
        };

        match AppError::from(failure) {
            AppError::NotFound(msg) => {
                assert_eq!(msg, "kill failed for container c3: No such container: c3")
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
