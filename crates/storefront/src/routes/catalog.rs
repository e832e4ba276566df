//! Catalog status and refresh handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{CatalogStatus, RefreshOutcome};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: CatalogStatus,
    /// Whether a remote source is configured at all.
    pub remote: bool,
    /// Seconds between background refreshes; `None` when only the start-up
    /// refresh runs.
    pub refresh_interval_secs: Option<u64>,
}

/// Loading flag, last error and counts.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let catalog = state.catalog();
    Json(StatusResponse {
        status: catalog.status(),
        remote: catalog.source().is_configured(),
        refresh_interval_secs: state
            .config()
            .catalog
            .refresh_interval
            .map(|interval| interval.as_secs()),
    })
}

/// Refresh the catalog from the remote source.
///
/// The refresh runs on its own task so a client disconnect can't cancel it
/// halfway.
#[instrument(skip_all)]
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshOutcome>> {
    let catalog = state.catalog_handle();
    let outcome = tokio::spawn(async move { catalog.refresh().await })
        .await
        .map_err(|e| AppError::Internal(format!("catalog refresh task: {e}")))?;
    Ok(Json(outcome))
}
