//! Leaderboard route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use machbar_core::LeaderboardEntry;
use serde::Deserialize;

use super::clamp_limit;
use crate::state::AppState;

/// Entries shown when no limit is given.
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

/// Top products with rank and trend.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Json<Vec<LeaderboardEntry>> {
    let limit = clamp_limit(params.limit, MAX_LIMIT).unwrap_or(DEFAULT_LIMIT);
    Json(state.catalog().leaderboard(Some(limit)))
}
