//! Creator profile route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use machbar_core::UserId;

use crate::catalog::CreatorProfile;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A creator with their products and posts.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreatorProfile>> {
    let id = UserId::new(id);
    state
        .catalog()
        .creator_profile(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("creator {id}")))
}
