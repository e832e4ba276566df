//! Community feed route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use machbar_core::CommunityPost;
use machbar_core::catalog::feed::normalize_hashtags;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Only posts carrying this tag; a leading `#` is optional.
    pub hashtag: Option<String>,
}

/// The community feed, newest first.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Json<Vec<CommunityPost>> {
    let mut posts = state.catalog().get_posts();

    let wanted = params
        .hashtag
        .map(|tag| normalize_hashtags(&[tag]))
        .and_then(|tags| tags.into_iter().next());
    if let Some(tag) = wanted {
        posts.retain(|post| post.hashtags.contains(&tag));
    }

    Json(posts)
}
