//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness (catalog non-empty)
//!
//! # Products
//! GET  /api/products              - Explore (search, category, sort, limit)
//! GET  /api/products/{slug}       - Product detail
//! POST /api/products/{id}/upvote  - Optimistic upvote
//!
//! # Browsing
//! GET  /api/categories            - Categories with product counts
//! GET  /api/categories/{slug}     - Products in one category
//! GET  /api/leaderboard           - Ranked products with trend
//! GET  /api/community             - Community feed
//! GET  /api/creators/{id}         - Creator profile
//!
//! # Catalog
//! GET  /api/catalog               - Loading flag, error, counts
//! POST /api/catalog/refresh       - Refresh from the remote source
//! ```

pub mod catalog;
pub mod categories;
pub mod community;
pub mod creators;
pub mod leaderboard;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{id}/upvote", post(products::upvote))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::status))
        .route("/refresh", post(catalog::refresh))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/catalog", catalog_routes())
        .route("/leaderboard", get(leaderboard::index))
        .route("/community", get(community::index))
        .route("/creators/{id}", get(creators::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// The complete application with state and request tracing.
///
/// Sentry layers are added by the binary, which owns the Sentry client.
pub fn app(state: AppState) -> Router {
    routes().layer(TraceLayer::new_for_http()).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog has nothing to serve.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.catalog().status().products > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Clamp a `limit` query parameter to `1..=max`.
pub(crate) fn clamp_limit(limit: Option<usize>, max: usize) -> Option<usize> {
    limit.map(|l| l.clamp(1, max))
}
