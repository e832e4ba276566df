//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use machbar_core::{App, ExploreQuery, ExploreSort, Product, ProductCategory, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::clamp_limit;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Upper bound for `?limit=`.
const MAX_LIMIT: usize = 100;

/// Explore query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ExploreParams {
    pub search: Option<String>,
    /// Category slug or display name.
    pub category: Option<String>,
    /// `all`, `trending`, `new` or `most-voted`.
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

impl ExploreParams {
    fn to_query(&self) -> Result<ExploreQuery> {
        let category = self
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                ProductCategory::from_slug(c)
                    .ok_or_else(|| AppError::BadRequest(format!("unknown category: {c}")))
            })
            .transpose()?;

        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<ExploreSort>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .unwrap_or_default();

        Ok(ExploreQuery {
            search: self.search.clone(),
            category,
            sort,
        })
    }
}

/// Explore response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    /// Matches before `limit` was applied.
    pub total: usize,
    pub products: Vec<Product>,
}

/// List products for the explore page.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ExploreParams>,
) -> Result<Json<ProductList>> {
    let query = params.to_query()?;
    let mut products = state.catalog().explore(&query);
    let total = products.len();
    if let Some(limit) = clamp_limit(params.limit, MAX_LIMIT) {
        products.truncate(limit);
    }
    Ok(Json(ProductList { total, products }))
}

/// Product detail with its apps split by certification.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub certified_apps: Vec<App>,
    pub community_apps: Vec<App>,
}

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        let certified_apps = product.certified_apps().cloned().collect();
        let community_apps = product.community_apps().cloned().collect();
        Self {
            product,
            certified_apps,
            community_apps,
        }
    }
}

/// Product detail by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    state
        .catalog()
        .product_by_slug(&slug)
        .map(|product| Json(ProductDetail::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
}

/// Upvote response.
#[derive(Debug, Serialize)]
pub struct UpvoteResponse {
    pub product_id: ProductId,
    pub upvotes: u64,
    /// Whether a write-back to the remote source was started.
    pub persisting: bool,
}

/// Add one upvote. The remote write-back is not awaited.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpvoteResponse>> {
    let product_id = ProductId::new(id);
    let receipt = state
        .catalog()
        .upvote(&product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    add_breadcrumb(
        "catalog",
        "Upvoted product",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(Json(UpvoteResponse {
        product_id: receipt.product_id,
        upvotes: receipt.upvotes,
        persisting: receipt.persistence.is_some(),
    }))
}
