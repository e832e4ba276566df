//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use machbar_core::{CategoryInfo, ExploreQuery, Product, ProductCategory};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// A navigation category with the number of products in it.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub info: CategoryInfo,
    pub product_count: usize,
}

/// Products in one category, in ranking order.
#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: CategoryInfo,
    pub products: Vec<Product>,
}

/// All navigation categories with their product counts.
pub async fn index(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    let summaries = state
        .catalog()
        .category_counts()
        .into_iter()
        .map(|(category, product_count)| CategorySummary {
            info: category.info(),
            product_count,
        })
        .collect();
    Json(summaries)
}

/// One category page.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPage>> {
    let category = ProductCategory::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let products = state.catalog().explore(&ExploreQuery {
        category: Some(category),
        ..ExploreQuery::default()
    });

    Ok(Json(CategoryPage {
        category: category.info(),
        products,
    }))
}
