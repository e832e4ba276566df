//! Bundled fallback catalog.
//!
//! The dataset is compiled in from `seed/catalog.json` so the store has
//! something to show before (or without) any network access.

use std::collections::HashSet;

use machbar_core::{
    Product, assign_unique_slugs, community_feed, link_creator_products, sort_products,
};
use serde::Deserialize;
use thiserror::Error;

use super::Catalog;

const SEED_JSON: &str = include_str!("../../seed/catalog.json");

/// The bundled seed could not be used.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed catalog has no products")]
    Empty,
}

/// A consistency problem found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedIssue {
    #[error("duplicate product id {0}")]
    DuplicateId(String),

    #[error("duplicate slug {0}")]
    DuplicateSlug(String),

    #[error("{product}: subcategory {sub_category} does not belong to {category}")]
    SubcategoryMismatch {
        product: String,
        category: String,
        sub_category: String,
    },

    #[error("{0}: id uses the remote prefix, upvotes would be written to Airtable")]
    RemoteId(String),
}

#[derive(Deserialize)]
struct SeedFile {
    products: Vec<Product>,
}

/// Parse the bundled dataset as written, without normalizing it.
///
/// # Errors
///
/// Returns `SeedError` if the JSON doesn't parse or holds no products.
pub fn raw() -> Result<Vec<Product>, SeedError> {
    let file: SeedFile = serde_json::from_str(SEED_JSON)?;
    if file.products.is_empty() {
        return Err(SeedError::Empty);
    }
    Ok(file.products)
}

/// Load the seed catalog, ranked, with unique slugs and its derived feed.
///
/// # Errors
///
/// Returns `SeedError` if the bundled dataset is unusable.
pub fn load() -> Result<Catalog, SeedError> {
    let mut products = raw()?;
    assign_unique_slugs(&mut products);
    link_creator_products(&mut products);
    let posts = community_feed(&products);
    sort_products(&mut products);
    Ok(Catalog { products, posts })
}

/// Report consistency problems in a product list.
#[must_use]
pub fn check(products: &[Product]) -> Vec<SeedIssue> {
    let mut issues = Vec::new();
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();

    for product in products {
        if !ids.insert(product.id.as_str()) {
            issues.push(SeedIssue::DuplicateId(product.id.to_string()));
        }
        if !slugs.insert(product.slug.as_str()) {
            issues.push(SeedIssue::DuplicateSlug(product.slug.to_string()));
        }
        if let Some(sub) = product.sub_category
            && !sub.belongs_to(product.category)
        {
            issues.push(SeedIssue::SubcategoryMismatch {
                product: product.id.to_string(),
                category: product.category.to_string(),
                sub_category: sub.to_string(),
            });
        }
        if product.id.is_remote() {
            issues.push(SeedIssue::RemoteId(product.id.to_string()));
        }
    }

    issues
}
