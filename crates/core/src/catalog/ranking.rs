//! Catalog ordering and the leaderboard.
//!
//! The ranking rule is a two-tier total order: products with at least one
//! real image come before products that only have placeholder glyphs, and
//! within a tier products are ordered by upvotes, highest first. Equal
//! upvotes keep their input order (the sort is stable).

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::Product;
use crate::types::{ProductId, Trend};

/// Compare two products under the ranking rule.
#[must_use]
pub fn rank_order(a: &Product, b: &Product) -> Ordering {
    b.has_real_image()
        .cmp(&a.has_real_image())
        .then_with(|| b.upvotes.cmp(&a.upvotes))
}

/// Sort products in place under the ranking rule. Stable.
pub fn sort_products(products: &mut [Product]) {
    products.sort_by(rank_order);
}

/// Whether `products` is already in ranking order.
#[must_use]
pub fn is_ranked(products: &[Product]) -> bool {
    products
        .windows(2)
        .all(|pair| matches!(pair, [a, b] if rank_order(a, b) != Ordering::Greater))
}

/// Zero-based position of every product, keyed by id.
#[must_use]
pub fn positions(products: &[Product]) -> HashMap<ProductId, usize> {
    products
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect()
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    pub trend: Trend,
    pub product: Product,
}

/// Build the leaderboard from an already ranked list.
///
/// `previous` holds the zero-based positions from before the most recent
/// reordering; products missing from it are reported as [`Trend::Same`].
#[must_use]
pub fn leaderboard(
    ranked: &[Product],
    previous: &HashMap<ProductId, usize>,
    limit: Option<usize>,
) -> Vec<LeaderboardEntry> {
    ranked
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, product)| {
            let trend = match previous.get(&product.id) {
                Some(&before) if before > i => Trend::Up,
                Some(&before) if before < i => Trend::Down,
                _ => Trend::Same,
            };
            LeaderboardEntry {
                rank: i + 1,
                trend,
                product: product.clone(),
            }
        })
        .collect()
}
