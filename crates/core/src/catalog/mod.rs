//! Catalog entities and the pure logic that operates on them.
//!
//! Entities are value objects. The only field the storefront ever mutates is
//! [`Product::upvotes`], and only upwards.
//!
//! # Modules
//!
//! - [`ranking`] - the catalog ordering and the leaderboard
//! - [`feed`] - community feed derived from creators' posts
//! - [`query`] - explore filters, category and creator lookups

pub mod feed;
pub mod query;
pub mod ranking;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    AppId, ImageRef, PostId, Price, ProductCategory, ProductId, ProductStatus, ProductSubcategory,
    SkillLevel, Slug, UserBadge, UserId,
};

pub use feed::community_feed;
pub use query::{ExploreQuery, ExploreSort};
pub use ranking::{LeaderboardEntry, leaderboard, sort_products};

/// Id of the stand-in creator used when a creator reference can't be resolved.
pub const ANONYMOUS_CREATOR_ID: &str = "unknown";

/// A listed hardware product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<ProductSubcategory>,
    pub description: String,
    pub price: Price,
    /// Ordered; the first entry is the primary display image.
    pub images: Vec<ImageRef>,
    /// Embedded copy of the creator, taken when the product was loaded.
    pub creator: User,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub privacy_verified: bool,
    #[serde(default)]
    pub launch_date: String,
    pub slug: Slug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<App>,
}

impl Product {
    /// Whether at least one image is a real picture rather than a glyph.
    #[must_use]
    pub fn has_real_image(&self) -> bool {
        self.images.iter().any(ImageRef::is_real)
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&ImageRef> {
        self.images.first()
    }

    /// Launch date parsed as `YYYY-MM-DD`, if it is one.
    #[must_use]
    pub fn launch_day(&self) -> Option<NaiveDate> {
        let raw = self.launch_date.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Apps certified by the product's maker, in listing order.
    pub fn certified_apps(&self) -> impl Iterator<Item = &App> {
        self.apps.iter().filter(|a| a.certified)
    }

    /// Community-built apps, in listing order.
    pub fn community_apps(&self) -> impl Iterator<Item = &App> {
        self.apps.iter().filter(|a| !a.certified)
    }
}

/// A user; as a product creator it is embedded by value in each product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Handle used in profile URLs (e.g. `pollen_robotics`).
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub badge: UserBadge,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance_tokens: Option<u64>,
    #[serde(default)]
    pub credibility_score: u32,
    #[serde(default)]
    pub products: Vec<ProductId>,
    #[serde(default)]
    pub contributions: Vec<AppId>,
    #[serde(default)]
    pub posts: Vec<CommunityPost>,
}

impl User {
    /// The stand-in creator for products whose creator can't be resolved.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: UserId::new(ANONYMOUS_CREATOR_ID),
            name: "Anonymous Maker".to_string(),
            username: "anonymous_maker".to_string(),
            badge: UserBadge::Maker,
            credibility_score: 100,
            ..Self::default()
        }
    }

    /// A copy without back-references, for embedding as a post author.
    #[must_use]
    pub fn summary(&self) -> Self {
        Self {
            products: Vec::new(),
            contributions: Vec::new(),
            posts: Vec::new(),
            ..self.clone()
        }
    }
}

/// A post in the community feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: PostId,
    /// Left empty in embedded data; the feed fills it in from the owner.
    #[serde(default)]
    pub author: User,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductId>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub replies: u64,
}

/// Software built for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub certified: bool,
    #[serde(default)]
    pub downloads: u64,
    pub creator: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductId>,
}

/// Make every slug in `products` unique.
///
/// The first product keeps its slug; later duplicates get `-2`, `-3`, ...
/// (skipping suffixes that are already taken). Idempotent.
pub fn assign_unique_slugs(products: &mut [Product]) {
    let mut taken: HashSet<Slug> = HashSet::with_capacity(products.len());

    for product in products.iter_mut() {
        if taken.contains(&product.slug) {
            let base = product.slug.clone();
            let mut n = 2;
            while taken.contains(&base.with_suffix(n)) {
                n += 1;
            }
            product.slug = base.with_suffix(n);
        }
        taken.insert(product.slug.clone());
    }
}

/// Fill each embedded creator's `products` with the ids of every product
/// that creator made, in list order.
pub fn link_creator_products(products: &mut [Product]) {
    let mut made_by: HashMap<UserId, Vec<ProductId>> = HashMap::new();
    for product in products.iter() {
        made_by
            .entry(product.creator.id.clone())
            .or_default()
            .push(product.id.clone());
    }
    for product in products.iter_mut() {
        if let Some(ids) = made_by.get(&product.creator.id) {
            product.creator.products.clone_from(ids);
        }
    }
}
