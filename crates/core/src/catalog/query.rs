//! Explore filters and simple catalog lookups.
//!
//! All functions take the store's ranked list and return owned copies, so a
//! query never observes a half-applied store update.

use serde::{Deserialize, Serialize};

use super::Product;
use crate::types::status::{UnknownLabel, normalize_label};
use crate::types::{ProductCategory, UserId};

/// Ordering applied by the explore page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExploreSort {
    /// Keep the store's ranking ("All").
    #[default]
    Default,
    Trending,
    /// Most recent launch date first; undated products last.
    New,
    MostVoted,
}

impl std::str::FromStr for ExploreSort {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "" | "all" | "default" => Ok(Self::Default),
            "trending" => Ok(Self::Trending),
            "new" | "newest" => Ok(Self::New),
            "most voted" => Ok(Self::MostVoted),
            _ => Err(UnknownLabel::new("explore sort", s)),
        }
    }
}

/// Explore page filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreQuery {
    /// Case-insensitive substring over name, description and category.
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
    pub sort: ExploreSort,
}

impl ExploreQuery {
    /// Apply the filters and ordering to a ranked product list.
    #[must_use]
    pub fn apply(&self, ranked: &[Product]) -> Vec<Product> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut result: Vec<Product> = ranked
            .iter()
            .filter(|p| self.category.is_none_or(|c| p.category == c))
            .filter(|p| needle.as_deref().is_none_or(|n| matches_search(p, n)))
            .cloned()
            .collect();

        match self.sort {
            ExploreSort::Default => {}
            ExploreSort::Trending | ExploreSort::MostVoted => {
                result.sort_by(|a, b| b.upvotes.cmp(&a.upvotes));
            }
            ExploreSort::New => {
                result.sort_by(|a, b| match (a.launch_day(), b.launch_day()) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
            }
        }

        result
    }
}

/// `needle` must already be lowercase.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.name().to_lowercase().contains(needle)
}

/// Find a product by slug.
#[must_use]
pub fn find_by_slug<'a>(products: &'a [Product], slug: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.slug.as_str() == slug)
}

/// All products by one creator, in ranking order.
#[must_use]
pub fn by_creator(products: &[Product], creator: &UserId) -> Vec<Product> {
    products
        .iter()
        .filter(|p| &p.creator.id == creator)
        .cloned()
        .collect()
}

/// Number of products in each browsable category (navigation order).
#[must_use]
pub fn category_counts(products: &[Product]) -> Vec<(ProductCategory, usize)> {
    ProductCategory::ALL
        .into_iter()
        .map(|c| (c, products.iter().filter(|p| p.category == c).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::product;
    use super::*;

    fn catalog() -> Vec<Product> {
        let mut reachy = product("reachy", 245, &["https://r"]);
        reachy.name = "Reachy Mini".to_string();
        reachy.launch_date = "2025-08-01".to_string();

        let mut sticker = product("sticker", 189, &["https://s"]);
        sticker.name = "Sticker Box".to_string();
        sticker.category = ProductCategory::PromptToProduct;
        sticker.description = "Voice-activated AI sticker printer".to_string();
        sticker.launch_date = "2024-11-20".to_string();

        let mut chess = product("chess", 72, &["♟️"]);
        chess.name = "Smart Chess Board".to_string();
        chess.category = ProductCategory::KidsLearningTools;

        let mut planted = product("planted", 128, &["🌿"]);
        planted.category = ProductCategory::ThreeDPrintedInnovations;
        planted.launch_date = "2024-01-10".to_string();

        let mut ranked = vec![reachy, sticker, chess, planted];
        super::super::sort_products(&mut ranked);
        ranked
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_keeps_ranking() {
        let ranked = catalog();
        let result = ExploreQuery::default().apply(&ranked);
        assert_eq!(ids(&result), ids(&ranked));
    }

    #[test]
    fn test_search_matches_name_description_and_category() {
        let ranked = catalog();
        let by_name = ExploreQuery {
            search: Some("REACHY".to_string()),
            ..ExploreQuery::default()
        };
        assert_eq!(ids(&by_name.apply(&ranked)), vec!["reachy"]);

        let by_description = ExploreQuery {
            search: Some("sticker printer".to_string()),
            ..ExploreQuery::default()
        };
        assert_eq!(ids(&by_description.apply(&ranked)), vec!["sticker"]);

        let by_category = ExploreQuery {
            search: Some("kids learning".to_string()),
            ..ExploreQuery::default()
        };
        assert_eq!(ids(&by_category.apply(&ranked)), vec!["chess"]);

        let blank = ExploreQuery {
            search: Some("   ".to_string()),
            ..ExploreQuery::default()
        };
        assert_eq!(blank.apply(&ranked).len(), ranked.len());
    }

    #[test]
    fn test_category_filter() {
        let query = ExploreQuery {
            category: Some(ProductCategory::PromptToProduct),
            ..ExploreQuery::default()
        };
        assert_eq!(ids(&query.apply(&catalog())), vec!["sticker"]);
    }

    #[test]
    fn test_most_voted_ignores_image_tier() {
        let query = ExploreQuery {
            sort: ExploreSort::MostVoted,
            ..ExploreQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&catalog())),
            vec!["reachy", "sticker", "planted", "chess"]
        );
    }

    #[test]
    fn test_new_sorts_by_launch_date_undated_last() {
        let query = ExploreQuery {
            sort: ExploreSort::New,
            ..ExploreQuery::default()
        };
        assert_eq!(
            ids(&query.apply(&catalog())),
            vec!["reachy", "sticker", "planted", "chess"]
        );
    }

    #[test]
    fn test_sort_labels() {
        assert_eq!("Most Voted".parse(), Ok(ExploreSort::MostVoted));
        assert_eq!("most-voted".parse(), Ok(ExploreSort::MostVoted));
        assert_eq!("All".parse(), Ok(ExploreSort::Default));
        assert_eq!("trending".parse(), Ok(ExploreSort::Trending));
        assert!("random".parse::<ExploreSort>().is_err());
    }

    #[test]
    fn test_lookups() {
        let ranked = catalog();
        assert_eq!(
            find_by_slug(&ranked, "sticker").map(|p| p.id.as_str()),
            Some("sticker")
        );
        assert!(find_by_slug(&ranked, "missing").is_none());

        let creator = UserId::new("maker-chess");
        assert_eq!(ids(&by_creator(&ranked, &creator)), vec!["chess"]);

        let counts = category_counts(&ranked);
        assert_eq!(counts.len(), 6);
        assert!(counts.contains(&(ProductCategory::ProgrammableRobotics, 1)));
        assert!(counts.contains(&(ProductCategory::VoiceAssistants, 0)));
    }
}
