//! Normalization from raw Airtable records into catalog entities.
//!
//! Every default lives here: a product row with nothing but an id still
//! becomes a valid [`Product`].

use std::collections::HashMap;

use machbar_core::{
    ImageRef, Price, Product, ProductCategory, ProductId, ProductStatus, ProductSubcategory,
    SkillLevel, Slug, User, UserBadge, UserId, assign_unique_slugs, community_feed,
    link_creator_products,
};
use tracing::debug;

use super::records::{LinkField, MakerFields, NumberField, ProductFields, Record};
use crate::catalog::Catalog;

/// Credibility score for makers whose row doesn't carry one.
const DEFAULT_CREDIBILITY_SCORE: u32 = 100;

/// Makers keyed by record id and by their human-readable `ID` column.
#[derive(Debug, Clone, Default)]
pub struct MakerDirectory {
    by_key: HashMap<String, User>,
}

impl MakerDirectory {
    /// Build the directory from raw maker rows.
    ///
    /// Record ids always win over a clashing `ID` value.
    #[must_use]
    pub fn from_records(records: &[Record<MakerFields>]) -> Self {
        let mut by_key = HashMap::with_capacity(records.len() * 2);

        for record in records {
            let user = convert_maker(record);
            if let Some(alias) = record.fields.id.as_ref().and_then(|f| f.to_text()) {
                by_key.entry(alias).or_insert_with(|| user.clone());
            }
            by_key.insert(record.id.clone(), user);
        }

        Self { by_key }
    }

    /// Resolve a product's creator reference.
    ///
    /// Unresolvable or missing references fall back to [`User::anonymous`].
    #[must_use]
    pub fn resolve(&self, link: Option<&LinkField>) -> User {
        let Some(key) = link.and_then(LinkField::key) else {
            return User::anonymous();
        };

        self.by_key.get(key).cloned().unwrap_or_else(|| {
            debug!(creator = %key, "Unresolved creator reference, using anonymous maker");
            User::anonymous()
        })
    }

    /// Whether `link` resolves to a known maker. A missing or blank link has
    /// nothing to look up and counts as covered.
    #[must_use]
    pub fn covers(&self, link: Option<&LinkField>) -> bool {
        link.and_then(LinkField::key)
            .is_none_or(|key| self.by_key.contains_key(key))
    }

    /// Number of lookup keys (record ids plus aliases).
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Convert a maker row into a [`User`].
#[must_use]
pub fn convert_maker(record: &Record<MakerFields>) -> User {
    let fields = &record.fields;
    let name = non_blank(fields.name.as_deref());
    let username = non_blank(fields.username.as_deref())
        .map(|u| u.trim_start_matches('@').to_string())
        .or_else(|| name.as_deref().map(username_from_name))
        .unwrap_or_else(|| record.id.to_lowercase());

    User {
        id: UserId::new(record.id.clone()),
        name: name.unwrap_or_else(|| username.clone()),
        username,
        instagram: non_blank(fields.instagram.as_deref())
            .map(|handle| handle.trim_start_matches('@').to_string()),
        bio: non_blank(fields.bio.as_deref()),
        location: non_blank(fields.location.as_deref()),
        website: non_blank(fields.website.as_deref()),
        avatar: fields
            .avatar
            .as_ref()
            .and_then(|a| a.urls().into_iter().next()),
        badge: fields
            .badge
            .as_deref()
            .and_then(|b| b.parse().ok())
            .unwrap_or(UserBadge::Maker),
        governance_tokens: fields.governance_tokens.as_ref().map(|n| n.as_count()),
        credibility_score: fields
            .credibility_score
            .as_ref()
            .map_or(DEFAULT_CREDIBILITY_SCORE, |n| {
                u32::try_from(n.as_count()).unwrap_or(u32::MAX)
            }),
        ..User::default()
    }
}

/// Convert a product row, resolving its creator against `makers`.
///
/// The returned slug is not yet unique; [`build_catalog`] takes care of that.
#[must_use]
pub fn convert_product(record: &Record<ProductFields>, makers: &MakerDirectory) -> Product {
    let fields = &record.fields;
    let name = non_blank(fields.name.as_deref()).unwrap_or_else(|| "Untitled product".to_string());

    let category = fields
        .category
        .as_deref()
        .map_or(ProductCategory::Other, ProductCategory::parse_or_other);

    let sub_category = fields
        .sub_category
        .as_deref()
        .and_then(|s| s.parse::<ProductSubcategory>().ok())
        .filter(|sub| sub.belongs_to(category));

    let mut images: Vec<ImageRef> = fields
        .images
        .as_ref()
        .map(|i| i.urls().into_iter().map(ImageRef::new).collect())
        .unwrap_or_default();
    if images.is_empty() {
        images.push(ImageRef::placeholder());
    }

    let slug = non_blank(fields.slug.as_deref())
        .and_then(|s| Slug::slugify(&s))
        .or_else(|| Slug::slugify(&name))
        .or_else(|| Slug::slugify(&record.id))
        .unwrap_or_else(Slug::untitled);

    Product {
        id: ProductId::new(record.id.clone()),
        name,
        category,
        sub_category,
        description: non_blank(fields.description.as_deref()).unwrap_or_default(),
        price: fields
            .price
            .as_ref()
            .and_then(NumberField::value)
            .map_or(Price::ZERO, Price::from_f64),
        images,
        creator: makers.resolve(fields.creator.as_ref()),
        status: fields
            .status
            .as_deref()
            .and_then(|s| s.parse::<ProductStatus>().ok())
            .unwrap_or_default(),
        upvotes: fields.upvotes.as_ref().map_or(0, |n| n.as_count()),
        privacy_verified: fields.privacy_verified.unwrap_or(false),
        launch_date: non_blank(fields.launch_date.as_deref()).unwrap_or_default(),
        slug,
        skill_level: Some(
            fields
                .skill_level
                .as_deref()
                .and_then(|s| s.parse::<SkillLevel>().ok())
                .unwrap_or_default(),
        ),
        external_link: non_blank(fields.external_link.as_deref()),
        apps: Vec::new(),
    }
}

/// Join maker and product rows into a catalog.
///
/// Each embedded creator lists the ids of every product it made, slugs are
/// made unique in row order, and posts are derived from the creators.
#[must_use]
pub fn build_catalog(
    makers: &[Record<MakerFields>],
    products: &[Record<ProductFields>],
) -> Catalog {
    let directory = MakerDirectory::from_records(makers);

    let mut products: Vec<Product> = products
        .iter()
        .map(|record| convert_product(record, &directory))
        .collect();

    link_creator_products(&mut products);
    assign_unique_slugs(&mut products);
    let posts = community_feed(&products);

    Catalog { products, posts }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// `Pollen Robotics` -> `pollen_robotics`.
fn username_from_name(name: &str) -> String {
    Slug::slugify(name).map_or_else(
        || name.to_lowercase(),
        |slug| slug.as_str().replace('-', "_"),
    )
}
