//! Raw Airtable record shapes.
//!
//! Airtable omits empty cells entirely and is inconsistent about cell types
//! (a number column can come back as text, a link column as a bare string),
//! so every field here is optional and the ambiguous ones are untagged enums.
//! Nothing in this module applies defaults; that happens in `conversions`.

use serde::Deserialize;

/// One page of `GET /{base}/{table}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<F> {
    #[serde(default = "Vec::new")]
    pub records: Vec<Record<F>>,
    /// Present while more pages remain.
    #[serde(default)]
    pub offset: Option<String>,
}

/// A single row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    /// Record id (`rec...`).
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    pub fields: F,
}

/// Columns of the makers table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MakerFields {
    /// Human-readable id some product rows reference as plain text.
    #[serde(rename = "ID")]
    pub id: Option<ScalarField>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Username")]
    pub username: Option<String>,
    #[serde(rename = "Instagram")]
    pub instagram: Option<String>,
    #[serde(rename = "Bio")]
    pub bio: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Website")]
    pub website: Option<String>,
    #[serde(rename = "Avatar")]
    pub avatar: Option<ImagesField>,
    #[serde(rename = "Badge")]
    pub badge: Option<String>,
    #[serde(rename = "Credibility Score")]
    pub credibility_score: Option<NumberField>,
    #[serde(rename = "Governance Tokens")]
    pub governance_tokens: Option<NumberField>,
}

/// Columns of the products table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFields {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Sub Category")]
    pub sub_category: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<NumberField>,
    #[serde(rename = "Images")]
    pub images: Option<ImagesField>,
    #[serde(rename = "Creator")]
    pub creator: Option<LinkField>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Upvotes")]
    pub upvotes: Option<NumberField>,
    /// Checkbox columns are omitted when unchecked.
    #[serde(rename = "Privacy Verified")]
    pub privacy_verified: Option<bool>,
    #[serde(rename = "Launch Date")]
    pub launch_date: Option<String>,
    #[serde(rename = "Slug")]
    pub slug: Option<String>,
    #[serde(rename = "Skill Level")]
    pub skill_level: Option<String>,
    #[serde(rename = "External Link")]
    pub external_link: Option<String>,
}

/// A text or numeric cell, read as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarField {
    Text(String),
    Number(serde_json::Number),
}

impl ScalarField {
    /// Trimmed text form; `None` when blank.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// A numeric cell that may arrive as text (`"299"`, `" 19.99 "`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

impl NumberField {
    /// Finite numeric value, if any.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().trim_start_matches('$').parse().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// Rounded count; negatives and garbage clamp to 0.
    #[must_use]
    // Clamped to >= 0 and rounded before the cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_count(&self) -> u64 {
        self.value().map_or(0, |v| v.max(0.0).round() as u64)
    }
}

/// A creator reference: a linked-record array or a plain text id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LinkField {
    Linked(Vec<String>),
    Text(String),
}

impl LinkField {
    /// The referenced key: first linked id, or the trimmed text.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        let key = match self {
            Self::Linked(ids) => ids.first().map(String::as_str)?,
            Self::Text(text) => text.as_str(),
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// An attachment cell, a list of URLs, or a single URL/glyph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImagesField {
    Many(Vec<ImageEntry>),
    One(String),
}

/// One element of an [`ImagesField`] list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Attachment(Attachment),
    Plain(String),
}

/// Airtable attachment object; only the URL is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl ImagesField {
    /// Non-blank image references in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Many(entries) => entries
                .iter()
                .map(|e| match e {
                    ImageEntry::Attachment(a) => a.url.as_str(),
                    ImageEntry::Plain(s) => s.as_str(),
                })
                .collect(),
            Self::One(s) => vec![s.as_str()],
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}
