//! URL-safe product slugs.
//!
//! A slug only contains `[a-z0-9-]`, never starts or ends with `-`, and never
//! contains `--`. Slugs are unique across the catalog; see
//! [`assign_unique_slugs`](crate::catalog::assign_unique_slugs).

use serde::{Deserialize, Deserializer, Serialize};

/// A validated URL-safe slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Build a slug from arbitrary text.
    ///
    /// Lowercases ASCII alphanumerics, turns every other run of characters
    /// into a single hyphen, and trims hyphens at both ends. Returns `None`
    /// if nothing URL-safe is left.
    #[must_use]
    pub fn slugify(text: &str) -> Option<Self> {
        let mut out = String::with_capacity(text.len());
        let mut pending_hyphen = false;

        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if out.is_empty() { None } else { Some(Self(out)) }
    }

    /// Slug for products that have nothing slug-safe to derive one from.
    #[must_use]
    pub fn untitled() -> Self {
        Self("untitled".to_string())
    }

    /// Whether `s` is already a well-formed slug.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty()
            && !s.starts_with('-')
            && !s.ends_with('-')
            && !s.contains("--")
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a numeric suffix (`reachy-mini` -> `reachy-mini-2`).
    #[must_use]
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}-{n}", self.0))
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if Self::is_valid(&raw) {
            Ok(Self(raw))
        } else {
            Self::slugify(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid slug: {raw:?}")))
        }
    }
}
