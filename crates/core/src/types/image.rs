//! Image references.

use serde::{Deserialize, Serialize};

/// Placeholder shown when a product has no image at all.
pub const DEFAULT_PLACEHOLDER: &str = "📦";

/// A product image: either a URL/absolute path or a placeholder glyph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The default placeholder glyph.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(DEFAULT_PLACEHOLDER.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A real image is a URL (`http...`) or a site-absolute path (`/...`).
    /// Anything else (emoji, text) is a placeholder.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.0.starts_with("http") || self.0.starts_with('/')
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !self.is_real()
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_vs_placeholder() {
        assert!(ImageRef::from("https://cdn.example.com/a.png").is_real());
        assert!(ImageRef::from("http://x/y.png").is_real());
        assert!(ImageRef::from("/static/reachy.jpg").is_real());
        assert!(ImageRef::from("🤖").is_placeholder());
        assert!(ImageRef::placeholder().is_placeholder());
        assert!(ImageRef::from("").is_placeholder());
    }
}
