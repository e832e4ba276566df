//! Product categories and subcategories.

use serde::{Deserialize, Serialize};

use super::status::{UnknownLabel, normalize_label};

/// Top-level product category.
///
/// Six real categories plus [`ProductCategory::Other`], the sentinel used
/// when a record carries no category or one we don't recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductCategory {
    #[serde(rename = "Programmable Robotics")]
    ProgrammableRobotics,
    #[serde(rename = "Prompt-to-Product")]
    PromptToProduct,
    #[serde(rename = "3D Printed Innovations")]
    ThreeDPrintedInnovations,
    #[serde(rename = "Assistant Boxes")]
    AssistantBoxes,
    #[serde(rename = "Kids Learning Tools")]
    KidsLearningTools,
    #[serde(rename = "Voice Assistants")]
    VoiceAssistants,
    #[default]
    Other,
}

impl ProductCategory {
    /// The six browsable categories, in navigation order.
    pub const ALL: [Self; 6] = [
        Self::ProgrammableRobotics,
        Self::PromptToProduct,
        Self::ThreeDPrintedInnovations,
        Self::AssistantBoxes,
        Self::KidsLearningTools,
        Self::VoiceAssistants,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProgrammableRobotics => "Programmable Robotics",
            Self::PromptToProduct => "Prompt-to-Product",
            Self::ThreeDPrintedInnovations => "3D Printed Innovations",
            Self::AssistantBoxes => "Assistant Boxes",
            Self::KidsLearningTools => "Kids Learning Tools",
            Self::VoiceAssistants => "Voice Assistants",
            Self::Other => "Other",
        }
    }

    /// URL slug used by category pages.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ProgrammableRobotics => "robotics",
            Self::PromptToProduct => "prompt-to-product",
            Self::ThreeDPrintedInnovations => "3d-printed",
            Self::AssistantBoxes => "assistants",
            Self::KidsLearningTools => "kids-learning",
            Self::VoiceAssistants => "voice",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::ProgrammableRobotics => "🤖",
            Self::PromptToProduct => "🎨",
            Self::ThreeDPrintedInnovations => "🖨️",
            Self::AssistantBoxes => "📦",
            Self::KidsLearningTools => "👶",
            Self::VoiceAssistants => "🎙️",
            Self::Other => "✨",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ProgrammableRobotics => "Arduino, Raspberry Pi, Jetson bots",
            Self::PromptToProduct => "Describe it, AI makes it",
            Self::ThreeDPrintedInnovations => "Physical creations",
            Self::AssistantBoxes => "Voice assistants, home companions",
            Self::KidsLearningTools => "STEM, coding toys",
            Self::VoiceAssistants => "Smart speakers",
            Self::Other => "Everything else",
        }
    }

    /// Resolve a category from its URL slug or a hyphenated/cased name.
    ///
    /// Accepts `robotics`, `programmable-robotics` and `Programmable Robotics`
    /// alike. Never resolves to [`ProductCategory::Other`].
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let wanted = normalize_label(slug);
        Self::ALL.into_iter().find(|c| {
            let (slug, name) = (normalize_label(c.slug()), normalize_label(c.name()));
            slug == wanted || name == wanted
        })
    }

    /// Parse a category label, falling back to [`ProductCategory::Other`].
    #[must_use]
    pub fn parse_or_other(label: &str) -> Self {
        label.parse().unwrap_or(Self::Other)
    }

    /// Navigation metadata for this category.
    #[must_use]
    pub const fn info(self) -> CategoryInfo {
        CategoryInfo {
            id: self,
            name: self.name(),
            icon: self.icon(),
            description: self.description(),
            slug: self.slug(),
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        if wanted == "other" {
            return Ok(Self::Other);
        }
        Self::ALL
            .into_iter()
            .find(|c| normalize_label(c.name()) == wanted)
            .ok_or_else(|| UnknownLabel::new("product category", s))
    }
}

/// Navigation metadata for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    pub id: ProductCategory,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub slug: &'static str,
}

/// Second-level category, only meaningful under a specific parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductSubcategory {
    #[serde(rename = "Physical Boxes")]
    PhysicalBoxes,
    Dropship,
    #[serde(rename = "Consumer 3D Printers")]
    Consumer3DPrinters,
    #[serde(rename = "3D Printed Products")]
    ThreeDPrintedProducts,
}

impl ProductSubcategory {
    const ALL: [Self; 4] = [
        Self::PhysicalBoxes,
        Self::Dropship,
        Self::Consumer3DPrinters,
        Self::ThreeDPrintedProducts,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PhysicalBoxes => "Physical Boxes",
            Self::Dropship => "Dropship",
            Self::Consumer3DPrinters => "Consumer 3D Printers",
            Self::ThreeDPrintedProducts => "3D Printed Products",
        }
    }

    /// The category this subcategory belongs to.
    #[must_use]
    pub const fn parent(self) -> ProductCategory {
        match self {
            Self::PhysicalBoxes | Self::Dropship => ProductCategory::PromptToProduct,
            Self::Consumer3DPrinters | Self::ThreeDPrintedProducts => {
                ProductCategory::ThreeDPrintedInnovations
            }
        }
    }

    /// Whether this subcategory may be attached to a product in `category`.
    #[must_use]
    pub fn belongs_to(self, category: ProductCategory) -> bool {
        self.parent() == category
    }
}

impl std::fmt::Display for ProductSubcategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProductSubcategory {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|c| normalize_label(c.name()) == wanted)
            .ok_or_else(|| UnknownLabel::new("product subcategory", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slug_accepts_slugs_and_names() {
        assert_eq!(
            ProductCategory::from_slug("robotics"),
            Some(ProductCategory::ProgrammableRobotics)
        );
        assert_eq!(
            ProductCategory::from_slug("programmable-robotics"),
            Some(ProductCategory::ProgrammableRobotics)
        );
        assert_eq!(
            ProductCategory::from_slug("3d-printed"),
            Some(ProductCategory::ThreeDPrintedInnovations)
        );
        assert_eq!(
            ProductCategory::from_slug("Prompt-to-Product"),
            Some(ProductCategory::PromptToProduct)
        );
        assert_eq!(ProductCategory::from_slug("other"), None);
        assert_eq!(ProductCategory::from_slug("gardening"), None);
    }

    #[test]
    fn test_parse_or_other() {
        assert_eq!(
            ProductCategory::parse_or_other("voice assistants"),
            ProductCategory::VoiceAssistants
        );
        assert_eq!(
            ProductCategory::parse_or_other("Drones"),
            ProductCategory::Other
        );
        assert_eq!(ProductCategory::parse_or_other(""), ProductCategory::Other);
    }

    #[test]
    fn test_subcategory_parents() {
        assert!(ProductSubcategory::Dropship.belongs_to(ProductCategory::PromptToProduct));
        assert!(
            ProductSubcategory::Consumer3DPrinters
                .belongs_to(ProductCategory::ThreeDPrintedInnovations)
        );
        assert!(!ProductSubcategory::PhysicalBoxes.belongs_to(ProductCategory::VoiceAssistants));
    }

    #[test]
    fn test_category_serde_labels() {
        let json =
            serde_json::to_string(&ProductCategory::ThreeDPrintedInnovations).unwrap_or_default();
        assert_eq!(json, "\"3D Printed Innovations\"");
        let parsed: ProductCategory =
            serde_json::from_str("\"Kids Learning Tools\"").unwrap_or_default();
        assert_eq!(parsed, ProductCategory::KidsLearningTools);
    }
}
