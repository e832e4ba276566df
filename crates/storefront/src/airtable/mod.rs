//! Airtable REST client and record normalization.
//!
//! # Architecture
//!
//! - Two tables: makers (creators) and products (listings)
//! - Raw rows are deserialized into loosely typed records (`records`), then
//!   normalized into the domain model in one place (`conversions`)
//! - The maker directory is cached via `moka` so a refresh storm doesn't
//!   re-read the makers table every time
//!
//! # Example
//!
//! ```rust,ignore
//! use machbar_storefront::airtable::AirtableClient;
//!
//! let client = AirtableClient::new(&config.airtable)?;
//! let catalog = client.fetch_catalog().await?;
//! client.set_upvotes(&catalog.products[0].id, 42).await?;
//! ```

mod client;
pub mod conversions;
pub mod records;

pub use client::{AirtableClient, TableSummary};
pub use conversions::{MakerDirectory, build_catalog, convert_maker, convert_product};

use thiserror::Error;

/// Default wait when Airtable rate limits without a `Retry-After` header.
///
/// Airtable's documented penalty for exceeding 5 requests/second is 30 seconds.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Errors that can occur when interacting with the Airtable API.
#[derive(Debug, Error)]
pub enum AirtableError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Airtable.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body did not match the expected record shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be built from the configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AirtableError {
    /// Whether retrying the same request later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Parse(_) | Self::InvalidConfig(_) => false,
        }
    }
}
