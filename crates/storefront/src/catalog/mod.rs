//! In-memory catalog store and the remote source it refreshes from.
//!
//! # Architecture
//!
//! - [`CatalogStore`] is the single source of truth for products and posts
//! - It starts from the bundled seed (see [`seed`]) so it is never empty
//! - [`CatalogSource`] is the seam to the remote tables; [`RemoteSource`]
//!   wraps the Airtable client or stands in when none is configured
//! - Upvotes are applied locally first; the remote write runs detached
//!
//! # Example
//!
//! ```rust,ignore
//! use machbar_storefront::catalog::{CatalogStore, RemoteSource};
//!
//! let store = CatalogStore::with_seed(RemoteSource::Offline)?;
//! store.refresh().await;
//! if let Some(receipt) = store.upvote(&product_id) {
//!     println!("now at {}", receipt.upvotes);
//! }
//! ```

pub mod seed;
mod source;
mod store;

pub use seed::SeedError;
pub use source::RemoteSource;
pub use store::{CatalogStatus, CatalogStore, CreatorProfile};

use std::future::Future;

use machbar_core::{CommunityPost, Product, ProductId};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::airtable::AirtableError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A full catalog as produced by a source or the seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub posts: Vec<CommunityPost>,
}

impl Catalog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.posts.is_empty()
    }
}

/// Where the store reads fresh data from and writes upvotes back to.
pub trait CatalogSource: Send + Sync + 'static {
    /// Read the whole catalog.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Catalog, RemoteFetchError>> + Send;

    /// Set the remote counter of `id` to `current + 1`.
    fn increment_upvote(
        &self,
        id: &ProductId,
        current: u64,
    ) -> impl Future<Output = Result<(), RemotePersistError>> + Send;
}

// =============================================================================
// Errors
// =============================================================================

/// Reading the remote catalog failed.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    /// No remote source is configured.
    #[error("no remote catalog is configured")]
    NotConfigured,

    /// The remote source asked us to back off.
    #[error("remote catalog is rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Network, auth or schema failure.
    #[error("remote catalog fetch failed: {0}")]
    Source(#[source] BoxError),
}

impl RemoteFetchError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self::Source(source.into())
    }
}

impl From<AirtableError> for RemoteFetchError {
    fn from(err: AirtableError) -> Self {
        match err {
            AirtableError::RateLimited(retry_after) => Self::RateLimited { retry_after },
            // Request URLs carry the base id; keep them out of the stored fault.
            AirtableError::Http(e) => Self::new(AirtableError::Http(e.without_url())),
            other => Self::new(other),
        }
    }
}

/// Writing an upvote back to the remote source failed.
#[derive(Debug, Error)]
#[error("failed to persist upvote for {product_id}: {source}")]
pub struct RemotePersistError {
    pub product_id: ProductId,
    #[source]
    source: BoxError,
}

impl RemotePersistError {
    pub fn new(product_id: ProductId, source: impl Into<BoxError>) -> Self {
        Self {
            product_id,
            source: source.into(),
        }
    }
}

/// The observable error state of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogFault {
    #[error("no remote catalog is configured")]
    Offline,

    #[error("remote catalog is rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("failed to fetch products: {message}")]
    FetchFailed { message: String },
}

impl From<&RemoteFetchError> for CatalogFault {
    fn from(err: &RemoteFetchError) -> Self {
        match err {
            RemoteFetchError::NotConfigured => Self::Offline,
            RemoteFetchError::RateLimited { retry_after } => Self::RateLimited {
                retry_after: *retry_after,
            },
            RemoteFetchError::Source(source) => Self::FetchFailed {
                message: source.to_string(),
            },
        }
    }
}

// =============================================================================
// Operation results
// =============================================================================

/// What a [`CatalogStore::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Remote data was published. `products` is 0 when only posts came back
    /// and the existing products were kept.
    Replaced { products: usize, posts: usize },
    /// The source returned nothing; existing data kept.
    EmptyRemote,
    /// The fetch failed; existing data kept and the fault recorded.
    Failed { fault: CatalogFault },
}

/// Result of the local phase of [`CatalogStore::upvote`].
#[derive(Debug)]
pub struct UpvoteReceipt {
    pub product_id: ProductId,
    /// Count after the local increment.
    pub upvotes: u64,
    /// The detached remote write, if one was started. Awaiting it is optional.
    pub persistence: Option<JoinHandle<Result<(), RemotePersistError>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_from_fetch_error() {
        assert_eq!(
            CatalogFault::from(&RemoteFetchError::NotConfigured),
            CatalogFault::Offline
        );
        assert_eq!(
            CatalogFault::from(&RemoteFetchError::from(AirtableError::RateLimited(12))),
            CatalogFault::RateLimited { retry_after: 12 }
        );

        let err = RemoteFetchError::from(AirtableError::Api {
            status: 401,
            message: "AUTHENTICATION_REQUIRED".to_string(),
        });
        assert_eq!(
            CatalogFault::from(&err).to_string(),
            "failed to fetch products: API error: 401 - AUTHENTICATION_REQUIRED"
        );
    }

    #[test]
    fn test_persist_error_display() {
        let err = RemotePersistError::new(ProductId::new("recA"), "timeout");
        assert_eq!(err.to_string(), "failed to persist upvote for recA: timeout");
    }

    #[test]
    fn test_refresh_outcome_serializes_tagged() {
        let json = serde_json::to_value(RefreshOutcome::Replaced {
            products: 3,
            posts: 1,
        })
        .unwrap_or_default();
        assert_eq!(json["outcome"], "replaced");
        assert_eq!(json["products"], 3);
    }
}
