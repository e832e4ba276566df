//! Application state shared across handlers.

use std::sync::Arc;

use tracing::warn;

use crate::airtable::{AirtableClient, AirtableError};
use crate::catalog::{CatalogStore, RemoteSource, SeedError};
use crate::config::StorefrontConfig;

/// The store type the storefront runs on.
pub type AppCatalog = CatalogStore<RemoteSource>;

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("airtable client: {0}")]
    Airtable(#[from] AirtableError),
    #[error("seed catalog: {0}")]
    Seed(#[from] SeedError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<AppCatalog>,
}

impl AppState {
    /// Create a new application state with a seeded catalog.
    ///
    /// Without Airtable configuration the catalog runs offline on seed data.
    ///
    /// # Errors
    ///
    /// Returns an error if the Airtable client can't be built or the seed is
    /// unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let source = match &config.airtable {
            Some(airtable) => RemoteSource::Airtable(AirtableClient::new(airtable)?),
            None => {
                warn!("Airtable API key or base id is missing, serving seed data only");
                RemoteSource::Offline
            }
        };
        let catalog = Arc::new(CatalogStore::with_seed(source)?);
        Ok(Self::from_parts(config, catalog))
    }

    /// Assemble state around an existing store.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, catalog: Arc<AppCatalog>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalog }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &AppCatalog {
        &self.inner.catalog
    }

    /// Shared handle to the catalog store, for background tasks.
    #[must_use]
    pub fn catalog_handle(&self) -> Arc<AppCatalog> {
        Arc::clone(&self.inner.catalog)
    }
}
