//! The concrete remote source used by the storefront.

use machbar_core::ProductId;

use super::{Catalog, CatalogSource, RemoteFetchError, RemotePersistError};
use crate::airtable::AirtableClient;

/// Airtable when configured, otherwise nothing.
#[derive(Clone)]
pub enum RemoteSource {
    Airtable(AirtableClient),
    /// Seed data only; every fetch fails with [`RemoteFetchError::NotConfigured`].
    Offline,
}

impl RemoteSource {
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Airtable(_))
    }
}

impl CatalogSource for RemoteSource {
    async fn fetch_catalog(&self) -> Result<Catalog, RemoteFetchError> {
        match self {
            Self::Airtable(client) => Ok(client.fetch_catalog().await?),
            Self::Offline => Err(RemoteFetchError::NotConfigured),
        }
    }

    async fn increment_upvote(
        &self,
        id: &ProductId,
        current: u64,
    ) -> Result<(), RemotePersistError> {
        match self {
            Self::Airtable(client) => client
                .set_upvotes(id, current.saturating_add(1))
                .await
                .map_err(|e| RemotePersistError::new(id.clone(), e)),
            Self::Offline => Err(RemotePersistError::new(
                id.clone(),
                "no remote catalog is configured",
            )),
        }
    }
}
