//! Airtable REST client implementation.
//!
//! Reads whole tables with offset pagination and patches single fields.
//! The makers table is cached using `moka` for the configured TTL.

use std::collections::BTreeSet;
use std::sync::Arc;

use machbar_core::ProductId;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::records::{ListResponse, MakerFields, ProductFields, Record};
use super::{AirtableError, DEFAULT_RETRY_AFTER_SECS, MakerDirectory, build_catalog};
use crate::catalog::Catalog;
use crate::config::AirtableConfig;

/// Largest page Airtable will return.
const PAGE_SIZE: &str = "100";

/// Stop paginating after this many pages (10k records).
const MAX_PAGES: usize = 100;

type MakerRows = Arc<Vec<Record<MakerFields>>>;

// =============================================================================
// AirtableClient
// =============================================================================

/// Client for one Airtable base.
///
/// Cheap to clone; clones share the HTTP connection pool and the maker cache.
#[derive(Clone)]
pub struct AirtableClient {
    inner: Arc<AirtableClientInner>,
}

struct AirtableClientInner {
    client: reqwest::Client,
    /// `{api_url}/{base_id}`, no trailing slash.
    base_url: String,
    makers_table: String,
    products_table: String,
    view: Option<String>,
    makers: Cache<String, MakerRows>,
}

/// Result of [`AirtableClient::inspect_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: String,
    pub record_count: usize,
    /// Every column that is non-empty in at least one record.
    pub field_names: BTreeSet<String>,
}

impl AirtableClient {
    /// Create a new Airtable client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AirtableConfig) -> Result<Self, AirtableError> {
        let mut headers = HeaderMap::new();

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", config.bearer_token()))
            .map_err(|e| AirtableError::InvalidConfig(format!("Invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = format!(
            "{}/{}",
            config.api_url.as_str().trim_end_matches('/'),
            urlencoding::encode(&config.base_id)
        );

        let makers = Cache::builder()
            .max_capacity(4)
            .time_to_live(config.makers_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(AirtableClientInner {
                client,
                base_url,
                makers_table: config.makers_table.clone(),
                products_table: config.products_table.clone(),
                view: config.view.clone(),
                makers,
            }),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, AirtableError> {
        let raw = format!("{}/{}", self.inner.base_url, urlencoding::encode(table));
        Url::parse(&raw).map_err(|e| AirtableError::InvalidConfig(format!("{raw}: {e}")))
    }

    fn record_url(&self, table: &str, record_id: &str) -> Result<Url, AirtableError> {
        let raw = format!(
            "{}/{}/{}",
            self.inner.base_url,
            urlencoding::encode(table),
            urlencoding::encode(record_id)
        );
        Url::parse(&raw).map_err(|e| AirtableError::InvalidConfig(format!("{raw}: {e}")))
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AirtableError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(retry_after, "Airtable rate limit hit");
            return Err(AirtableError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Airtable API returned non-success status"
            );
            return Err(AirtableError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Airtable response"
            );
            AirtableError::Parse(e.to_string())
        })
    }

    // =========================================================================
    // Table Methods
    // =========================================================================

    /// Read every record of `table`, following `offset` pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn list_records<F: DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<Record<F>>, AirtableError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        for page in 0..MAX_PAGES {
            let mut url = self.table_url(table)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(view) = &self.inner.view {
                    query.append_pair("view", view);
                }
                if let Some(offset) = &offset {
                    query.append_pair("offset", offset);
                }
            }

            let body: ListResponse<F> = self.execute(self.inner.client.get(url)).await?;
            debug!(page, count = body.records.len(), "Fetched Airtable page");
            records.extend(body.records);

            match body.offset {
                Some(next) => offset = Some(next),
                None => return Ok(records),
            }
        }

        warn!(
            max_pages = MAX_PAGES,
            count = records.len(),
            "Stopped paginating, table is larger than expected"
        );
        Ok(records)
    }

    /// Maker rows, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the makers table can't be read.
    pub async fn fetch_makers(&self) -> Result<MakerRows, AirtableError> {
        let table = &self.inner.makers_table;

        if let Some(rows) = self.inner.makers.get(table).await {
            debug!("Cache hit for makers");
            return Ok(rows);
        }

        let rows: MakerRows = Arc::new(self.list_records::<MakerFields>(table).await?);
        self.inner.makers.insert(table.clone(), Arc::clone(&rows)).await;
        Ok(rows)
    }

    /// Drop the cached maker directory so the next fetch re-reads it.
    pub async fn invalidate_makers(&self) {
        self.inner.makers.invalidate(&self.inner.makers_table).await;
    }

    /// Read both tables and join them into a catalog.
    ///
    /// The makers table comes from cache unless a product references a
    /// maker the cached rows don't contain, in which case it is re-read once.
    ///
    /// # Errors
    ///
    /// Returns an error if either table can't be read.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Catalog, AirtableError> {
        let (mut makers, products) = tokio::try_join!(
            self.fetch_makers(),
            self.list_records::<ProductFields>(&self.inner.products_table),
        )?;

        // A product linked to a maker the cached directory doesn't know means
        // the makers table changed since it was cached.
        let directory = MakerDirectory::from_records(&makers);
        let unknown = products
            .iter()
            .find(|r| !directory.covers(r.fields.creator.as_ref()));
        if let Some(missing) = unknown {
            debug!(
                product = %missing.id,
                "Creator not in cached makers, re-reading makers table"
            );
            self.invalidate_makers().await;
            makers = self.fetch_makers().await?;
        }

        let catalog = build_catalog(&makers, &products);
        debug!(
            makers = makers.len(),
            products = catalog.products.len(),
            posts = catalog.posts.len(),
            "Built catalog from Airtable"
        );
        Ok(catalog)
    }

    /// Set a product's `Upvotes` cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn set_upvotes(&self, id: &ProductId, upvotes: u64) -> Result<(), AirtableError> {
        let url = self.record_url(&self.inner.products_table, id.as_str())?;
        let body = serde_json::json!({
            "fields": {
                "Upvotes": upvotes
            }
        });

        let _: serde_json::Value = self
            .execute(self.inner.client.patch(url).json(&body))
            .await?;
        Ok(())
    }

    /// Read `table` and report its record count and column names.
    ///
    /// # Errors
    ///
    /// Returns an error if the table can't be read (missing table, bad key).
    pub async fn inspect_table(&self, table: &str) -> Result<TableSummary, AirtableError> {
        let records = self
            .list_records::<serde_json::Map<String, serde_json::Value>>(table)
            .await?;

        let field_names = records
            .iter()
            .flat_map(|r| r.fields.keys().cloned())
            .collect();

        Ok(TableSummary {
            table: table.to_string(),
            record_count: records.len(),
            field_names,
        })
    }

    /// Configured products table name.
    #[must_use]
    pub fn products_table(&self) -> &str {
        &self.inner.products_table
    }
}

/// Pull a readable message out of an Airtable error body.
///
/// Airtable sends either `{"error": "NOT_FOUND"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
fn api_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    match error {
        Some(serde_json::Value::String(kind)) => kind.clone(),
        Some(serde_json::Value::Object(obj)) => {
            let kind = obj.get("type").and_then(|v| v.as_str()).unwrap_or("ERROR");
            match obj.get("message").and_then(|v| v.as_str()) {
                Some(message) => format!("{kind}: {message}"),
                None => kind.to_string(),
            }
        }
        _ => body.chars().take(200).collect(),
    }
}
