//! Integration tests for machbar.io.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p machbar-integration-tests
//! ```
//!
//! No external services are needed: Airtable is played by a `wiremock`
//! server and the HTTP API is driven in-process with `tower::ServiceExt`.
//!
//! # Test Categories
//!
//! - `airtable_client` - REST client against a mock Airtable
//! - `catalog_store` - Store refresh and upvote write-back end to end
//! - `api_routes` - JSON API on the seeded, offline store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use machbar_storefront::airtable::AirtableClient;
use machbar_storefront::catalog::{CatalogStore, RemoteSource};
use machbar_storefront::config::{AirtableConfig, CatalogConfig, StorefrontConfig};
use machbar_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Base id used by every mock request.
pub const BASE_ID: &str = "appTestBase0001";
/// Personal access token sent by the test client.
pub const API_KEY: &str = "patTestKey.0001";

/// Airtable configuration pointing at a mock server.
///
/// # Panics
///
/// Panics if `server_uri` is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn airtable_config(server_uri: &str) -> AirtableConfig {
    AirtableConfig {
        api_url: Url::parse(&format!("{server_uri}/v0")).unwrap(),
        api_key: SecretString::from(API_KEY),
        base_id: BASE_ID.to_string(),
        makers_table: "Makers".to_string(),
        products_table: "Products".to_string(),
        view: None,
        timeout: Duration::from_secs(5),
        makers_cache_ttl: Duration::from_secs(60),
    }
}

/// Client for a mock server.
///
/// # Panics
///
/// Panics if the client can't be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn airtable_client(server_uri: &str) -> AirtableClient {
    AirtableClient::new(&airtable_config(server_uri)).unwrap()
}

/// Request path of a table on the mock server.
#[must_use]
pub fn table_path(table: &str) -> String {
    format!("/v0/{BASE_ID}/{table}")
}

/// Storefront configuration for tests, with or without Airtable.
#[must_use]
pub fn storefront_config(airtable: Option<AirtableConfig>) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        airtable,
        catalog: CatalogConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// State around a seeded store with no remote source.
///
/// # Panics
///
/// Panics if the bundled seed is unusable.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn offline_state() -> AppState {
    AppState::new(storefront_config(None)).unwrap()
}

/// Seeded store backed by a mock Airtable.
///
/// # Panics
///
/// Panics if the client can't be built or the seed is unusable.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn airtable_store(server_uri: &str) -> Arc<CatalogStore<RemoteSource>> {
    let source = RemoteSource::Airtable(airtable_client(server_uri));
    Arc::new(CatalogStore::with_seed(source).unwrap())
}

/// A makers-table record.
#[must_use]
pub fn maker_record(id: &str, name: &str, username: &str) -> Value {
    json!({
        "id": id,
        "createdTime": "2025-01-10T09:00:00.000Z",
        "fields": {
            "Name": name,
            "Username": username,
            "Badge": "Contributor",
            "Credibility Score": 97
        }
    })
}

/// A products-table record linked to `maker_id`.
#[must_use]
pub fn product_record(id: &str, name: &str, upvotes: u64, maker_id: &str) -> Value {
    json!({
        "id": id,
        "createdTime": "2025-02-01T12:00:00.000Z",
        "fields": {
            "Name": name,
            "Category": "Programmable Robotics",
            "Description": format!("{name} description"),
            "Price": 199,
            "Images": [{ "url": format!("https://cdn.example.com/{id}.png"), "filename": "p.png" }],
            "Creator": [maker_id],
            "Status": "Available",
            "Upvotes": upvotes,
            "Launch Date": "2025-02-01"
        }
    })
}

/// A single-page list response.
#[must_use]
pub fn page(records: Vec<Value>, offset: Option<&str>) -> Value {
    match offset {
        Some(offset) => json!({ "records": records, "offset": offset }),
        None => json!({ "records": records }),
    }
}
