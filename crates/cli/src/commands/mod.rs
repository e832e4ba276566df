//! CLI subcommands.

pub mod airtable;
pub mod catalog;
pub mod seed;

use machbar_storefront::airtable::AirtableClient;
use machbar_storefront::config::AirtableConfig;

/// Build an Airtable client from the environment (and `.env`).
///
/// # Errors
///
/// Returns an error if the configuration is invalid or incomplete.
pub fn airtable_client() -> Result<AirtableClient, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AirtableConfig::from_env()?
        .ok_or("AIRTABLE_API_KEY and AIRTABLE_BASE_ID must both be set")?;
    Ok(AirtableClient::new(&config)?)
}
