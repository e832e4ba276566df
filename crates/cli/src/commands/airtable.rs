//! Airtable connectivity check.

use machbar_storefront::airtable::{AirtableError, TableSummary};
use tracing::{info, warn};

use super::airtable_client;

/// Table name tried when the configured products table can't be read.
const SINGULAR_PRODUCTS_TABLE: &str = "Product";

/// Inspect the products table and log what it holds.
///
/// Bases created from older templates name the table `Product`, so a
/// non-transient failure on the configured name is retried once with that.
///
/// # Errors
///
/// Returns an error if neither table name can be read.
pub async fn check() -> Result<(), Box<dyn std::error::Error>> {
    let client = airtable_client()?;
    let table = client.products_table().to_string();

    info!(table = %table, "Inspecting products table");
    let summary = match client.inspect_table(&table).await {
        Ok(summary) => summary,
        Err(e) if should_try_singular(&table, &e) => {
            warn!(table = %table, error = %e, "Table not readable, trying singular name");
            client.inspect_table(SINGULAR_PRODUCTS_TABLE).await?
        }
        Err(e) => return Err(e.into()),
    };

    report(&summary);
    Ok(())
}

fn should_try_singular(table: &str, error: &AirtableError) -> bool {
    table != SINGULAR_PRODUCTS_TABLE
        && matches!(error, AirtableError::Api { .. })
        && !error.is_transient()
}

fn report(summary: &TableSummary) {
    info!("Airtable table check");
    info!("====================");
    info!("Table: {}", summary.table);
    info!("Records: {}", summary.record_count);
    info!("Fields:");
    for field in &summary.field_names {
        info!("  {field}");
    }
}
