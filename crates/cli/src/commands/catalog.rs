//! Catalog dump.

use machbar_core::sort_products;
use machbar_storefront::catalog::{Catalog, seed};
use tracing::info;

use super::airtable_client;

/// Print the normalised catalog as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the seed is unusable or Airtable can't be read.
pub async fn dump(from_seed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = if from_seed {
        seed::load()?
    } else {
        let client = airtable_client()?;
        let mut catalog = client.fetch_catalog().await?;
        sort_products(&mut catalog.products);
        catalog
    };

    info!(
        products = catalog.products.len(),
        posts = catalog.posts.len(),
        source = if from_seed { "seed" } else { "airtable" },
        "Catalog loaded"
    );

    print_json(&catalog)?;
    Ok(())
}

fn print_json(catalog: &Catalog) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(catalog)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
