//! Seed catalog validation.

use machbar_storefront::catalog::seed;
use tracing::{error, info};

/// Validate the bundled seed catalog.
///
/// # Errors
///
/// Returns an error if the seed doesn't parse or has consistency issues.
pub fn check() -> Result<(), Box<dyn std::error::Error>> {
    let products = seed::raw()?;
    info!(products = products.len(), "Parsed seed catalog");

    let issues = seed::check(&products);
    if !issues.is_empty() {
        error!("Seed validation failed:");
        for issue in &issues {
            error!("  - {issue}");
        }
        return Err(format!("{} seed issues found", issues.len()).into());
    }

    let catalog = seed::load()?;
    info!("Seed catalog is valid");
    info!("  Products: {}", catalog.products.len());
    info!("  Community posts: {}", catalog.posts.len());
    Ok(())
}
