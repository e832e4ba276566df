//! machbar.io CLI - Airtable and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Check that the Airtable products table is reachable
//! machbar airtable check
//!
//! # Print the catalog as the storefront would serve it
//! machbar catalog dump
//!
//! # Print the bundled seed catalog instead
//! machbar catalog dump --seed
//!
//! # Validate the bundled seed catalog
//! machbar seed check
//! ```
//!
//! # Commands
//!
//! - `airtable check` - Inspect the products table
//! - `catalog dump` - Print the normalised catalog as JSON
//! - `seed check` - Validate the bundled seed data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "machbar")]
#[command(author, version, about = "machbar.io CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Airtable connectivity
    Airtable {
        #[command(subcommand)]
        action: AirtableAction,
    },
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Bundled seed data
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum AirtableAction {
    /// Inspect the products table and list its fields
    Check,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print the normalised catalog as JSON
    Dump {
        /// Print the bundled seed instead of fetching from Airtable
        #[arg(long)]
        seed: bool,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Validate the bundled seed catalog
    Check,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so `catalog dump` output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "machbar_cli=info,machbar_storefront=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Airtable { action } => match action {
            AirtableAction::Check => commands::airtable::check().await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Dump { seed } => commands::catalog::dump(seed).await?,
        },
        Commands::Seed { action } => match action {
            SeedAction::Check => commands::seed::check()?,
        },
    }
    Ok(())
}
