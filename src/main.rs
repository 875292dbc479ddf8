mod activity;
mod catalog;
mod config;
mod feature;
mod geometry;
mod import;
mod io;
mod parsers;

use clap::Parser;
use config::{Args, ImportConfig};
use import::BatchImport;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ImportConfig::from(Args::parse());

    info!("--- Indexing {} ---", config.import_dir.display());
    let import = BatchImport::new(config);

    info!("--- Importing ---");
    let stats = import.run()?;

    info!("--- Summary ---");
    stats.print();

    Ok(())
}
