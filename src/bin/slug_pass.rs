//! Slug pass binary - re-derives every entity's per-language slugs and writes
//! the site file back
//!
//! Usage:
//!   cargo run --bin slug-pass               # Resave all entities
//!   cargo run --bin slug-pass -- --dry-run  # Print the report only
//!
//! Optional:
//! - SITE_FILE (defaults to data/site.json)

use anyhow::{Context, Result};
use lingua_routes::config::Config;
use lingua_routes::site_file::SiteDefinition;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingua_routes=info".parse()?),
        )
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");
    let config = Config::from_env()?;

    let mut definition = SiteDefinition::load(&config.site_file)?;
    let site = definition.clone().into_site(config.cache_capacity)?;

    let report = site.resave_all();
    for (id, reason) in &report.failed {
        warn!("Entity {} kept its slugs: {}", id, reason);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    if dry_run {
        info!("Dry run, {} left untouched", config.site_file.display());
        return Ok(());
    }

    definition.refresh_entities(&site);
    definition.save(&config.site_file)?;
    info!("✓ Wrote {} entities to {}", definition.entities.len(), config.site_file.display());
    Ok(())
}
