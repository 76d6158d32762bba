//! Prints the multilingual route table compiled from the site file.
//!
//! Usage:
//!   cargo run --bin dump-routes
//!   cargo run --bin dump-routes -- --json

use anyhow::{Context, Result};
use lingua_routes::config::Config;
use lingua_routes::routes::RouteRule;
use lingua_routes::site_file::SiteDefinition;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingua_routes=warn".parse()?),
        )
        .init();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");
    let config = Config::from_env()?;
    let site = SiteDefinition::load(&config.site_file)?.into_site(config.cache_capacity)?;

    let routes = site.routes();
    if json {
        let rules: Vec<&RouteRule> = routes.rules().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rules).context("Failed to serialize routes")?
        );
        return Ok(());
    }

    let width = routes.rules().map(|rule| rule.pattern.len()).max().unwrap_or(0);
    for rule in routes.rules() {
        println!("{:>4}  {:<width$}  {}", rule.order, rule.pattern, rule.target, width = width);
    }
    println!("\n{} rules", routes.len());
    Ok(())
}
