use anyhow::{Context, Result};
use lingua_routes::config::Config;
use lingua_routes::server::{self, AppState};
use lingua_routes::site_file::SiteDefinition;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingua_routes=info".parse()?),
        )
        .init();

    info!("Starting multilingual routing service");

    let config = Config::from_env()?;
    if config.api_key.is_none() {
        info!("API_KEY not set, admin endpoints are disabled");
    }

    let site = SiteDefinition::load(&config.site_file)?.into_site(config.cache_capacity)?;
    info!("Serving {:?}", site);

    let port = config.port;
    let app = server::router(Arc::new(AppState { site, config }));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("✓ Listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
