use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Site
    pub site_file: PathBuf,

    // Server
    pub port: u16,
    pub api_key: Option<String>,

    // Resolution
    pub cache_capacity: usize,

    // Detection
    pub language_cookie: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            site_file: std::env::var("SITE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/site.json")),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(8080),

            // Admin endpoints are disabled without a key
            api_key: std::env::var("API_KEY").ok().filter(|key| !key.is_empty()),

            cache_capacity: std::env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|capacity: &usize| *capacity > 0)
                .unwrap_or(4096),

            language_cookie: std::env::var("LANGUAGE_COOKIE")
                .unwrap_or_else(|_| "lingua_language".to_string()),
        })
    }
}
