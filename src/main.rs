use anyhow::Result;
use cinevista::config::Config;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn check_config(config: &Config) {
    if config.api_key.is_none() {
        warn!("TMDB_API_KEY is not set; movie data requests will fail until it is configured");
    } else {
        info!("TMDB_API_KEY is set");
    }
    info!(
        "Query results stay fresh for {}s",
        config.query_ttl.as_secs()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = dotenv();
    init_tracing();
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    let config = Config::from_env()?;
    check_config(&config);
    cinevista::app::run_server(config).await
}
