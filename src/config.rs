use std::{env, net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use url::Url;

use crate::tmdb::TMDB_BASE;

const DEFAULT_ADDR: &str = "0.0.0.0:3146";
const DEFAULT_QUERY_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing keys are allowed; upstream calls then fail with 401.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub addr: SocketAddr,
    pub query_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = var("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string());
        let base_url =
            Url::parse(&base_url).with_context(|| format!("Invalid TMDB_BASE_URL: {base_url}"))?;

        let addr = var("CINEVISTA_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("Invalid CINEVISTA_ADDR: {addr}"))?;

        let query_ttl = match var("QUERY_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid QUERY_TTL_SECS: {raw}"))?,
            None => DEFAULT_QUERY_TTL_SECS,
        };

        Ok(Self {
            api_key: var("TMDB_API_KEY"),
            base_url,
            addr,
            query_ttl: Duration::from_secs(query_ttl),
        })
    }
}
