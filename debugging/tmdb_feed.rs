//! Run one logical TMDB query through the app's client and print the result.
//! Usage:
//!   cargo run --bin tmdb_feed -- trending|now-playing|top-rated|upcoming
//!   cargo run --bin tmdb_feed -- search <text...>
//!   cargo run --bin tmdb_feed -- genre <genre_id>
//!   cargo run --bin tmdb_feed -- movie <tmdb_id>
//!   cargo run --bin tmdb_feed -- genres
//! Reads TMDB_API_KEY and TMDB_BASE_URL from the environment (.env supported).

use anyhow::{Context, Result};
use cinevista::config::Config;
use cinevista::detail::trailer_url;
use cinevista::tmdb::{Feed, TmdbApi, TmdbClient};
use dotenvy::dotenv;
use serde_json::{json, Value};
use std::env;

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin tmdb_feed -- trending|now-playing|top-rated|upcoming");
    eprintln!("       cargo run --bin tmdb_feed -- search <text...>");
    eprintln!("       cargo run --bin tmdb_feed -- genre <genre_id>");
    eprintln!("       cargo run --bin tmdb_feed -- movie <tmdb_id>");
    eprintln!("       cargo run --bin tmdb_feed -- genres");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        usage();
    };

    let config = Config::from_env()?;
    let api_key = config.api_key.context("TMDB_API_KEY not set")?;
    let client = TmdbClient::builder()
        .base_url(config.base_url)
        .api_key(api_key)
        .build()?;

    let output: Value = match command.as_str() {
        "search" => {
            let text = args[1..].join(" ");
            if text.trim().is_empty() {
                usage();
            }
            serde_json::to_value(client.search(text.trim()).await?)?
        }
        "genre" => {
            let id: u32 = args
                .get(1)
                .context("missing genre id")?
                .parse()
                .context("genre id must be an integer")?;
            serde_json::to_value(client.by_genre(id).await?)?
        }
        "movie" => {
            let id: u32 = args
                .get(1)
                .context("missing tmdb id")?
                .parse()
                .context("tmdb id must be an integer")?;
            match client.movie_details(id).await? {
                Some(details) => json!({
                    "trailer": trailer_url(&details.videos.results),
                    "details": details,
                }),
                None => json!({ "not_found": id }),
            }
        }
        "genres" => serde_json::to_value(client.genres().await?)?,
        slug => match Feed::from_slug(slug) {
            Some(feed) => serde_json::to_value(client.feed(feed).await?)?,
            None => usage(),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
