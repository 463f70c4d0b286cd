use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::{GenreList, MovieDetails, MoviePage};

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3/";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid endpoint {path}: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0} must be a positive identifier")]
    InvalidId(&'static str),
}

impl TmdbError {
    /// HTTP status reported by the upstream, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            TmdbError::Status { status, .. } => Some(*status),
            TmdbError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// The four curated lists shown on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Trending,
    NowPlaying,
    TopRated,
    Upcoming,
}

impl Feed {
    pub const ALL: [Feed; 4] = [Feed::Trending, Feed::NowPlaying, Feed::TopRated, Feed::Upcoming];

    fn path(self) -> &'static str {
        match self {
            Feed::Trending => "trending/movie/week",
            Feed::NowPlaying => "movie/now_playing",
            Feed::TopRated => "movie/top_rated",
            Feed::Upcoming => "movie/upcoming",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Feed::Trending => "trending",
            Feed::NowPlaying => "now-playing",
            Feed::TopRated => "top-rated",
            Feed::Upcoming => "upcoming",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Feed::ALL.into_iter().find(|f| f.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W185,
    W500,
    Original,
}

impl ImageSize {
    fn as_str(self) -> &'static str {
        match self {
            ImageSize::W185 => "w185",
            ImageSize::W500 => "w500",
            ImageSize::Original => "original",
        }
    }
}

pub fn image_url(path: Option<&str>, size: ImageSize) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(p) => format!("{IMAGE_BASE}/{}{p}", size.as_str()),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn trending(&self) -> Result<MoviePage, TmdbError>;
    async fn now_playing(&self) -> Result<MoviePage, TmdbError>;
    async fn top_rated(&self) -> Result<MoviePage, TmdbError>;
    async fn upcoming(&self) -> Result<MoviePage, TmdbError>;
    async fn search(&self, text: &str) -> Result<MoviePage, TmdbError>;
    async fn by_genre(&self, genre_id: u32) -> Result<MoviePage, TmdbError>;
    /// `Ok(None)` when the upstream has no movie with this id.
    async fn movie_details(&self, id: u32) -> Result<Option<MovieDetails>, TmdbError>;
    async fn genres(&self) -> Result<GenreList, TmdbError>;

    async fn feed(&self, feed: Feed) -> Result<MoviePage, TmdbError> {
        match feed {
            Feed::Trending => self.trending().await,
            Feed::NowPlaying => self.now_playing().await,
            Feed::TopRated => self.top_rated().await,
            Feed::Upcoming => self.upcoming().await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Default)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
}

impl TmdbClientBuilder {
    /// Overrides the upstream base URL (used to point tests at a mock server).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn build(self) -> Result<TmdbClient> {
        let mut base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(TMDB_BASE).context("invalid default TMDB base URL")?,
        };
        // Url::join drops the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let user_agent = format!("cinevista/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(TmdbClient {
            client,
            base_url,
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}

impl TmdbClient {
    pub fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::default()
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, TmdbError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|source| TmdbError::Endpoint {
                path: path.to_string(),
                source,
            })?;
        let mut query = format!("api_key={}", urlencoding::encode(&self.api_key));
        for (name, value) in params {
            query.push('&');
            query.push_str(name);
            query.push('=');
            query.push_str(&urlencoding::encode(value));
        }
        url.set_query(Some(&query));
        Ok(url)
    }

    async fn get_text(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, String), TmdbError> {
        let url = self.endpoint(path, params)?;
        debug!(path, ?params, "TMDB request");
        let transport = |source| TmdbError::Transport {
            path: path.to_string(),
            source,
        };
        let res = self.client.get(url).send().await.map_err(transport)?;
        let status = res.status();
        let text = res.text().await.map_err(transport)?;
        Ok((status, text))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        let result = match self.get_text(path, params).await {
            Ok((status, text)) => decode(path, status, &text),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("TMDB request failed: {}", e);
        }
        result
    }
}

fn decode<T: DeserializeOwned>(path: &str, status: StatusCode, text: &str) -> Result<T, TmdbError> {
    if !status.is_success() {
        return Err(TmdbError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }
    serde_json::from_str(text).map_err(|source| TmdbError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn trending(&self) -> Result<MoviePage, TmdbError> {
        self.get_json(Feed::Trending.path(), &[]).await
    }

    async fn now_playing(&self) -> Result<MoviePage, TmdbError> {
        self.get_json(Feed::NowPlaying.path(), &[]).await
    }

    async fn top_rated(&self) -> Result<MoviePage, TmdbError> {
        self.get_json(Feed::TopRated.path(), &[]).await
    }

    async fn upcoming(&self) -> Result<MoviePage, TmdbError> {
        self.get_json(Feed::Upcoming.path(), &[]).await
    }

    async fn search(&self, text: &str) -> Result<MoviePage, TmdbError> {
        self.get_json("search/movie", &[("query", text)]).await
    }

    async fn by_genre(&self, genre_id: u32) -> Result<MoviePage, TmdbError> {
        if genre_id == 0 {
            return Err(TmdbError::InvalidId("genre id"));
        }
        let id = genre_id.to_string();
        self.get_json("discover/movie", &[("with_genres", id.as_str())])
            .await
    }

    async fn movie_details(&self, id: u32) -> Result<Option<MovieDetails>, TmdbError> {
        if id == 0 {
            return Ok(None);
        }
        let path = format!("movie/{id}");
        let params = [("append_to_response", "credits,videos")];
        let (status, text) = match self.get_text(&path, &params).await {
            Ok(res) => res,
            Err(e) => {
                warn!("TMDB request failed: {}", e);
                return Err(e);
            }
        };
        if status == StatusCode::NOT_FOUND {
            debug!(id, "TMDB has no movie with this id");
            return Ok(None);
        }
        match decode(&path, status, &text) {
            Ok(details) => Ok(Some(details)),
            Err(e) => {
                warn!("TMDB request failed: {}", e);
                Err(e)
            }
        }
    }

    async fn genres(&self) -> Result<GenreList, TmdbError> {
        self.get_json("genre/movie/list", &[]).await
    }
}
