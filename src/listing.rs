//! The listing page keeps "what is shown" in the URL. This module is the
//! single mapping from those parameters to a logical query and back.

use serde::Deserialize;

use crate::models::{GenreList, MoviePage};
use crate::query::QueryKey;
use crate::tmdb::{TmdbApi, TmdbError};

/// Raw `/movies` query string. Kept as strings so malformed values are
/// ignored instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListingParams {
    pub search: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    Search(String),
    Genre(u32),
    Trending,
}

impl ListingQuery {
    /// Search wins over genre, genre wins over the default.
    pub fn from_params(params: &ListingParams) -> Self {
        if let Some(text) = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return ListingQuery::Search(text.to_string());
        }
        match params
            .genre
            .as_deref()
            .and_then(|g| g.trim().parse::<u32>().ok())
        {
            Some(id) if id > 0 => ListingQuery::Genre(id),
            _ => ListingQuery::Trending,
        }
    }

    pub fn key(&self) -> QueryKey {
        match self {
            ListingQuery::Search(text) => QueryKey::Search(text.clone()),
            ListingQuery::Genre(id) => QueryKey::Genre(*id),
            ListingQuery::Trending => QueryKey::Trending,
        }
    }

    pub async fn fetch(&self, api: &dyn TmdbApi) -> Result<MoviePage, TmdbError> {
        match self {
            ListingQuery::Search(text) => api.search(text).await,
            ListingQuery::Genre(id) => api.by_genre(*id).await,
            ListingQuery::Trending => api.trending().await,
        }
    }

    /// Query string (without `?`) that reproduces this listing.
    pub fn query_string(&self) -> String {
        match self {
            ListingQuery::Search(text) => format!("search={}", urlencoding::encode(text)),
            ListingQuery::Genre(id) => format!("genre={id}"),
            ListingQuery::Trending => String::new(),
        }
    }

    pub fn href(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            "/movies".to_string()
        } else {
            format!("/movies?{query}")
        }
    }

    pub fn search_text(&self) -> &str {
        match self {
            ListingQuery::Search(text) => text,
            _ => "",
        }
    }

    pub fn active_genre(&self) -> Option<u32> {
        match self {
            ListingQuery::Genre(id) => Some(*id),
            _ => None,
        }
    }

    pub fn title(&self, genres: Option<&GenreList>) -> String {
        match self {
            ListingQuery::Search(text) => format!("Search results for \"{text}\""),
            ListingQuery::Genre(id) => match genres.and_then(|g| g.name_of(*id)) {
                Some(name) => format!("{name} Movies"),
                None => "Movies by Genre".to_string(),
            },
            ListingQuery::Trending => "Explore Movies".to_string(),
        }
    }
}
