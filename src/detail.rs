use crate::format::{format_currency, format_rating, format_release_date, format_runtime};
use crate::models::{CastMember, Genre, MovieDetails, Video};
use crate::tmdb::{image_url, ImageSize};

const TRAILER_TYPE: &str = "Trailer";
const TRAILER_SITE: &str = "YouTube";
const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
const CAST_LIMIT: usize = 8;

/// First YouTube trailer in upstream order, as a watch URL.
pub fn trailer_url(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|v| v.video_type == TRAILER_TYPE && v.site == TRAILER_SITE)
        .map(|v| format!("{WATCH_BASE}{}", v.key))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastCard {
    pub name: String,
    pub character: String,
    /// `None` renders the name's initial instead of a portrait.
    pub portrait: Option<String>,
}

impl CastCard {
    fn from_member(member: &CastMember) -> Self {
        let portrait = member
            .profile_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| image_url(Some(p), ImageSize::W185));
        Self {
            name: member.name.clone(),
            character: member.character.clone(),
            portrait,
        }
    }

    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

/// Everything the detail page displays, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: u32,
    pub title: String,
    pub tagline: Option<String>,
    pub genres: Vec<Genre>,
    pub rating: String,
    pub vote_count: u64,
    pub release_date: Option<String>,
    pub runtime: Option<String>,
    pub overview: String,
    pub trailer_url: Option<String>,
    pub homepage: Option<String>,
    pub backdrop: String,
    pub poster: String,
    pub cast: Vec<CastCard>,
    pub status: String,
    pub budget: Option<String>,
    pub revenue: Option<String>,
    pub production: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl DetailView {
    pub fn from_details(details: &MovieDetails) -> Self {
        let movie = &details.movie;
        let overview = if movie.overview.trim().is_empty() {
            "No overview available.".to_string()
        } else {
            movie.overview.clone()
        };
        let production = if details.production_companies.is_empty() {
            None
        } else {
            Some(
                details
                    .production_companies
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        };

        Self {
            id: movie.id,
            title: movie.title.clone(),
            tagline: non_empty(details.tagline.as_deref()),
            genres: details.genres.clone(),
            rating: format_rating(movie.vote_average),
            vote_count: movie.vote_count,
            release_date: movie.release_date.as_deref().and_then(format_release_date),
            runtime: details.runtime.and_then(format_runtime),
            overview,
            trailer_url: trailer_url(&details.videos.results),
            homepage: non_empty(details.homepage.as_deref()),
            backdrop: image_url(movie.backdrop_path.as_deref(), ImageSize::Original),
            poster: image_url(movie.poster_path.as_deref(), ImageSize::W500),
            cast: details
                .credits
                .cast
                .iter()
                .take(CAST_LIMIT)
                .map(CastCard::from_member)
                .collect(),
            status: details.status.clone(),
            budget: (details.budget > 0).then(|| format_currency(details.budget)),
            revenue: (details.revenue > 0).then(|| format_currency(details.revenue)),
            production,
        }
    }
}
