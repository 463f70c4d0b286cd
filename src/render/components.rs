use std::sync::Arc;

use super::{css_url, escape_html};
use crate::carousel::{SectionView, END_EPSILON_PX, PLACEHOLDER_COUNT, SCROLL_STEP_RATIO};
use crate::format::{format_rating, release_year, truncate_overview};
use crate::models::{GenreList, Movie, MoviePage};
use crate::query::QueryState;
use crate::tmdb::{image_url, Feed, ImageSize};

const GRID_PLACEHOLDER_COUNT: usize = 10;

fn feed_heading(feed: Feed) -> (&'static str, &'static str) {
    match feed {
        Feed::Trending => ("Trending This Week", "The most popular movies right now"),
        Feed::NowPlaying => ("Now Playing", "In theaters now"),
        Feed::TopRated => ("Top Rated", "Movies that stood the test of time"),
        Feed::Upcoming => ("Coming Soon", "Movies to look forward to"),
    }
}

fn section_view(state: &QueryState<Arc<MoviePage>>) -> SectionView<'_, Movie> {
    let items = state
        .data()
        .map(|page| page.results.as_slice())
        .unwrap_or_default();
    SectionView::select(state.is_loading(), state.is_error(), items)
}

pub fn movie_card(movie: &Movie) -> String {
    let year = movie
        .release_date
        .as_deref()
        .and_then(release_year)
        .map(|y| format!("<p class=\"year\">{y}</p>"))
        .unwrap_or_default();
    let title = escape_html(&movie.title);
    format!(
        "<a class=\"card\" href=\"/movie/{id}\"><img src=\"{poster}\" alt=\"{title}\" loading=\"lazy\">\
<div class=\"meta\"><span class=\"rating\">&#9733; {rating}</span><h3>{title}</h3>{year}</div></a>",
        id = movie.id,
        poster = escape_html(&image_url(movie.poster_path.as_deref(), ImageSize::W500)),
        rating = format_rating(movie.vote_average),
    )
}

fn placeholders(count: usize) -> String {
    "<div class=\"placeholder\"></div>".repeat(count)
}

/// One home-page row. `Loading` carries the fragment URL that replaces it.
pub fn feed_section(feed: Feed, state: &QueryState<Arc<MoviePage>>) -> String {
    let (title, subtitle) = feed_heading(feed);
    let view = section_view(state);
    let fragment = match view {
        SectionView::Loading => format!(" data-fragment=\"/fragments/feed/{}\"", feed.slug()),
        _ => String::new(),
    };
    let controls = match view {
        SectionView::Items(_) => "<div class=\"controls\">\
<button type=\"button\" data-scroll=\"left\" aria-label=\"Scroll left\" disabled>&#8249;</button>\
<button type=\"button\" data-scroll=\"right\" aria-label=\"Scroll right\">&#8250;</button></div>",
        _ => "",
    };
    let content = match view {
        SectionView::Loading => format!(
            "<div class=\"row\" aria-busy=\"true\">{}</div>",
            placeholders(PLACEHOLDER_COUNT)
        ),
        SectionView::Error => "<p class=\"notice error\" role=\"alert\">&#9888; Unable to load movies at this time.</p>".to_string(),
        SectionView::Empty => "<p class=\"notice\">No movies available.</p>".to_string(),
        SectionView::Items(movies) => {
            let cards: String = movies.iter().map(movie_card).collect();
            format!("<div class=\"row\" data-track>{cards}</div>")
        }
    };
    format!(
        "<section class=\"feed container\" id=\"feed-{slug}\" data-carousel data-epsilon=\"{END_EPSILON_PX}\" data-step=\"{SCROLL_STEP_RATIO}\"{fragment}>\
<div class=\"section-head\"><div><h2>{title}</h2><p>{subtitle}</p></div>{controls}</div>{content}</section>",
        slug = feed.slug(),
    )
}

/// Listing results. `fragment_src` is used only while loading.
pub fn movie_grid(state: &QueryState<Arc<MoviePage>>, fragment_src: &str) -> String {
    match section_view(state) {
        SectionView::Loading => format!(
            "<div class=\"grid\" id=\"results\" aria-busy=\"true\" data-fragment=\"{}\">{}</div>",
            escape_html(fragment_src),
            placeholders(GRID_PLACEHOLDER_COUNT)
        ),
        SectionView::Error => "<div id=\"results\" class=\"notice error\" role=\"alert\"><h3>Error loading movies</h3>\
<p>We encountered an issue while loading the movie data. Please try again later.</p></div>"
            .to_string(),
        SectionView::Empty => "<div id=\"results\" class=\"notice\"><h3>No movies found</h3>\
<p>Try adjusting your search or filters.</p></div>"
            .to_string(),
        SectionView::Items(movies) => {
            let cards: String = movies.iter().map(movie_card).collect();
            format!("<div class=\"grid\" id=\"results\">{cards}</div>")
        }
    }
}

pub(crate) fn genre_chips(genres: &GenreList, active: Option<u32>) -> String {
    if genres.genres.is_empty() {
        return String::new();
    }
    let chips: String = genres
        .genres
        .iter()
        .map(|g| {
            let class = if Some(g.id) == active {
                "chip active"
            } else {
                "chip"
            };
            format!(
                "<a class=\"{class}\" href=\"/movies?genre={}\">{}</a>",
                g.id,
                escape_html(&g.name)
            )
        })
        .collect();
    format!("<div class=\"genres\"><h2>Browse by Genre</h2>{chips}</div>")
}

fn default_banner() -> String {
    "<div class=\"hero\" id=\"hero\"><div class=\"content\"><h1>Cinematic Vistas</h1>\
<p>Your premiere destination for exploring the world of cinema.</p></div></div>"
        .to_string()
}

/// Featured film banner. Without a movie, the static site banner.
pub fn hero(movie: Option<&Movie>) -> String {
    let Some(movie) = movie else {
        return default_banner();
    };
    let backdrop = image_url(movie.backdrop_path.as_deref(), ImageSize::Original);
    format!(
        "<div class=\"hero\" id=\"hero\" style=\"background-image:url('{backdrop}')\"><div class=\"content\">\
<span class=\"badge\">Featured Film</span><h1>{title}</h1><p>{overview}</p>\
<a class=\"button\" href=\"/movie/{id}\">More Details</a></div></div>",
        backdrop = escape_html(&css_url(&backdrop)),
        title = escape_html(&movie.title),
        overview = escape_html(&truncate_overview(&movie.overview)),
        id = movie.id,
    )
}

pub(crate) fn hero_loading() -> String {
    default_banner().replacen(
        "id=\"hero\"",
        "id=\"hero\" data-fragment=\"/fragments/hero\"",
        1,
    )
}
