use crate::config::Config;
use crate::contact::{ContactForm, ContactOutcome};
use crate::detail::DetailView;
use crate::home::pick_featured;
use crate::listing::{ListingParams, ListingQuery};
use crate::models::{GenreList, MovieDetails, MoviePage};
use crate::query::{QueryCache, QueryKey, QueryState};
use crate::render;
use crate::tmdb::{Feed, TmdbApi, TmdbClient};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024; // contact form only

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    /// Every movie list: the four feeds, searches and genre browses.
    pub lists: Arc<QueryCache<Arc<MoviePage>>>,
    pub details: Arc<QueryCache<Option<Arc<MovieDetails>>>>,
    pub genres: Arc<QueryCache<Arc<GenreList>>>,
}

impl AppState {
    pub fn new(tmdb: Arc<dyn TmdbApi>, ttl: Duration) -> Self {
        Self {
            tmdb,
            lists: Arc::new(QueryCache::new(ttl)),
            details: Arc::new(QueryCache::new(ttl)),
            genres: Arc::new(QueryCache::new(ttl)),
        }
    }

    async fn feed(&self, feed: Feed) -> QueryState<Arc<MoviePage>> {
        let tmdb = self.tmdb.clone();
        let key = QueryKey::from(feed);
        let state = self
            .lists
            .fetch(key.clone(), move || async move {
                tmdb.feed(feed).await.map(Arc::new)
            })
            .await;
        log_failure(&key, &state);
        state
    }

    async fn listing(&self, query: &ListingQuery) -> QueryState<Arc<MoviePage>> {
        let tmdb = self.tmdb.clone();
        let owned = query.clone();
        let key = query.key();
        let state = self
            .lists
            .fetch(key.clone(), move || async move {
                owned.fetch(tmdb.as_ref()).await.map(Arc::new)
            })
            .await;
        log_failure(&key, &state);
        state
    }

    async fn details(&self, id: u32) -> QueryState<Option<Arc<MovieDetails>>> {
        let tmdb = self.tmdb.clone();
        let key = QueryKey::Movie(id);
        let state = self
            .details
            .fetch(key.clone(), move || async move {
                tmdb.movie_details(id).await.map(|d| d.map(Arc::new))
            })
            .await;
        log_failure(&key, &state);
        state
    }

    async fn genre_list(&self) -> QueryState<Arc<GenreList>> {
        let tmdb = self.tmdb.clone();
        let state = self
            .genres
            .fetch(QueryKey::Genres, move || async move {
                tmdb.genres().await.map(Arc::new)
            })
            .await;
        log_failure(&QueryKey::Genres, &state);
        state
    }
}

fn log_failure<V>(key: &QueryKey, state: &QueryState<V>) {
    if let QueryState::Error(err) = state {
        warn!(%key, error = %err, "Unable to load movies");
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb = TmdbClient::builder()
        .base_url(config.base_url.clone())
        .api_key(config.api_key.clone().unwrap_or_default())
        .build()?;
    info!("Using TMDB at {}", config.base_url);
    let state = AppState::new(Arc::new(tmdb), config.query_ttl);

    let app = build_router(state);

    info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/movies", get(movies))
        .route("/movie/:id", get(movie_detail))
        .route("/about", get(about))
        .route("/contact", get(contact_form).post(contact_submit))
        .route("/health", get(health))
        .route("/placeholder.svg", get(placeholder))
        .route("/fragments/hero", get(hero_fragment))
        .route("/fragments/feed/:feed", get(feed_fragment))
        .route("/fragments/grid", get(grid_fragment))
        .route("/fragments/genres", get(genres_fragment))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn placeholder() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render::PLACEHOLDER_SVG,
    )
}

// The shell renders whatever is already cached; the rest loads via fragments.
async fn home(State(state): State<AppState>) -> Html<String> {
    let hero = match state.lists.peek(&QueryKey::NowPlaying) {
        Some(page) => render::hero(pick_featured(&page.results, &mut rand::rng())),
        None => render::hero_loading(),
    };
    let feeds: Vec<String> = Feed::ALL
        .iter()
        .map(|&feed| render::feed_section(feed, &state.lists.snapshot(&QueryKey::from(feed))))
        .collect();
    Html(render::home_page(&hero, &feeds))
}

async fn hero_fragment(State(state): State<AppState>) -> Html<String> {
    let now_playing = state.feed(Feed::NowPlaying).await;
    let movies = now_playing
        .data()
        .map(|page| page.results.as_slice())
        .unwrap_or_default();
    Html(render::hero(pick_featured(movies, &mut rand::rng())))
}

async fn feed_fragment(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(feed) = Feed::from_slug(&slug) else {
        warn!("Unknown feed requested: {}", slug);
        return (StatusCode::NOT_FOUND, "Unknown feed").into_response();
    };
    let section = state.feed(feed).await;
    Html(render::feed_section(feed, &section)).into_response()
}

// Never awaits upstream: the genre table and the grid each defer to a fragment.
async fn movies(State(state): State<AppState>, Query(params): Query<ListingParams>) -> Html<String> {
    let query = ListingQuery::from_params(&params);
    let genres = state.genres.snapshot(&QueryKey::Genres);
    let grid = state.lists.snapshot(&query.key());
    Html(render::listing_page(&query, &genres, &grid))
}

async fn genres_fragment(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Html<String> {
    let query = ListingQuery::from_params(&params);
    let genres = state.genre_list().await;
    Html(render::listing_head(&query, &genres))
}

async fn grid_fragment(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Html<String> {
    let query = ListingQuery::from_params(&params);
    let grid = state.listing(&query).await;
    Html(render::movie_grid(&grid, &query.href()))
}

async fn movie_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match raw_id.parse::<u32>() {
        Ok(id) if id > 0 => id,
        _ => {
            warn!("Rejecting movie id {:?}", raw_id);
            return (StatusCode::NOT_FOUND, Html(render::detail_not_found_page())).into_response();
        }
    };
    match state.details(id).await {
        QueryState::Success(Some(details)) => {
            Html(render::detail_page(&DetailView::from_details(&details))).into_response()
        }
        QueryState::Success(None) => {
            info!("Movie {} not found upstream", id);
            (StatusCode::NOT_FOUND, Html(render::detail_not_found_page())).into_response()
        }
        QueryState::Error(_) | QueryState::Loading => {
            (StatusCode::BAD_GATEWAY, Html(render::detail_error_page())).into_response()
        }
    }
}

async fn about() -> Html<String> {
    Html(render::about_page())
}

async fn contact_form() -> Html<String> {
    Html(render::contact_page(
        &ContactForm::default(),
        &ContactOutcome::Blank,
    ))
}

async fn contact_submit(Form(form): Form<ContactForm>) -> Response {
    match form.validate() {
        Ok(()) => {
            info!(
                name = %form.name.trim(),
                subject = %form.subject.trim(),
                "Contact message received"
            );
            Html(render::contact_page(&form, &ContactOutcome::Sent)).into_response()
        }
        Err(errors) => {
            info!("Contact form rejected with {} field error(s)", errors.len());
            let html = render::contact_page(&form, &ContactOutcome::Invalid(errors));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
        }
    }
}

async fn not_found(uri: Uri) -> Response {
    warn!("404 for non-existent route {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Html(render::not_found_page(uri.path())),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
