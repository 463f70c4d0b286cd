use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cinevista::app::{build_router, AppState};
use cinevista::models::{
    CastMember, Credits, Genre, GenreList, Movie, MovieDetails, MoviePage, Video, Videos,
};
use cinevista::tmdb::{TmdbApi, TmdbError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

#[derive(Default)]
struct FakeTmdb {
    lists: HashMap<&'static str, Vec<Movie>>,
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
    details: HashMap<u32, MovieDetails>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl FakeTmdb {
    fn with_list(mut self, name: &'static str, movies: Vec<Movie>) -> Self {
        self.lists.insert(name, movies);
        self
    }

    fn failing(mut self, name: &'static str) -> Self {
        self.failing.insert(name);
        self
    }

    /// Calls to `name` are recorded and then never complete.
    fn hanging(mut self, name: &'static str) -> Self {
        self.hanging.insert(name);
        self
    }

    fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(details.movie.id, details);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    async fn record(&self, name: &'static str, call: String) -> Result<(), TmdbError> {
        self.calls.lock().unwrap().push(call);
        if self.hanging.contains(name) {
            std::future::pending::<()>().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(name) {
            return Err(TmdbError::Status {
                path: name.to_string(),
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }
        Ok(())
    }

    async fn list(&self, name: &'static str, call: String) -> Result<MoviePage, TmdbError> {
        self.record(name, call).await?;
        let results = self.lists.get(name).cloned().unwrap_or_default();
        Ok(MoviePage {
            page: 1,
            total_results: results.len() as u64,
            total_pages: 1,
            results,
        })
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn trending(&self) -> Result<MoviePage, TmdbError> {
        self.list("trending", "trending".into()).await
    }

    async fn now_playing(&self) -> Result<MoviePage, TmdbError> {
        self.list("now_playing", "now_playing".into()).await
    }

    async fn top_rated(&self) -> Result<MoviePage, TmdbError> {
        self.list("top_rated", "top_rated".into()).await
    }

    async fn upcoming(&self) -> Result<MoviePage, TmdbError> {
        self.list("upcoming", "upcoming".into()).await
    }

    async fn search(&self, text: &str) -> Result<MoviePage, TmdbError> {
        self.list("search", format!("search:{text}")).await
    }

    async fn by_genre(&self, genre_id: u32) -> Result<MoviePage, TmdbError> {
        self.list("genre", format!("genre:{genre_id}")).await
    }

    async fn movie_details(&self, id: u32) -> Result<Option<MovieDetails>, TmdbError> {
        self.record("details", format!("movie:{id}")).await?;
        Ok(self.details.get(&id).cloned())
    }

    async fn genres(&self) -> Result<GenreList, TmdbError> {
        self.record("genres", "genres".into()).await?;
        Ok(GenreList {
            genres: vec![
                Genre {
                    id: 27,
                    name: "Horror".to_string(),
                },
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
            ],
        })
    }
}

fn movie(id: u32, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: Some(format!("/backdrop-{id}.jpg")),
        overview: format!("{title} overview"),
        release_date: Some("2024-03-01".to_string()),
        vote_average: 7.8,
        vote_count: 1200,
        genre_ids: vec![27],
        popularity: 50.0,
    }
}

fn inception() -> MovieDetails {
    MovieDetails {
        movie: Movie {
            id: 27205,
            title: "Inception".to_string(),
            poster_path: Some("/inception.jpg".to_string()),
            backdrop_path: Some("/inception-bg.jpg".to_string()),
            overview: "A thief who steals corporate secrets.".to_string(),
            release_date: Some("2010-07-15".to_string()),
            vote_average: 8.4,
            vote_count: 35000,
            genre_ids: vec![],
            popularity: 90.0,
        },
        genres: vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }],
        runtime: Some(148),
        tagline: Some("Your mind is the scene of the crime.".to_string()),
        status: "Released".to_string(),
        budget: 160_000_000,
        revenue: 825_532_764,
        homepage: None,
        production_companies: vec![],
        credits: Credits {
            cast: vec![CastMember {
                id: 6193,
                name: "Leonardo DiCaprio".to_string(),
                character: "Cobb".to_string(),
                profile_path: None,
            }],
            crew: vec![],
        },
        videos: Videos {
            results: vec![
                Video {
                    id: "v1".to_string(),
                    key: "featurette".to_string(),
                    name: "Behind the scenes".to_string(),
                    site: "YouTube".to_string(),
                    video_type: "Featurette".to_string(),
                },
                Video {
                    id: "v2".to_string(),
                    key: "YoHD9XEInc0".to_string(),
                    name: "Official Trailer".to_string(),
                    site: "YouTube".to_string(),
                    video_type: "Trailer".to_string(),
                },
            ],
        },
    }
}

fn app_with(tmdb: FakeTmdb) -> (Router, Arc<FakeTmdb>) {
    let tmdb = Arc::new(tmdb);
    let state = AppState::new(tmdb.clone(), Duration::from_secs(300));
    (build_router(state), tmdb)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn home_shell_defers_every_section() {
    let (app, tmdb) = app_with(FakeTmdb::default());
    let (status, html) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let order: Vec<usize> = [
        "/fragments/feed/trending",
        "/fragments/feed/now-playing",
        "/fragments/feed/top-rated",
        "/fragments/feed/upcoming",
    ]
    .iter()
    .map(|src| html.find(src).expect("section fragment missing"))
    .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
    assert!(html.contains("data-fragment=\"/fragments/hero\""));
    assert!(tmdb.calls().is_empty());
}

#[tokio::test]
async fn feed_fragment_keeps_upstream_order() {
    let (app, _) = app_with(FakeTmdb::default().with_list(
        "top_rated",
        vec![movie(2, "Godfather"), movie(1, "Shawshank")],
    ));
    let (status, html) = send(&app, get("/fragments/feed/top-rated")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Top Rated"));
    assert!(html.find("/movie/2").unwrap() < html.find("/movie/1").unwrap());
    assert!(html.contains("data-scroll=\"right\""));
    assert!(!html.contains("data-fragment"));
}

#[tokio::test]
async fn failed_feed_shows_notice_and_is_retried_later() {
    let (app, tmdb) = app_with(
        FakeTmdb::default()
            .with_list("trending", vec![movie(1, "Dune")])
            .failing("upcoming"),
    );
    let (status, html) = send(&app, get("/fragments/feed/upcoming")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("Unable to load movies at this time."));
    assert!(!html.contains("data-scroll"));

    send(&app, get("/fragments/feed/trending")).await;
    let (_, home) = send(&app, get("/")).await;
    assert!(home.contains("/movie/1"));
    assert!(!home.contains("/fragments/feed/trending"));
    assert!(home.contains("/fragments/feed/upcoming"));

    send(&app, get("/fragments/feed/upcoming")).await;
    assert_eq!(tmdb.count("upcoming"), 2);
    assert_eq!(tmdb.count("trending"), 1);
}

#[tokio::test]
async fn empty_feed_says_so() {
    let (app, _) = app_with(FakeTmdb::default());
    let (_, html) = send(&app, get("/fragments/feed/now-playing")).await;
    assert!(html.contains("No movies available."));
}

#[tokio::test]
async fn unknown_feed_is_not_found() {
    let (app, tmdb) = app_with(FakeTmdb::default());
    let (status, _) = send(&app, get("/fragments/feed/popular")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(tmdb.calls().is_empty());
}

#[tokio::test]
async fn concurrent_requests_share_one_upstream_call() {
    let (app, tmdb) = app_with(
        FakeTmdb::default()
            .with_list("now_playing", vec![movie(9, "Civil War")])
            .with_delay(Duration::from_millis(50)),
    );
    let (a, b, c) = tokio::join!(
        send(&app, get("/fragments/feed/now-playing")),
        send(&app, get("/fragments/feed/now-playing")),
        send(&app, get("/fragments/hero")),
    );
    assert!(a.1.contains("/movie/9"));
    assert!(b.1.contains("/movie/9"));
    assert!(c.1.contains("Featured Film"));
    assert_eq!(tmdb.count("now_playing"), 1);
}

#[tokio::test]
async fn hero_falls_back_to_banner_on_failure() {
    let (app, _) = app_with(FakeTmdb::default().failing("now_playing"));
    let (status, html) = send(&app, get("/fragments/hero")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Cinematic Vistas"));
    assert!(!html.contains("Featured Film"));
}

#[tokio::test]
async fn listing_search_wins_over_genre() {
    let (app, tmdb) = app_with(
        FakeTmdb::default()
            .with_list("search", vec![movie(3, "Alien")])
            .with_list("genre", vec![movie(4, "Hereditary")]),
    );
    let (status, html) = send(&app, get("/movies?search=alien&genre=27")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Search results for &quot;alien&quot;"));
    assert!(html.contains("data-fragment=\"/fragments/grid?search=alien\""));

    let (_, grid) = send(&app, get("/fragments/grid?search=alien&genre=27")).await;
    assert!(grid.contains("/movie/3"));
    assert!(!grid.contains("/movie/4"));
    assert_eq!(tmdb.count("search:alien"), 1);
    assert_eq!(tmdb.count("genre:27"), 0);
}

#[tokio::test]
async fn listing_genre_uses_genre_name() {
    let (app, tmdb) = app_with(FakeTmdb::default().with_list("genre", vec![movie(4, "Hereditary")]));
    let (_, html) = send(&app, get("/movies?genre=27")).await;
    assert!(html.contains("<h1>Movies by Genre</h1>"));
    assert!(html.contains("data-fragment=\"/fragments/genres?genre=27\""));
    assert!(tmdb.calls().is_empty());

    let (status, head) = send(&app, get("/fragments/genres?genre=27")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(head.contains("<h1>Horror Movies</h1>"));
    assert!(head.contains("<a class=\"chip active\" href=\"/movies?genre=27\">Horror</a>"));

    let (_, html) = send(&app, get("/movies?genre=27")).await;
    assert!(html.contains("<h1>Horror Movies</h1>"));
    assert!(!html.contains("/fragments/genres"));

    let (_, html) = send(&app, get("/movies?genre=99")).await;
    assert!(html.contains("<h1>Movies by Genre</h1>"));
    assert_eq!(tmdb.count("genres"), 1);
}

#[tokio::test]
async fn listing_page_does_not_wait_for_genres() {
    let (app, tmdb) = app_with(
        FakeTmdb::default()
            .hanging("genres")
            .with_list("search", vec![movie(3, "Alien")]),
    );
    let in_flight = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, get("/fragments/genres?search=alien")).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, html) = tokio::time::timeout(
        Duration::from_secs(2),
        send(&app, get("/movies?search=alien")),
    )
    .await
    .expect("listing page waited on the genre table");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Search results for &quot;alien&quot;"));
    assert!(html.contains("data-fragment=\"/fragments/genres?search=alien\""));

    let (_, grid) = tokio::time::timeout(
        Duration::from_secs(2),
        send(&app, get("/fragments/grid?search=alien")),
    )
    .await
    .expect("grid waited on the genre table");
    assert!(grid.contains("/movie/3"));

    assert!(!in_flight.is_finished());
    in_flight.abort();
    assert_eq!(tmdb.count("genres"), 1);
}

#[tokio::test]
async fn hung_feed_leaves_other_sections_alone() {
    let (app, _) = app_with(
        FakeTmdb::default()
            .hanging("upcoming")
            .with_list("trending", vec![movie(1, "Dune")]),
    );
    let in_flight = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, get("/fragments/feed/upcoming")).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, trending) = tokio::time::timeout(
        Duration::from_secs(2),
        send(&app, get("/fragments/feed/trending")),
    )
    .await
    .expect("trending waited on upcoming");
    assert_eq!(status, StatusCode::OK);
    assert!(trending.contains("/movie/1"));

    let (_, home) = tokio::time::timeout(Duration::from_secs(2), send(&app, get("/")))
        .await
        .expect("home shell waited on upcoming");
    assert!(home.contains("/movie/1"));
    assert!(home.contains("data-fragment=\"/fragments/feed/upcoming\""));

    assert!(!in_flight.is_finished());
    in_flight.abort();
}

#[tokio::test]
async fn blank_search_and_bad_genre_fall_back_to_trending() {
    let (app, tmdb) = app_with(FakeTmdb::default().with_list("trending", vec![movie(1, "Dune")]));
    let (_, html) = send(&app, get("/movies?search=%20%20&genre=abc")).await;
    assert!(html.contains("<h1>Explore Movies</h1>"));

    let (_, grid) = send(&app, get("/fragments/grid?search=%20%20&genre=-3")).await;
    assert!(grid.contains("/movie/1"));
    assert_eq!(tmdb.count("trending"), 1);
}

#[tokio::test]
async fn cached_listing_renders_inline() {
    let (app, _) = app_with(FakeTmdb::default().with_list("genre", vec![movie(4, "Hereditary")]));
    send(&app, get("/fragments/grid?genre=27")).await;
    let (_, html) = send(&app, get("/movies?genre=27")).await;
    assert!(html.contains("/movie/4"));
    assert!(!html.contains("/fragments/grid"));
}

#[tokio::test]
async fn empty_and_failed_grids() {
    let (app, _) = app_with(FakeTmdb::default().failing("genre"));
    let (_, empty) = send(&app, get("/fragments/grid?search=zzzz")).await;
    assert!(empty.contains("No movies found"));
    let (status, failed) = send(&app, get("/fragments/grid?genre=18")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(failed.contains("Error loading movies"));
}

#[tokio::test]
async fn detail_page_renders_formatted_fields() {
    let (app, _) = app_with(FakeTmdb::default().with_details(inception()));
    let (status, html) = send(&app, get("/movie/27205")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Inception</h1>"));
    assert!(html.contains("2h 28m"));
    assert!(html.contains("7/15/2010"));
    assert!(html.contains("$160,000,000"));
    assert!(html.contains("href=\"https://www.youtube.com/watch?v=YoHD9XEInc0\""));
    assert!(html.contains("Leonardo DiCaprio"));
    assert!(!html.contains("Official Website"));
}

#[tokio::test]
async fn detail_not_found_paths() {
    let (app, tmdb) = app_with(FakeTmdb::default());
    let (status, html) = send(&app, get("/movie/424242")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Movie not found"));

    for bad in ["/movie/abc", "/movie/0", "/movie/-1"] {
        let (status, html) = send(&app, get(bad)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{bad}");
        assert!(html.contains("Movie not found"));
    }
    assert_eq!(tmdb.calls(), vec!["movie:424242".to_string()]);
}

#[tokio::test]
async fn detail_upstream_failure_is_bad_gateway() {
    let (app, _) = app_with(FakeTmdb::default().failing("details"));
    let (status, html) = send(&app, get("/movie/27205")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("Error loading movie"));
    assert!(html.contains("role=\"alert\""));
}

#[tokio::test]
async fn contact_form_validation() {
    let (app, _) = app_with(FakeTmdb::default());
    let (status, html) = send(&app, get("/contact")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<form method=\"post\" action=\"/contact\">"));

    let (status, html) = send(
        &app,
        post_form("/contact", "name=Ada&email=ada.example.com&subject=&message=Hi"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("value=\"ada.example.com\""));
    assert!(html.contains("id=\"email-error\""));
    assert!(html.contains("id=\"subject-error\""));

    let (status, html) = send(
        &app,
        post_form(
            "/contact",
            "name=Ada&email=ada%40example.com&subject=Hello&message=Great+site",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Message Sent"));
    assert!(!html.contains("ada@example.com"));
}

#[tokio::test]
async fn static_routes() {
    let (app, _) = app_with(FakeTmdb::default());
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, about) = send(&app, get("/about")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(about.contains("About Cinematic Vistas"));

    let res = app.clone().oneshot(get("/placeholder.svg")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/svg+xml");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = app_with(FakeTmdb::default());
    let (status, html) = send(&app, get("/does/not/exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Oops! Page not found"));
    assert!(html.contains("/does/not/exist"));
}
