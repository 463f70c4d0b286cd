use std::sync::Arc;

use super::components::{genre_chips, movie_grid};
use super::{css_url, escape_html, layout, search_bar, NavItem};
use crate::contact::{ContactField, ContactForm, ContactOutcome, FieldError};
use crate::detail::{CastCard, DetailView};
use crate::listing::ListingQuery;
use crate::models::{GenreList, MoviePage};
use crate::query::QueryState;

/// `hero` and `feeds` are already rendered, in display order.
pub fn home_page(hero: &str, feeds: &[String]) -> String {
    let sections: String = feeds.concat();
    layout("", NavItem::Home, &format!("{hero}{sections}"))
}

/// Title and genre chips. The title needs the genre table for genre names,
/// so while that table loads this block is its own deferred section.
pub fn listing_head(query: &ListingQuery, genres: &QueryState<Arc<GenreList>>) -> String {
    let table = genres.data().map(|g| g.as_ref());
    let title = escape_html(&query.title(table));
    match genres {
        QueryState::Loading => format!(
            "<div class=\"listing-head\" id=\"listing-head\" aria-busy=\"true\" data-fragment=\"{}\"><h1>{title}</h1></div>",
            escape_html(&format!("/fragments/genres?{}", query.query_string()))
        ),
        _ => format!(
            "<div class=\"listing-head\" id=\"listing-head\"><h1>{title}</h1>{}</div>",
            table
                .map(|g| genre_chips(g, query.active_genre()))
                .unwrap_or_default()
        ),
    }
}

pub fn listing_page(
    query: &ListingQuery,
    genres: &QueryState<Arc<GenreList>>,
    grid: &QueryState<Arc<MoviePage>>,
) -> String {
    let title = query.title(genres.data().map(|g| g.as_ref()));
    let clear = match query {
        ListingQuery::Trending => String::new(),
        _ => "<a class=\"clear\" href=\"/movies\">Clear filters</a>".to_string(),
    };
    let fragment = format!("/fragments/grid?{}", query.query_string());
    let body = format!(
        "<div class=\"container listing\">{head}{search}{clear}{grid}</div>",
        head = listing_head(query, genres),
        search = search_bar(query.search_text()),
        grid = movie_grid(grid, &fragment),
    );
    layout(&title, NavItem::Movies, &body)
}

fn cast_card(card: &CastCard) -> String {
    let portrait = match &card.portrait {
        Some(src) => format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape_html(src),
            escape_html(&card.name)
        ),
        None => format!(
            "<div class=\"initial\" aria-hidden=\"true\">{}</div>",
            escape_html(&card.initial())
        ),
    };
    format!(
        "<li class=\"cast\">{portrait}<p class=\"name\">{}</p><p class=\"character\">{}</p></li>",
        escape_html(&card.name),
        escape_html(&card.character)
    )
}

fn fact(label: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("<dt>{label}</dt><dd>{}</dd>", escape_html(v)),
        None => String::new(),
    }
}

pub fn detail_page(view: &DetailView) -> String {
    let tagline = view
        .tagline
        .as_deref()
        .map(|t| format!("<p class=\"tagline\">&quot;{}&quot;</p>", escape_html(t)))
        .unwrap_or_default();
    let genres: String = view
        .genres
        .iter()
        .map(|g| {
            format!(
                "<a class=\"chip\" href=\"/movies?genre={}\">{}</a>",
                g.id,
                escape_html(&g.name)
            )
        })
        .collect();
    let mut meta = format!(
        "<span class=\"rating\">&#9733; {} <small>({} votes)</small></span>",
        view.rating, view.vote_count
    );
    if let Some(date) = &view.release_date {
        meta.push_str(&format!("<span class=\"date\">{}</span>", escape_html(date)));
    }
    if let Some(runtime) = &view.runtime {
        meta.push_str(&format!("<span class=\"runtime\">{runtime}</span>"));
    }
    let mut actions = String::new();
    if let Some(url) = &view.trailer_url {
        actions.push_str(&format!(
            "<a class=\"button\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Watch Trailer</a>",
            escape_html(url)
        ));
    }
    if let Some(url) = &view.homepage {
        actions.push_str(&format!(
            "<a class=\"button secondary\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Official Website</a>",
            escape_html(url)
        ));
    }
    let cast = if view.cast.is_empty() {
        String::new()
    } else {
        let cards: String = view.cast.iter().map(cast_card).collect();
        format!("<section class=\"container\"><h2>Cast</h2><ul class=\"cast-list\">{cards}</ul></section>")
    };
    let status = (!view.status.is_empty()).then_some(view.status.as_str());
    let facts = format!(
        "{}{}{}{}",
        fact("Status", status),
        fact("Budget", view.budget.as_deref()),
        fact("Revenue", view.revenue.as_deref()),
        fact("Production", view.production.as_deref()),
    );

    let body = format!(
        "<div class=\"hero backdrop\" style=\"background-image:url('{backdrop}')\"></div>\
<article class=\"container detail\"><img class=\"poster\" src=\"{poster}\" alt=\"{title}\">\
<div class=\"info\"><h1>{title}</h1>{tagline}<div class=\"genres\">{genres}</div>\
<div class=\"meta\">{meta}</div><h2>Overview</h2><p>{overview}</p>\
<div class=\"actions\">{actions}</div><dl class=\"facts\">{facts}</dl></div></article>{cast}",
        backdrop = escape_html(&css_url(&view.backdrop)),
        poster = escape_html(&view.poster),
        title = escape_html(&view.title),
        overview = escape_html(&view.overview),
    );
    layout(&view.title, NavItem::Other, &body)
}

pub fn detail_not_found_page() -> String {
    layout(
        "Movie not found",
        NavItem::Other,
        "<div class=\"container notice\"><h1>Movie not found</h1>\
<p>The movie you're looking for doesn't exist or has been removed.</p>\
<a class=\"button\" href=\"/movies\">Browse Movies</a></div>",
    )
}

pub fn detail_error_page() -> String {
    layout(
        "Error",
        NavItem::Other,
        "<div class=\"container notice error\" role=\"alert\"><h1>Error loading movie</h1>\
<p>We encountered an issue while loading this movie. Please try again later.</p>\
<a class=\"button\" href=\"/movies\">Browse Movies</a></div>",
    )
}

pub fn about_page() -> String {
    layout(
        "About",
        NavItem::About,
        "<div class=\"container about\"><h1>About Cinematic Vistas</h1>\
<p>Cinematic Vistas is a place to discover films: what is trending this week, \
what is playing in theaters, the highest rated classics and what is coming soon.</p>\
<h2>Our Data</h2><p>Movie information and images are provided by The Movie Database (TMDB). \
This product uses the TMDB API but is not endorsed or certified by TMDB.</p>\
<h2>Explore</h2><p>Search by title, browse by genre, or open any movie to see its cast, \
trailer and production details.</p>\
<a class=\"button\" href=\"/movies\">Start Exploring</a></div>",
    )
}

fn field_error(errors: &[FieldError], field: ContactField) -> String {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| format!("<p class=\"error\" id=\"{}-error\">{}</p>", field.as_str(), e.message))
        .unwrap_or_default()
}

fn input(label: &str, field: ContactField, kind: &str, value: &str, errors: &[FieldError]) -> String {
    let name = field.as_str();
    format!(
        "<label for=\"{name}\">{label}</label><input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\">{}",
        escape_html(value),
        field_error(errors, field)
    )
}

/// A sent form renders with cleared fields.
pub fn contact_page(form: &ContactForm, outcome: &ContactOutcome) -> String {
    let cleared = ContactForm::default();
    let (form, errors, notice) = match outcome {
        ContactOutcome::Blank => (form, &[][..], String::new()),
        ContactOutcome::Sent => (
            &cleared,
            &[][..],
            "<div class=\"notice success\" role=\"status\"><h2>Message Sent</h2>\
<p>Thanks for reaching out. We'll get back to you soon.</p></div>"
                .to_string(),
        ),
        ContactOutcome::Invalid(errors) => (
            form,
            errors.as_slice(),
            "<div class=\"notice error\" role=\"alert\">Please fix the highlighted fields.</div>"
                .to_string(),
        ),
    };
    let body = format!(
        "<div class=\"container contact\"><h1>Contact Us</h1>\
<p>Questions, suggestions or feedback? Send us a message.</p>{notice}\
<form method=\"post\" action=\"/contact\">{name}{email}{subject}\
<label for=\"message\">Message</label><textarea id=\"message\" name=\"message\" rows=\"6\">{message}</textarea>{message_error}\
<button type=\"submit\">Send Message</button></form></div>",
        name = input("Name", ContactField::Name, "text", &form.name, errors),
        email = input("Email", ContactField::Email, "email", &form.email, errors),
        subject = input("Subject", ContactField::Subject, "text", &form.subject, errors),
        message = escape_html(&form.message),
        message_error = field_error(errors, ContactField::Message),
    );
    layout("Contact", NavItem::Contact, &body)
}

pub fn not_found_page(path: &str) -> String {
    layout(
        "Page not found",
        NavItem::Other,
        &format!(
            "<div class=\"container notice\"><h1>404</h1><p>Oops! Page not found</p>\
<p><code>{}</code></p><a class=\"button\" href=\"/\">Return to Home</a></div>",
            escape_html(path)
        ),
    )
}
