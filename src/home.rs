use rand::seq::IndexedRandom;
use rand::Rng;

use crate::models::Movie;

const HERO_MIN_RATING: f64 = 6.5;
const HERO_POOL: usize = 5;

/// The first few now-playing movies that have a backdrop and a decent rating.
pub fn hero_candidates(movies: &[Movie]) -> Vec<&Movie> {
    movies
        .iter()
        .filter(|m| {
            m.backdrop_path.as_deref().is_some_and(|p| !p.is_empty())
                && m.vote_average >= HERO_MIN_RATING
        })
        .take(HERO_POOL)
        .collect()
}

/// Random candidate, or the first movie when nothing qualifies.
pub fn pick_featured<'a, R: Rng + ?Sized>(movies: &'a [Movie], rng: &mut R) -> Option<&'a Movie> {
    let candidates = hero_candidates(movies);
    match candidates.choose(rng) {
        Some(movie) => Some(*movie),
        None => movies.first(),
    }
}
