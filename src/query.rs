//! Keyed query cache with in-flight deduplication.
//!
//! Concurrent callers asking for the same [`QueryKey`] share one fetch. A
//! successful value is kept until it goes stale; a failure is handed to every
//! waiting caller and then forgotten, so the next request tries again.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::tmdb::{Feed, TmdbError};

pub type QueryError = Arc<TmdbError>;

/// Logical query name plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Trending,
    NowPlaying,
    TopRated,
    Upcoming,
    Search(String),
    Genre(u32),
    Movie(u32),
    Genres,
}

impl From<Feed> for QueryKey {
    fn from(feed: Feed) -> Self {
        match feed {
            Feed::Trending => QueryKey::Trending,
            Feed::NowPlaying => QueryKey::NowPlaying,
            Feed::TopRated => QueryKey::TopRated,
            Feed::Upcoming => QueryKey::Upcoming,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Trending => f.write_str("trending"),
            QueryKey::NowPlaying => f.write_str("now-playing"),
            QueryKey::TopRated => f.write_str("top-rated"),
            QueryKey::Upcoming => f.write_str("upcoming"),
            QueryKey::Search(text) => write!(f, "search:{text}"),
            QueryKey::Genre(id) => write!(f, "genre:{id}"),
            QueryKey::Movie(id) => write!(f, "movie:{id}"),
            QueryKey::Genres => f.write_str("genres"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryState<V> {
    Loading,
    Error(QueryError),
    Success(V),
}

impl<V> QueryState<V> {
    pub fn from_result(result: Result<V, QueryError>) -> Self {
        match result {
            Ok(value) => QueryState::Success(value),
            Err(e) => QueryState::Error(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, QueryError>>>;

enum Slot<V> {
    InFlight(SharedFetch<V>),
    Ready { value: V, fetched_at: Instant },
}

pub struct QueryCache<V> {
    slots: Mutex<HashMap<QueryKey, Slot<V>>>,
    ttl: Duration,
}

impl<V> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached value for `key` if it is still fresh. Never fetches.
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        let mut slots = self.lock();
        match slots.get(key) {
            Some(Slot::Ready { value, fetched_at }) => {
                if fetched_at.elapsed() < self.ttl {
                    return Some(value.clone());
                }
            }
            _ => return None,
        }
        slots.remove(key);
        None
    }

    /// `Success` when `key` is cached and fresh, `Loading` otherwise.
    pub fn snapshot(&self, key: &QueryKey) -> QueryState<V> {
        match self.peek(key) {
            Some(value) => QueryState::Success(value),
            None => QueryState::Loading,
        }
    }

    /// Resolves `key`, calling `fetcher` only when no fresh value and no
    /// in-flight fetch exist for it.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, TmdbError>> + Send + 'static,
    {
        let shared = {
            let mut slots = self.lock();
            let joined = match slots.get(&key) {
                Some(Slot::Ready { value, fetched_at }) if fetched_at.elapsed() < self.ttl => {
                    return QueryState::Success(value.clone());
                }
                Some(Slot::InFlight(shared)) => Some(shared.clone()),
                _ => None,
            };
            match joined {
                Some(shared) => {
                    debug!(%key, "joining in-flight query");
                    shared
                }
                None => {
                    evict_stale(&mut slots, self.ttl);
                    debug!(%key, "issuing query");
                    let shared = fetcher().map(|r| r.map_err(Arc::new)).boxed().shared();
                    slots.insert(key.clone(), Slot::InFlight(shared.clone()));
                    shared
                }
            }
        };

        let result = shared.clone().await;
        self.settle(&key, &shared, &result);
        QueryState::from_result(result)
    }

    // Any caller that saw the fetch complete may settle it; only the first
    // one still finds its own in-flight slot.
    fn settle(&self, key: &QueryKey, shared: &SharedFetch<V>, result: &Result<V, QueryError>) {
        let mut slots = self.lock();
        let ours = matches!(slots.get(key), Some(Slot::InFlight(current)) if current.ptr_eq(shared));
        if !ours {
            return;
        }
        match result {
            Ok(value) => {
                slots.insert(
                    key.clone(),
                    Slot::Ready {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(_) => {
                slots.remove(key);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

// Runs on every miss, so the map only holds fresh values and in-flight fetches.
fn evict_stale<V>(slots: &mut HashMap<QueryKey, Slot<V>>, ttl: Duration) {
    slots.retain(|_, slot| match slot {
        Slot::Ready { fetched_at, .. } => fetched_at.elapsed() < ttl,
        Slot::InFlight(_) => true,
    });
}
