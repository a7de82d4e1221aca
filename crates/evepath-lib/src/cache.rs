//! Time-bounded, single-flight cache owned by each dynamic source.
//!
//! A refresh holds the cache lock for the whole check → fetch → publish
//! sequence. Callers that queued behind a refresh take its outcome instead of
//! starting their own: the new map on success, the stale or empty map on
//! failure. One expiry costs at most one upstream call, and a hung upstream
//! delays each caller by at most one timeout.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::systems::NodeMap;

/// Maximum age of a cached fetch before the upstream is queried again.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CacheEntry {
    nodes: Arc<NodeMap>,
    fetched_at: Instant,
}

/// Last successful result of one source together with its fetch time.
#[derive(Debug)]
pub struct SourceCache {
    name: &'static str,
    freshness_window: Duration,
    entry: Mutex<Option<CacheEntry>>,
    /// Count of finished refresh attempts, successful or not. Only written
    /// while `entry` is locked.
    attempts: AtomicU64,
}

impl SourceCache {
    /// Create an empty cache using [`DEFAULT_FRESHNESS_WINDOW`].
    pub fn new(name: &'static str) -> Self {
        Self::with_freshness_window(name, DEFAULT_FRESHNESS_WINDOW)
    }

    pub fn with_freshness_window(name: &'static str, freshness_window: Duration) -> Self {
        Self {
            name,
            freshness_window,
            entry: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Return the cached map while it is fresh, otherwise run `refresh`.
    ///
    /// A successful refresh replaces the entry and its timestamp. A failed
    /// refresh is logged and leaves the entry untouched; the stale map is
    /// returned when one exists, an empty map otherwise. A caller that waited
    /// while another refresh ran never runs `refresh` itself.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Arc<NodeMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NodeMap>>,
    {
        let seen = self.attempts.load(Ordering::Acquire);
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.fetched_at.elapsed() < self.freshness_window {
                debug!(source = self.name, "serving cached connections");
                return Arc::clone(&entry.nodes);
            }
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            debug!(
                source = self.name,
                "refresh finished while waiting, serving its outcome"
            );
            return guard
                .as_ref()
                .map(|entry| Arc::clone(&entry.nodes))
                .unwrap_or_default();
        }

        let outcome = refresh().await;
        self.attempts.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(nodes) => {
                let nodes = Arc::new(nodes);
                debug!(
                    source = self.name,
                    systems = nodes.len(),
                    "refreshed connections"
                );
                *guard = Some(CacheEntry {
                    nodes: Arc::clone(&nodes),
                    fetched_at: Instant::now(),
                });
                nodes
            }
            Err(error) => match guard.as_ref() {
                Some(entry) => {
                    warn!(
                        source = self.name,
                        error = %error,
                        age_secs = entry.fetched_at.elapsed().as_secs(),
                        "refresh failed, serving stale connections"
                    );
                    Arc::clone(&entry.nodes)
                }
                None => {
                    warn!(
                        source = self.name,
                        error = %error,
                        "refresh failed and nothing is cached, serving no connections"
                    );
                    Arc::new(NodeMap::new())
                }
            },
        }
    }
}
