//! Dynamic wormhole connection sources.
//!
//! Each source talks to one community service, normalizes the response into
//! [`SystemNode`](crate::SystemNode)s and caches the result in its own
//! [`SourceCache`]. Upstream failures never escape a source: they are logged
//! and the caller receives the last good map, or an empty one.
//!
//! Sources are independent of each other and safe to fetch concurrently.
//! The route planner iterates them in the fixed [`SourceKind`] priority order.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::cache::SourceCache;
use crate::config::SourcesConfig;
use crate::dataset::StaticTopology;
use crate::error::{Error, Result};
use crate::systems::NodeMap;

pub mod eve_metro;
pub mod eve_scout;
pub mod tripwire;

pub use eve_metro::EveMetroSource;
pub use eve_scout::EveScoutSource;
pub use tripwire::TripwireSource;

const USER_AGENT: &str = concat!("evepath/", env!("CARGO_PKG_VERSION"));

/// Dynamic sources in merge priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    EveScout,
    Tripwire,
    EveMetro,
}

impl SourceKind {
    /// All sources, highest merge priority first.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::EveScout,
        SourceKind::Tripwire,
        SourceKind::EveMetro,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::EveScout => "eve-scout",
            SourceKind::Tripwire => "tripwire",
            SourceKind::EveMetro => "eve-metro",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured dynamic source.
#[derive(Debug)]
pub enum DynamicSource {
    EveScout(EveScoutSource),
    Tripwire(TripwireSource),
    EveMetro(EveMetroSource),
}

impl DynamicSource {
    /// Build every source that has complete configuration, in priority order.
    ///
    /// Sources with missing configuration are skipped; requests that enable
    /// them simply receive no connections from that source.
    pub fn from_config(
        config: &SourcesConfig,
        topology: Arc<StaticTopology>,
    ) -> Result<Vec<DynamicSource>> {
        let mut sources = Vec::new();
        for kind in SourceKind::ALL {
            let source = match kind {
                SourceKind::EveScout => config
                    .eve_scout
                    .clone()
                    .map(|c| EveScoutSource::new(c, config.timeout, config.freshness_window))
                    .transpose()?
                    .map(DynamicSource::EveScout),
                SourceKind::Tripwire => config
                    .tripwire
                    .clone()
                    .map(|c| {
                        TripwireSource::new(
                            c,
                            Arc::clone(&topology),
                            config.timeout,
                            config.freshness_window,
                        )
                    })
                    .transpose()?
                    .map(DynamicSource::Tripwire),
                SourceKind::EveMetro => config
                    .eve_metro
                    .clone()
                    .map(|c| EveMetroSource::new(c, config.timeout, config.freshness_window))
                    .transpose()?
                    .map(DynamicSource::EveMetro),
            };
            match source {
                Some(source) => sources.push(source),
                None => info!(
                    source = %kind,
                    "source not configured, it will contribute no connections"
                ),
            }
        }
        Ok(sources)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DynamicSource::EveScout(_) => SourceKind::EveScout,
            DynamicSource::Tripwire(_) => SourceKind::Tripwire,
            DynamicSource::EveMetro(_) => SourceKind::EveMetro,
        }
    }

    /// Cached or freshly fetched connections of this source.
    pub async fn fetch(&self) -> Arc<NodeMap> {
        match self {
            DynamicSource::EveScout(source) => source.fetch().await,
            DynamicSource::Tripwire(source) => source.fetch().await,
            DynamicSource::EveMetro(source) => source.fetch().await,
        }
    }

    /// Cache backing this source.
    pub fn cache(&self) -> &SourceCache {
        match self {
            DynamicSource::EveScout(source) => source.cache(),
            DynamicSource::Tripwire(source) => source.cache(),
            DynamicSource::EveMetro(source) => source.cache(),
        }
    }
}

impl From<EveScoutSource> for DynamicSource {
    fn from(source: EveScoutSource) -> Self {
        DynamicSource::EveScout(source)
    }
}

impl From<TripwireSource> for DynamicSource {
    fn from(source: TripwireSource) -> Self {
        DynamicSource::Tripwire(source)
    }
}

impl From<EveMetroSource> for DynamicSource {
    fn from(source: EveMetroSource) -> Self {
        DynamicSource::EveMetro(source)
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .build()?)
}

/// Run an upstream exchange, converting an elapsed `timeout` into
/// [`Error::UpstreamTimeout`].
async fn bounded<T, F>(source_name: &'static str, timeout: Duration, exchange: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| Error::UpstreamTimeout {
            source_name,
            timeout,
        })?
}

/// Decode a JSON body, rejecting non-success statuses first.
async fn decode_json<T: DeserializeOwned>(
    source_name: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::UpstreamStatus {
            source_name,
            status,
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Accept identifiers published either as JSON strings or numbers.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
