//! Configuration for the dynamic connection sources.
//!
//! # Environment Variables
//!
//! - `EVE_SCOUT_PUBLIC_SIGNATURE_URL`: EVE-Scout public signatures endpoint
//! - `TRIPWIRE_HOST`, `TRIPWIRE_USER`, `TRIPWIRE_PASSWORD`: Tripwire instance and credentials
//! - `TRIPWIRE_MASK`: Tripwire mask to read (default: `0`)
//! - `EVE_METRO_API_URL`, `EVE_METRO_API_KEY`: EVE Metro endpoint and key
//! - `EVE_METRO_CHARACTER_ID`, `EVE_METRO_CORPORATION_ID`, `EVE_METRO_ALLIANCE_ID`: optional identity
//! - `EVEPATH_SOURCE_TIMEOUT_SECS`: per-source upstream timeout (default: 10)
//! - `EVEPATH_CACHE_TTL_SECS`: freshness window for cached connections (default: 60)
//!
//! A source whose required variables are missing or empty is left
//! unconfigured and contributes no connections.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_FRESHNESS_WINDOW;

/// Upstream timeout used when `EVEPATH_SOURCE_TIMEOUT_SECS` is not set.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tripwire mask read when `TRIPWIRE_MASK` is not set.
pub const DEFAULT_TRIPWIRE_MASK: &str = "0";

/// EVE-Scout public signature feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EveScoutConfig {
    pub url: String,
}

/// Tripwire instance, credentials, and mask.
#[derive(Clone, PartialEq, Eq)]
pub struct TripwireConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub mask: String,
}

impl std::fmt::Debug for TripwireConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripwireConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mask", &self.mask)
            .finish()
    }
}

/// EVE Metro endpoint, API key, and the identity the key is scoped to.
#[derive(Clone, PartialEq, Eq)]
pub struct EveMetroConfig {
    pub url: String,
    pub api_key: String,
    pub character_id: Option<i64>,
    pub corporation_id: Option<i64>,
    pub alliance_id: Option<i64>,
}

impl std::fmt::Debug for EveMetroConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EveMetroConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("character_id", &self.character_id)
            .field("corporation_id", &self.corporation_id)
            .field("alliance_id", &self.alliance_id)
            .finish()
    }
}

/// Settings for every dynamic source plus shared fetch limits.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcesConfig {
    pub eve_scout: Option<EveScoutConfig>,
    pub tripwire: Option<TripwireConfig>,
    pub eve_metro: Option<EveMetroConfig>,
    /// Bound on a single source's upstream exchange.
    pub timeout: Duration,
    /// Maximum age of a cached source result.
    pub freshness_window: Duration,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            eve_scout: None,
            tripwire: None,
            eve_metro: None,
            timeout: DEFAULT_SOURCE_TIMEOUT,
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
        }
    }
}

impl SourcesConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Tests use this instead of mutating the process environment so they
    /// can run in parallel.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str| value(key).and_then(|v| v.parse::<i64>().ok());
        let seconds = |key: &str, default: Duration| {
            value(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let eve_scout = value("EVE_SCOUT_PUBLIC_SIGNATURE_URL").map(|url| EveScoutConfig { url });

        let tripwire = match (
            value("TRIPWIRE_HOST"),
            value("TRIPWIRE_USER"),
            value("TRIPWIRE_PASSWORD"),
        ) {
            (Some(host), Some(username), Some(password)) => Some(TripwireConfig {
                host: host.trim_end_matches('/').to_string(),
                username,
                password,
                mask: value("TRIPWIRE_MASK").unwrap_or_else(|| DEFAULT_TRIPWIRE_MASK.to_string()),
            }),
            _ => None,
        };

        let eve_metro = match (value("EVE_METRO_API_URL"), value("EVE_METRO_API_KEY")) {
            (Some(url), Some(api_key)) => Some(EveMetroConfig {
                url,
                api_key,
                character_id: number("EVE_METRO_CHARACTER_ID"),
                corporation_id: number("EVE_METRO_CORPORATION_ID"),
                alliance_id: number("EVE_METRO_ALLIANCE_ID"),
            }),
            _ => None,
        };

        Self {
            eve_scout,
            tripwire,
            eve_metro,
            timeout: seconds("EVEPATH_SOURCE_TIMEOUT_SECS", DEFAULT_SOURCE_TIMEOUT),
            freshness_window: seconds("EVEPATH_CACHE_TTL_SECS", DEFAULT_FRESHNESS_WINDOW),
        }
    }
}
