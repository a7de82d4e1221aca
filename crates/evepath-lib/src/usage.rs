//! Usage events emitted after each completed route computation.
//!
//! Recording is fire-and-forget: a sink has no way to report failure back to
//! the planner, so it can never change the outcome of a request.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Kind of activity a [`UsageEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    PathCalculation,
}

impl UsageEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageEventKind::PathCalculation => "path_calculation",
        }
    }
}

impl fmt::Display for UsageEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded use of the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub event: UsageEventKind,
    /// Identifier of the caller, when the front end knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    pub details: Value,
}

impl UsageEvent {
    /// Event stamped with the current time.
    pub fn now(event: UsageEventKind, actor_id: Option<String>, details: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            actor_id,
            details,
        }
    }
}

/// Destination for usage events.
///
/// `record` runs inline before a route is returned, so implementations must
/// not block: a sink that ships events over the network should queue them
/// (for example on a channel drained by a spawned task) and return at once.
pub trait UsageSink: Send + Sync {
    fn record(&self, event: UsageEvent);
}

/// Sink that writes each event as a structured `tracing` record under the
/// `evepath::usage` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUsageSink;

impl UsageSink for TracingUsageSink {
    fn record(&self, event: UsageEvent) {
        info!(
            target: "evepath::usage",
            event = %event.event,
            timestamp = %event.timestamp.to_rfc3339(),
            actor_id = event.actor_id.as_deref().unwrap_or("anonymous"),
            details = %event.details,
            "usage event"
        );
    }
}
