//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// A dynamic source as reported by the readiness probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub name: String,
    /// How long a successful fetch is served before going upstream again.
    pub freshness_window_secs: u64,
}

/// Body of `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub systems_loaded: Option<usize>,

    /// Dynamic sources the planner was built with, in merge order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_configured: Option<Vec<SourceStatus>>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: None,
            sources_configured: None,
        }
    }

    pub fn ready(service: &str, version: &str, systems: usize, sources: Vec<SourceStatus>) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: Some(systems),
            sources_configured: Some(sources),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            systems_loaded: None,
            sources_configured: None,
        }
    }
}

/// `GET /health/live`. Answers without touching the planner.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`. Ready once the static topology holds a system;
/// upstreams are not contacted.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let systems = state.systems_loaded();
    if systems == 0 {
        let status = HealthStatus::not_ready(service, version, "no systems loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let sources = state
        .planner()
        .sources()
        .iter()
        .map(|source| SourceStatus {
            name: source.kind().as_str().to_string(),
            freshness_window_secs: source.cache().freshness_window().as_secs(),
        })
        .collect();
    let status = HealthStatus::ready(service, version, systems, sources);
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alive_omits_readiness_fields() {
        let json = serde_json::to_value(HealthStatus::alive("svc", "1.0.0")).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("systems_loaded").is_none());
        assert!(json.get("sources_configured").is_none());
    }

    #[test]
    fn ready_reports_counts() {
        let scout = SourceStatus {
            name: "eve-scout".to_string(),
            freshness_window_secs: 60,
        };
        let status = HealthStatus::ready("svc", "1.0.0", 12, vec![scout.clone()]);
        assert_eq!(status.systems_loaded, Some(12));
        assert_eq!(status.sources_configured.unwrap(), vec![scout]);
    }

    #[test]
    fn not_ready_carries_reason() {
        let status = HealthStatus::not_ready("svc", "1.0.0", "no systems loaded");
        assert_eq!(status.status, "not_ready: no systems loaded");
    }
}
