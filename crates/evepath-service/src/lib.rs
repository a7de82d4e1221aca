//! HTTP surface for the wormhole-aware route planner.
//!
//! Handlers stay thin: they parse and validate the body, hand a
//! [`evepath_lib::RouteRequest`] to the shared [`evepath_lib::RoutePlanner`],
//! and format the result.
//!
//! # Endpoints
//!
//! - `POST /api/v1/path` - Shortest route between two systems
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

mod handlers;
mod health;
pub mod logging;
mod problem;
mod request;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::path_handler;
pub use health::{health_live, health_ready, HealthStatus, SourceStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{
    actor_id, extract_or_generate_request_id, PathRequest, RequestId, Validate, ACTOR_ID_HEADER,
    MAX_AVOIDED_SYSTEMS,
};
pub use state::{AppState, AppStateError};

/// Build the service router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/path", post(path_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
