//! Request types and validation for the path endpoint.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use evepath_lib::{RouteRequest, SourceFlags, SystemId};

use crate::problem::ProblemDetails;

/// Upper bound on the avoid list of a single request.
pub const MAX_AVOIDED_SYSTEMS: usize = 1000;

/// Header carrying the caller identity forwarded by the front end.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Trait for request validation.
pub trait Validate {
    /// Validate the request. The `request_id` becomes the `instance` of any
    /// returned `ProblemDetails`.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/path`.
///
/// Identifiers are optional here so a missing field produces a problem
/// response instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequest {
    #[serde(default, alias = "from")]
    pub start_node_id: Option<SystemId>,

    #[serde(default, alias = "to")]
    pub end_node_id: Option<SystemId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid_node_ids: Vec<SystemId>,

    #[serde(default)]
    pub source_flags: SourceFlags,
}

impl PathRequest {
    /// Library request for a validated body.
    pub fn to_route_request(&self) -> RouteRequest {
        RouteRequest::new(
            self.start_node_id.unwrap_or_default(),
            self.end_node_id.unwrap_or_default(),
        )
        .avoiding(self.avoid_node_ids.iter().copied())
        .with_sources(self.source_flags)
    }
}

impl Validate for PathRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        for (field, value) in [
            ("startNodeId", self.start_node_id),
            ("endNodeId", self.end_node_id),
        ] {
            match value {
                None => {
                    return Err(Box::new(ProblemDetails::bad_request(
                        format!("The '{field}' field is required"),
                        request_id,
                    )))
                }
                Some(id) if id <= 0 => {
                    return Err(Box::new(ProblemDetails::bad_request(
                        format!("The '{field}' field must be a positive system id"),
                        request_id,
                    )))
                }
                Some(_) => {}
            }
        }

        if self.avoid_node_ids.len() > MAX_AVOIDED_SYSTEMS {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("The 'avoidNodeIds' field cannot exceed {MAX_AVOIDED_SYSTEMS} entries"),
                request_id,
            )));
        }

        Ok(())
    }
}

/// Request correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new time-sortable UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Use the caller's `X-Request-ID` when present, otherwise generate one.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| RequestId(s.to_string()))
        .unwrap_or_else(RequestId::generate)
}

/// Caller identity for usage events, if the front end supplied one.
pub fn actor_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACTOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
