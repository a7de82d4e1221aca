//! Route planning endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::problem::{from_lib_error, ProblemDetails};
use crate::request::{actor_id, extract_or_generate_request_id, PathRequest, Validate};
use crate::state::AppState;

/// Handle `POST /api/v1/path`.
///
/// Responds with the ordered systems of the shortest route, or `[]` when the
/// goal cannot be reached. Invalid input yields an RFC 9457 problem.
pub async fn path_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PathRequest>, JsonRejection>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(request_id = %request_id, error = %rejection, "rejected path request body");
            return ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
                .into_response();
        }
    };

    info!(
        request_id = %request_id,
        start = ?request.start_node_id,
        end = ?request.end_node_id,
        avoided = request.avoid_node_ids.len(),
        "handling path request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        return (*problem).into_response();
    }

    let actor = actor_id(&headers);
    match state
        .planner()
        .plan_route(&request.to_route_request(), actor.as_deref())
        .await
    {
        Ok(route) => {
            info!(
                request_id = %request_id,
                systems = route.len(),
                "path request completed"
            );
            Json(route).into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "route planning failed");
            from_lib_error(&e, request_id.as_str()).into_response()
        }
    }
}
