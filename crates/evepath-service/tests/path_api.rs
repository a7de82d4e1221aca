use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use evepath_lib::{
    EveMetroConfig, EveMetroSource, RoutePlanner, SourcesConfig, StaticTopology, SystemId,
    TracingUsageSink,
};
use evepath_service::{router, AppState, PROBLEM_INVALID_REQUEST};
use http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JITA: SystemId = 30000142;
const MAURASI: SystemId = 30000140;
const URLEN: SystemId = 30000139;
const AMARR: SystemId = 30002187;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/systems.json")
}

fn static_server() -> TestServer {
    let state = AppState::load(fixture_path(), &SourcesConfig::default())
        .expect("fixture state loads");
    TestServer::new(router(state)).expect("test server starts")
}

fn route_ids(body: &Value) -> Vec<SystemId> {
    body.as_array()
        .expect("route is an array")
        .iter()
        .map(|node| node["systemId"].as_i64().expect("systemId is numeric"))
        .collect()
}

#[tokio::test]
async fn returns_shortest_static_route() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .json(&json!({ "startNodeId": JITA, "endNodeId": URLEN }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(route_ids(&body), vec![JITA, MAURASI, URLEN]);
    assert_eq!(body[0]["systemName"], "Jita");
    assert_eq!(body[0]["systemEdges"][0]["edgeSource"], "k-space");
}

#[tokio::test]
async fn accepts_legacy_field_names() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .json(&json!({ "from": JITA, "to": MAURASI }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(route_ids(&response.json()), vec![JITA, MAURASI]);
}

#[tokio::test]
async fn unreachable_goal_yields_empty_array() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .json(&json!({ "startNodeId": JITA, "endNodeId": AMARR }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn avoided_connector_yields_empty_array() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .json(&json!({
            "startNodeId": JITA,
            "endNodeId": URLEN,
            "avoidNodeIds": [MAURASI],
        }))
        .await;

    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn non_positive_id_is_a_problem() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-neg"),
        )
        .json(&json!({ "startNodeId": -5, "endNodeId": URLEN }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.header("content-type"),
        HeaderValue::from_static("application/problem+json")
    );
    let problem: Value = response.json();
    assert_eq!(problem["type"], PROBLEM_INVALID_REQUEST);
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["instance"], "req-neg");
    assert!(problem["detail"].as_str().unwrap().contains("startNodeId"));
}

#[tokio::test]
async fn missing_end_is_a_problem() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .json(&json!({ "startNodeId": JITA }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert!(problem["detail"].as_str().unwrap().contains("endNodeId"));
}

#[tokio::test]
async fn malformed_body_is_a_problem() {
    let server = static_server();
    let response = server
        .post("/api/v1/path")
        .add_header(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        )
        .text("{\"startNodeId\": ")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(problem["type"], PROBLEM_INVALID_REQUEST);
    assert!(problem["instance"].is_string());
}

#[tokio::test]
async fn health_probes_report_state() {
    let server = static_server();

    let live = server.get("/health/live").await;
    assert_eq!(live.status_code(), StatusCode::OK);
    assert_eq!(live.json::<Value>()["status"], "ok");

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    let body: Value = ready.json();
    assert_eq!(body["systems_loaded"], 12);
    assert_eq!(body["sources_configured"], json!([]));
}

#[tokio::test]
async fn empty_topology_is_not_ready() {
    let planner = RoutePlanner::new(
        Arc::new(StaticTopology::default()),
        Vec::new(),
        Arc::new(TracingUsageSink),
    );
    let server = TestServer::new(router(AppState::from_planner(planner))).unwrap();

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metro_connection_flows_through_and_can_be_disabled() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": true,
            "connections": [{
                "systemId": URLEN,
                "systemName": "Urlen",
                "systemSecurityStatus": 0.9,
                "systemEdges": [{
                    "solarSystemIdDst": AMARR,
                    "solarSystemNameDst": "Amarr",
                    "solarSystemSecDst": 1.0
                }]
            }]
        })))
        .mount(&upstream)
        .await;

    let config = EveMetroConfig {
        url: format!("{}/api/connections", upstream.uri()),
        api_key: "metro-key".to_string(),
        character_id: None,
        corporation_id: None,
        alliance_id: None,
    };
    let metro = EveMetroSource::new(config, Duration::from_secs(5), Duration::from_secs(60))
        .expect("client builds");
    let topology =
        Arc::new(StaticTopology::load(&fixture_path()).expect("fixture systems.json loads"));
    let planner = RoutePlanner::new(topology, vec![metro.into()], Arc::new(TracingUsageSink));
    let server = TestServer::new(router(AppState::from_planner(planner))).unwrap();

    let ready: Value = server.get("/health/ready").await.json();
    assert_eq!(
        ready["sources_configured"],
        json!([{ "name": "eve-metro", "freshness_window_secs": 60 }])
    );

    let response = server
        .post("/api/v1/path")
        .json(&json!({ "startNodeId": JITA, "endNodeId": AMARR }))
        .await;
    let body: Value = response.json();
    assert_eq!(route_ids(&body), vec![JITA, MAURASI, URLEN, AMARR]);
    let bridge = body[2]["systemEdges"]
        .as_array()
        .unwrap()
        .iter()
        .find(|edge| edge["systemId"] == AMARR)
        .expect("metro edge present")
        .clone();
    assert_eq!(bridge["edgeSource"], "eve-metro");

    let response = server
        .post("/api/v1/path")
        .json(&json!({
            "startNodeId": JITA,
            "endNodeId": AMARR,
            "sourceFlags": { "eveMetro": false },
        }))
        .await;
    assert_eq!(response.json::<Value>(), json!([]));
}
