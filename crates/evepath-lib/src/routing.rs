use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::SourcesConfig;
use crate::dataset::StaticTopology;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::{find_route_dijkstra, PathConstraints};
use crate::sources::{DynamicSource, SourceKind};
use crate::systems::{NodeMap, SystemId, SystemNode};
use crate::usage::{TracingUsageSink, UsageEvent, UsageEventKind, UsageSink};

/// Per-request switches for the dynamic sources. Every source is enabled
/// unless the caller turns it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceFlags {
    pub eve_scout: bool,
    pub tripwire: bool,
    pub eve_metro: bool,
}

impl Default for SourceFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl SourceFlags {
    pub fn all() -> Self {
        Self {
            eve_scout: true,
            tripwire: true,
            eve_metro: true,
        }
    }

    /// Static topology only.
    pub fn none() -> Self {
        Self {
            eve_scout: false,
            tripwire: false,
            eve_metro: false,
        }
    }

    pub fn enables(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::EveScout => self.eve_scout,
            SourceKind::Tripwire => self.tripwire,
            SourceKind::EveMetro => self.eve_metro,
        }
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(alias = "from")]
    pub start_node_id: SystemId,
    #[serde(alias = "to")]
    pub end_node_id: SystemId,
    #[serde(default)]
    pub avoid_node_ids: Vec<SystemId>,
    #[serde(default)]
    pub source_flags: SourceFlags,
}

impl RouteRequest {
    /// Request with no avoided systems and every source enabled.
    pub fn new(start_node_id: SystemId, end_node_id: SystemId) -> Self {
        Self {
            start_node_id,
            end_node_id,
            avoid_node_ids: Vec::new(),
            source_flags: SourceFlags::all(),
        }
    }

    pub fn avoiding(mut self, systems: impl IntoIterator<Item = SystemId>) -> Self {
        self.avoid_node_ids = systems.into_iter().collect();
        self
    }

    pub fn with_sources(mut self, source_flags: SourceFlags) -> Self {
        self.source_flags = source_flags;
        self
    }

    /// Reject identifiers that can never name a system.
    pub fn validate(&self) -> Result<()> {
        if self.start_node_id <= 0 {
            return Err(Error::InvalidSystemId {
                field: "startNodeId",
                value: self.start_node_id,
            });
        }
        if self.end_node_id <= 0 {
            return Err(Error::InvalidSystemId {
                field: "endNodeId",
                value: self.end_node_id,
            });
        }
        Ok(())
    }

    fn constraints(&self) -> PathConstraints {
        PathConstraints::avoiding(self.avoid_node_ids.iter().copied())
    }
}

/// Expand a path of system ids into full nodes, dropping ids the graph does
/// not know.
pub fn assemble_route(graph: &Graph, path: &[SystemId]) -> Vec<SystemNode> {
    path.iter()
        .filter_map(|id| graph.node(*id).cloned())
        .collect()
}

/// Plans routes over the static topology plus the live wormhole sources.
///
/// Shared across requests; each source keeps its own cache so repeated
/// requests inside the freshness window do not reach the upstreams.
pub struct RoutePlanner {
    topology: Arc<StaticTopology>,
    sources: Vec<DynamicSource>,
    usage: Arc<dyn UsageSink>,
}

impl std::fmt::Debug for RoutePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("systems", &self.topology.len())
            .field(
                "sources",
                &self.sources.iter().map(DynamicSource::kind).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RoutePlanner {
    /// Sources are reordered into merge priority regardless of input order.
    pub fn new(
        topology: Arc<StaticTopology>,
        mut sources: Vec<DynamicSource>,
        usage: Arc<dyn UsageSink>,
    ) -> Self {
        sources.sort_by_key(DynamicSource::kind);
        Self {
            topology,
            sources,
            usage,
        }
    }

    /// Build every configured source and record usage through `tracing`.
    pub fn from_config(topology: Arc<StaticTopology>, config: &SourcesConfig) -> Result<Self> {
        let sources = DynamicSource::from_config(config, Arc::clone(&topology))?;
        Ok(Self::new(topology, sources, Arc::new(TracingUsageSink)))
    }

    pub fn topology(&self) -> &Arc<StaticTopology> {
        &self.topology
    }

    pub fn sources(&self) -> &[DynamicSource] {
        &self.sources
    }

    /// Fetch the enabled sources concurrently and merge them over the static
    /// topology in priority order.
    pub async fn build_graph(&self, flags: &SourceFlags) -> Graph {
        let enabled: Vec<&DynamicSource> = self
            .sources
            .iter()
            .filter(|source| flags.enables(source.kind()))
            .collect();

        let fetched = join_all(enabled.iter().map(|source| source.fetch())).await;

        let mut maps: Vec<Arc<NodeMap>> = Vec::with_capacity(fetched.len() + 1);
        maps.push(self.topology.nodes());
        for (source, nodes) in enabled.iter().zip(fetched) {
            debug!(source = %source.kind(), systems = nodes.len(), "merging source");
            maps.push(nodes);
        }

        Graph::merge(&maps)
    }

    /// Compute the shortest route for `request`.
    ///
    /// An empty route means the goal is unreachable under the request's
    /// constraints. `actor_id` is only used for the usage event.
    pub async fn plan_route(
        &self,
        request: &RouteRequest,
        actor_id: Option<&str>,
    ) -> Result<Vec<SystemNode>> {
        request.validate()?;

        let graph = self.build_graph(&request.source_flags).await;
        let start = request.start_node_id;
        let goal = request.end_node_id;

        let path = find_route_dijkstra(&graph, start, goal, &request.constraints())
            .inspect_err(|err| error!(error = %err, start, goal, "route reconstruction failed"))?
            .unwrap_or_default();
        let route = assemble_route(&graph, &path);

        info!(
            start,
            goal,
            systems = graph.len(),
            jumps = route.len().saturating_sub(1),
            found = !route.is_empty(),
            "route computed"
        );

        self.usage.record(UsageEvent::now(
            UsageEventKind::PathCalculation,
            actor_id.map(str::to_string),
            json!({
                "startNodeId": start,
                "endNodeId": goal,
                "avoidNodeIds": request.avoid_node_ids,
                "sourceFlags": request.source_flags,
                "routeLength": route.len(),
            }),
        ));

        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::dataset::RawSystem;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<UsageEvent>>);

    impl UsageSink for RecordingSink {
        fn record(&self, event: UsageEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn raw(id: SystemId, connected: &[SystemId]) -> RawSystem {
        RawSystem {
            solar_system_id: id,
            solar_system_name: format!("S{id}"),
            security: 0.5,
            region_id: 10000002,
            wormhole_class_id: 7,
            connected_systems: connected.to_vec(),
        }
    }

    fn planner(sink: Arc<dyn UsageSink>) -> RoutePlanner {
        let topology =
            StaticTopology::from_records(vec![raw(1, &[2]), raw(2, &[1, 3]), raw(3, &[2])]);
        RoutePlanner::new(Arc::new(topology), Vec::new(), sink)
    }

    fn ids(route: &[SystemNode]) -> Vec<SystemId> {
        route.iter().map(|node| node.system_id).collect()
    }

    #[tokio::test]
    async fn static_line_routes_through_connector() {
        let planner = planner(Arc::new(TracingUsageSink));
        let route = planner
            .plan_route(&RouteRequest::new(1, 3), None)
            .await
            .unwrap();
        assert_eq!(ids(&route), vec![1, 2, 3]);
        assert_eq!(route[1].system_name, "S2");
    }

    #[tokio::test]
    async fn avoided_connector_gives_empty_route() {
        let planner = planner(Arc::new(TracingUsageSink));
        let request = RouteRequest::new(1, 3).avoiding([2]);
        let route = planner.plan_route(&request, None).await.unwrap();
        assert!(route.is_empty());
    }

    #[tokio::test]
    async fn invalid_ids_are_rejected() {
        let planner = planner(Arc::new(TracingUsageSink));
        let err = planner
            .plan_route(&RouteRequest::new(0, 3), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSystemId { field: "startNodeId", .. }));
        assert!(err.is_client_error());

        let err = RouteRequest::new(1, -5).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidSystemId { field: "endNodeId", value: -5 }));
    }

    #[tokio::test]
    async fn usage_event_is_recorded_per_computation() {
        let sink = Arc::new(RecordingSink::default());
        let planner = planner(sink.clone());

        planner
            .plan_route(&RouteRequest::new(1, 3), Some("pilot-7"))
            .await
            .unwrap();

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, UsageEventKind::PathCalculation);
        assert_eq!(events[0].actor_id.as_deref(), Some("pilot-7"));
        assert_eq!(events[0].details["routeLength"], 3);
    }

    #[test]
    fn assemble_drops_unknown_ids() {
        let topology = StaticTopology::from_records(vec![raw(1, &[]), raw(2, &[])]);
        let graph = Graph::merge(&[topology.nodes()]);
        let route = assemble_route(&graph, &[1, 42, 2]);
        assert_eq!(ids(&route), vec![1, 2]);
    }

    #[test]
    fn request_accepts_legacy_aliases_and_defaults() {
        let request: RouteRequest = serde_json::from_str(r#"{"from": 1, "to": 3}"#).unwrap();
        assert_eq!(request, RouteRequest::new(1, 3));

        let request: RouteRequest = serde_json::from_str(
            r#"{"startNodeId": 1, "endNodeId": 3, "avoidNodeIds": [2],
                "sourceFlags": {"tripwire": false}}"#,
        )
        .unwrap();
        assert_eq!(request.avoid_node_ids, vec![2]);
        assert!(request.source_flags.eve_scout);
        assert!(!request.source_flags.enables(SourceKind::Tripwire));
    }
}
