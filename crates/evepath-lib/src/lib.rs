//! evepath library entry points.
//!
//! This crate loads the static k-space topology, fetches wormhole
//! connections from the dynamic community sources (EVE-Scout, Tripwire,
//! EVE Metro) behind per-source caches, merges everything into a single
//! routing graph, and runs pathfinding over it. Higher-level consumers (CLI,
//! HTTP service) should only depend on the functions exported here instead
//! of reimplementing behavior.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod path;
pub mod routing;
pub mod sources;
pub mod systems;
pub mod usage;

pub use cache::{SourceCache, DEFAULT_FRESHNESS_WINDOW};
pub use config::{EveMetroConfig, EveScoutConfig, SourcesConfig, TripwireConfig};
pub use dataset::{default_dataset_path, RawSystem, StaticTopology};
pub use error::{Error, Result};
pub use graph::{merge_nodes, Graph};
pub use path::{find_route, find_route_dijkstra, PathConstraints};
pub use routing::{assemble_route, RoutePlanner, RouteRequest, SourceFlags};
pub use sources::{DynamicSource, EveMetroSource, EveScoutSource, SourceKind, TripwireSource};
pub use systems::{
    ConnectionDetails, EdgeSource, NodeMap, SecurityStatus, SystemEdge, SystemId, SystemNode,
};
pub use usage::{TracingUsageSink, UsageEvent, UsageEventKind, UsageSink};
