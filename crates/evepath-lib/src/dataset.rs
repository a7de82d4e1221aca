//! Static k-space topology loaded from the pre-built systems table.
//!
//! The systems table is a JSON array produced once by an offline conversion
//! of the reference CSV. Each row names a system and lists the systems it is
//! connected to by stargate. Loading happens at startup; afterwards the
//! topology is read-only and every request reuses the same node map.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::systems::{EdgeSource, NodeMap, SecurityStatus, SystemEdge, SystemId, SystemNode};

/// Environment variable overriding the dataset location.
pub const DATASET_PATH_ENV: &str = "EVEPATH_SYSTEMS_PATH";

/// Dataset location used when no override is configured.
const DEFAULT_DATASET_PATH: &str = "data/systems.json";

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const FUZZY_MATCH_THRESHOLD: f64 = 0.8;

/// One row of the static systems table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSystem {
    pub solar_system_id: SystemId,
    pub solar_system_name: String,
    pub security: SecurityStatus,
    #[serde(rename = "regionID")]
    pub region_id: i64,
    pub wormhole_class_id: i64,
    #[serde(default)]
    pub connected_systems: Vec<SystemId>,
}

/// In-memory static topology.
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    systems: HashMap<SystemId, RawSystem>,
    name_to_id: HashMap<String, SystemId>,
    nodes: Arc<NodeMap>,
}

/// Resolve the dataset location from `EVEPATH_SYSTEMS_PATH`, falling back to
/// `data/systems.json` relative to the working directory.
pub fn default_dataset_path() -> PathBuf {
    env::var_os(DATASET_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH))
}

impl StaticTopology {
    /// Load the systems table from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::DatasetNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        })?;
        let records: Vec<RawSystem> =
            serde_json::from_str(&contents).map_err(|source| Error::DatasetParse {
                path: path.to_path_buf(),
                source,
            })?;

        let topology = Self::from_records(records);
        info!(
            path = %path.display(),
            systems = topology.len(),
            "loaded static topology"
        );
        Ok(topology)
    }

    /// Build the topology from already-parsed rows.
    ///
    /// Nodes are created first so that every edge can copy its destination's
    /// name and security status. Connections to unknown systems are skipped.
    pub fn from_records(records: Vec<RawSystem>) -> Self {
        let mut nodes: NodeMap = records
            .iter()
            .map(|system| {
                (
                    system.solar_system_id,
                    SystemNode::new(
                        system.solar_system_id,
                        system.solar_system_name.clone(),
                        system.security,
                    ),
                )
            })
            .collect();

        let systems: HashMap<SystemId, RawSystem> = records
            .into_iter()
            .map(|system| (system.solar_system_id, system))
            .collect();

        let mut skipped = 0usize;
        for system in systems.values() {
            let edges: Vec<SystemEdge> = system
                .connected_systems
                .iter()
                .filter_map(|target| match systems.get(target) {
                    Some(destination) => Some(SystemEdge::new(
                        destination.solar_system_id,
                        destination.solar_system_name.clone(),
                        destination.security,
                        EdgeSource::KSpace,
                    )),
                    None => {
                        skipped += 1;
                        None
                    }
                })
                .collect();
            if let Some(node) = nodes.get_mut(&system.solar_system_id) {
                node.system_edges = edges;
            }
        }
        if skipped > 0 {
            debug!(skipped, "ignored connections to systems missing from dataset");
        }

        let name_to_id = systems
            .values()
            .map(|system| (system.solar_system_name.clone(), system.solar_system_id))
            .collect();

        Self {
            systems,
            name_to_id,
            nodes: Arc::new(nodes),
        }
    }

    /// Baseline node map. Cloning the `Arc` is the only per-request cost.
    pub fn nodes(&self) -> Arc<NodeMap> {
        Arc::clone(&self.nodes)
    }

    /// Raw dataset row for a system.
    pub fn system(&self, id: SystemId) -> Option<&RawSystem> {
        self.systems.get(&id)
    }

    /// Number of systems in the dataset.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// `true` when no systems were loaded.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Lookup a system identifier by its case-sensitive name.
    pub fn system_id_by_name(&self, name: &str) -> Option<SystemId> {
        self.name_to_id.get(name).copied()
    }

    /// Lookup a system name by identifier.
    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.systems
            .get(&id)
            .map(|system| system.solar_system_name.as_str())
    }

    /// Names similar to `query`, best match first, at most `limit` entries.
    pub fn fuzzy_system_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .name_to_id
            .keys()
            .map(|name| {
                (
                    strsim::jaro_winkler(&needle, &name.to_lowercase()),
                    name.as_str(),
                )
            })
            .filter(|(score, _)| *score >= FUZZY_MATCH_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Resolve either a numeric system id or an exact system name.
    pub fn resolve_system(&self, query: &str) -> Result<SystemId> {
        let trimmed = query.trim();
        if let Ok(id) = trimmed.parse::<SystemId>() {
            if self.systems.contains_key(&id) {
                return Ok(id);
            }
        }

        self.system_id_by_name(trimmed)
            .ok_or_else(|| Error::UnknownSystem {
                name: trimmed.to_string(),
                suggestions: self.fuzzy_system_matches(trimmed, 3),
            })
    }
}
