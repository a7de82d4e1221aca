use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier for a solar system.
pub type SystemId = i64;

/// Security status of a system, roughly in the range `-1.0..=1.0`.
pub type SecurityStatus = f64;

/// Node-id keyed collection of systems produced by a single source.
pub type NodeMap = HashMap<SystemId, SystemNode>;

/// Provenance of an edge in the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeSource {
    /// Stargate connection from the static dataset.
    KSpace,
    /// Wormhole connection into or out of Thera, published by EVE-Scout.
    EveScoutThera,
    /// Wormhole connection into or out of Turnur, published by EVE-Scout.
    EveScoutTurnur,
    /// Wormhole mapped in a Tripwire mask.
    Tripwire,
    /// Wormhole published by EVE Metro.
    EveMetro,
}

impl EdgeSource {
    /// Stable identifier used in logs and serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeSource::KSpace => "k-space",
            EdgeSource::EveScoutThera => "eve-scout-thera",
            EdgeSource::EveScoutTurnur => "eve-scout-turnur",
            EdgeSource::Tripwire => "tripwire",
            EdgeSource::EveMetro => "eve-metro",
        }
    }

    /// `true` for edges that come from a dynamic wormhole source.
    pub fn is_wormhole(self) -> bool {
        !matches!(self, EdgeSource::KSpace)
    }
}

impl fmt::Display for EdgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wormhole metadata attached to dynamic edges.
///
/// Every field is optional because each source publishes a different subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_dst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wormhole_type_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wormhole_type_dst: Option<String>,
    /// Mass state, e.g. `stable` or `critical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wormhole_mass: Option<String>,
    /// Lifetime state, e.g. `stable` or `critical` (end of life).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wormhole_eol: Option<String>,
    /// Largest ship class allowed through, when the source reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ship_size: Option<String>,
    /// Free-form signature label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_name: Option<String>,
}

/// Directed edge to a destination system.
///
/// The destination name and security status are denormalized copies so the
/// presentation layer never has to look the destination up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEdge {
    pub system_id: SystemId,
    pub system_name: String,
    pub system_security_status: SecurityStatus,
    pub edge_source: EdgeSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ConnectionDetails>,
}

impl SystemEdge {
    /// Create an edge without wormhole metadata.
    pub fn new(
        system_id: SystemId,
        system_name: impl Into<String>,
        system_security_status: SecurityStatus,
        edge_source: EdgeSource,
    ) -> Self {
        Self {
            system_id,
            system_name: system_name.into(),
            system_security_status,
            edge_source,
            details: None,
        }
    }

    /// Attach wormhole metadata to the edge.
    pub fn with_details(mut self, details: ConnectionDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Solar system together with its outgoing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNode {
    pub system_id: SystemId,
    pub system_name: String,
    pub system_security_status: SecurityStatus,
    pub system_edges: Vec<SystemEdge>,
}

impl SystemNode {
    /// Create a node with no outgoing edges.
    pub fn new(
        system_id: SystemId,
        system_name: impl Into<String>,
        system_security_status: SecurityStatus,
    ) -> Self {
        Self {
            system_id,
            system_name: system_name.into(),
            system_security_status,
            system_edges: Vec::new(),
        }
    }
}
