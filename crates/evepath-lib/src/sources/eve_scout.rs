//! EVE-Scout public signatures: wormholes into and out of Thera and Turnur.
//!
//! The feed is a flat list of bidirectional connections, each naming a hub
//! (`out_system_*`) and the system the wormhole leads to (`in_system_*`).
//! Nodes are synthesized for both endpoints and one edge is added per
//! direction.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{bounded, build_client, decode_json};
use crate::cache::SourceCache;
use crate::config::EveScoutConfig;
use crate::error::Result;
use crate::systems::{
    ConnectionDetails, EdgeSource, NodeMap, SecurityStatus, SystemEdge, SystemId, SystemNode,
};

const SOURCE_NAME: &str = "eve-scout";

/// Solar system id of Thera.
pub const THERA_SYSTEM_ID: SystemId = 31000005;
/// Solar system id of Turnur.
pub const TURNUR_SYSTEM_ID: SystemId = 30002086;

const THERA_SECURITY: SecurityStatus = -0.99;
const TURNUR_SECURITY: SecurityStatus = 0.387;
/// Security assigned to every non-hub endpoint; the feed does not publish it.
const DEFAULT_SECURITY: SecurityStatus = -0.99;

/// One connection record from the EVE-Scout signatures feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EveScoutConnection {
    pub out_system_id: SystemId,
    pub out_system_name: String,
    #[serde(default)]
    pub out_signature: Option<String>,
    pub in_system_id: SystemId,
    pub in_system_name: String,
    #[serde(default)]
    pub in_signature: Option<String>,
    #[serde(default)]
    pub in_system_class: Option<String>,
    #[serde(default)]
    pub wh_type: Option<String>,
    #[serde(default)]
    pub max_ship_size: Option<String>,
    #[serde(default)]
    pub remaining_hours: Option<f64>,
}

/// Cached client for the EVE-Scout feed.
#[derive(Debug)]
pub struct EveScoutSource {
    client: Client,
    config: EveScoutConfig,
    timeout: Duration,
    cache: SourceCache,
}

impl EveScoutSource {
    pub fn new(
        config: EveScoutConfig,
        timeout: Duration,
        freshness_window: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            config,
            timeout,
            cache: SourceCache::with_freshness_window(SOURCE_NAME, freshness_window),
        })
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Cached or freshly fetched hub connections.
    pub async fn fetch(&self) -> Arc<NodeMap> {
        self.cache.get_or_refresh(|| self.load()).await
    }

    async fn load(&self) -> Result<NodeMap> {
        let connections: Vec<EveScoutConnection> = bounded(SOURCE_NAME, self.timeout, async {
            let response = self.client.get(&self.config.url).send().await?;
            decode_json(SOURCE_NAME, response).await
        })
        .await?;
        Ok(map_connections(&connections))
    }
}

/// Security status the feed implies for an endpoint.
pub fn endpoint_security(system_id: SystemId) -> SecurityStatus {
    match system_id {
        TURNUR_SYSTEM_ID => TURNUR_SECURITY,
        THERA_SYSTEM_ID => THERA_SECURITY,
        _ => DEFAULT_SECURITY,
    }
}

/// Edge tag for a connection whose hub side is `hub_id`.
pub fn hub_edge_source(hub_id: SystemId) -> EdgeSource {
    if hub_id == TURNUR_SYSTEM_ID {
        EdgeSource::EveScoutTurnur
    } else {
        EdgeSource::EveScoutThera
    }
}

/// Convert feed records into nodes with one edge per direction.
///
/// The first record that mentions a system fixes its name and security.
pub fn map_connections(connections: &[EveScoutConnection]) -> NodeMap {
    let mut nodes = NodeMap::new();

    for wormhole in connections {
        let edge_source = hub_edge_source(wormhole.out_system_id);

        let outward = SystemEdge::new(
            wormhole.out_system_id,
            wormhole.out_system_name.clone(),
            endpoint_security(wormhole.out_system_id),
            edge_source,
        )
        .with_details(details(
            wormhole,
            wormhole.in_signature.as_deref(),
            wormhole.out_signature.as_deref(),
        ));

        let inward = SystemEdge::new(
            wormhole.in_system_id,
            wormhole.in_system_name.clone(),
            endpoint_security(wormhole.in_system_id),
            edge_source,
        )
        .with_details(details(
            wormhole,
            wormhole.out_signature.as_deref(),
            wormhole.in_signature.as_deref(),
        ));

        nodes
            .entry(wormhole.in_system_id)
            .or_insert_with(|| {
                SystemNode::new(
                    wormhole.in_system_id,
                    wormhole.in_system_name.clone(),
                    endpoint_security(wormhole.in_system_id),
                )
            })
            .system_edges
            .push(outward);

        nodes
            .entry(wormhole.out_system_id)
            .or_insert_with(|| {
                SystemNode::new(
                    wormhole.out_system_id,
                    wormhole.out_system_name.clone(),
                    endpoint_security(wormhole.out_system_id),
                )
            })
            .system_edges
            .push(inward);
    }

    nodes
}

fn details(
    wormhole: &EveScoutConnection,
    signature_src: Option<&str>,
    signature_dst: Option<&str>,
) -> ConnectionDetails {
    ConnectionDetails {
        signature_src: signature_src.map(str::to_string),
        signature_dst: signature_dst.map(str::to_string),
        wormhole_type_src: wormhole.wh_type.clone(),
        wormhole_type_dst: wormhole.wh_type.clone(),
        max_ship_size: wormhole.max_ship_size.clone(),
        ..ConnectionDetails::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(
        out_id: SystemId,
        out_name: &str,
        in_id: SystemId,
        in_name: &str,
    ) -> EveScoutConnection {
        EveScoutConnection {
            out_system_id: out_id,
            out_system_name: out_name.to_string(),
            out_signature: Some("ABC-123".to_string()),
            in_system_id: in_id,
            in_system_name: in_name.to_string(),
            in_signature: Some("XYZ-987".to_string()),
            in_system_class: Some("c2".to_string()),
            wh_type: Some("Q063".to_string()),
            max_ship_size: Some("medium".to_string()),
            remaining_hours: Some(12.0),
        }
    }

    #[test]
    fn thera_connection_creates_edges_both_ways() {
        let nodes = map_connections(&[connection(THERA_SYSTEM_ID, "Thera", 30000142, "Jita")]);

        let jita = &nodes[&30000142];
        assert_eq!(jita.system_security_status, DEFAULT_SECURITY);
        assert_eq!(jita.system_edges.len(), 1);
        assert_eq!(jita.system_edges[0].system_id, THERA_SYSTEM_ID);
        assert_eq!(jita.system_edges[0].edge_source, EdgeSource::EveScoutThera);

        let thera = &nodes[&THERA_SYSTEM_ID];
        assert_eq!(thera.system_security_status, THERA_SECURITY);
        assert_eq!(thera.system_edges[0].system_id, 30000142);
        assert_eq!(thera.system_edges[0].edge_source, EdgeSource::EveScoutThera);
    }

    #[test]
    fn turnur_connections_use_turnur_tag_and_security() {
        let nodes =
            map_connections(&[connection(TURNUR_SYSTEM_ID, "Turnur", 31000123, "J123456")]);

        let turnur = &nodes[&TURNUR_SYSTEM_ID];
        assert_eq!(turnur.system_security_status, TURNUR_SECURITY);
        assert_eq!(turnur.system_edges[0].edge_source, EdgeSource::EveScoutTurnur);

        let edge_to_turnur = &nodes[&31000123].system_edges[0];
        assert_eq!(edge_to_turnur.system_security_status, TURNUR_SECURITY);
        assert_eq!(edge_to_turnur.edge_source, EdgeSource::EveScoutTurnur);
    }

    #[test]
    fn hub_accumulates_edges_from_every_record() {
        let nodes = map_connections(&[
            connection(THERA_SYSTEM_ID, "Thera", 1, "One"),
            connection(THERA_SYSTEM_ID, "Thera", 2, "Two"),
            connection(THERA_SYSTEM_ID, "Thera", 3, "Three"),
        ]);

        let targets: Vec<SystemId> = nodes[&THERA_SYSTEM_ID]
            .system_edges
            .iter()
            .map(|edge| edge.system_id)
            .collect();
        assert_eq!(targets, vec![1, 2, 3]);
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn signatures_are_oriented_per_direction() {
        let nodes = map_connections(&[connection(THERA_SYSTEM_ID, "Thera", 1, "One")]);

        let outward = nodes[&1].system_edges[0].details.as_ref().unwrap();
        assert_eq!(outward.signature_src.as_deref(), Some("XYZ-987"));
        assert_eq!(outward.signature_dst.as_deref(), Some("ABC-123"));

        let inward = nodes[&THERA_SYSTEM_ID].system_edges[0].details.as_ref().unwrap();
        assert_eq!(inward.signature_src.as_deref(), Some("ABC-123"));
        assert_eq!(inward.max_ship_size.as_deref(), Some("medium"));
    }

    #[test]
    fn feed_records_deserialize_with_unknown_fields() {
        let json = r#"[{
            "id": "1337",
            "created_at": "2025-01-01T00:00:00.000Z",
            "signature_type": "wormhole",
            "out_system_id": 31000005,
            "out_system_name": "Thera",
            "out_signature": "ABC-123",
            "in_system_id": 30000142,
            "in_system_name": "Jita",
            "in_signature": "XYZ-987",
            "wh_type": "Q063",
            "max_ship_size": "medium",
            "remaining_hours": 14
        }]"#;

        let records: Vec<EveScoutConnection> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].in_system_name, "Jita");
        assert_eq!(records[0].remaining_hours, Some(14.0));
    }
}
