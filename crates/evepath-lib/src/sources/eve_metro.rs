//! EVE Metro connection feed.
//!
//! EVE Metro already publishes nodes in the routing shape, so the
//! transformation is a field-for-field remap. Access is scoped to the
//! character, corporation or alliance the API key was issued for.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{bounded, build_client, decode_json};
use crate::cache::SourceCache;
use crate::config::EveMetroConfig;
use crate::error::{Error, Result};
use crate::systems::{
    ConnectionDetails, EdgeSource, NodeMap, SecurityStatus, SystemEdge, SystemId, SystemNode,
};

const SOURCE_NAME: &str = "eve-metro";

const API_KEY_HEADER: &str = "x-api-key";

/// Identity the connections are requested for. Unset ids are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EveMetroRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<i64>,
}

impl From<&EveMetroConfig> for EveMetroRequest {
    fn from(config: &EveMetroConfig) -> Self {
        Self {
            character_id: config.character_id,
            corporation_id: config.corporation_id,
            alliance_id: config.alliance_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EveMetroResponse {
    #[serde(default)]
    pub access: bool,
    #[serde(default)]
    pub connections: Option<Vec<EveMetroConnection>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EveMetroConnection {
    pub system_id: SystemId,
    pub system_name: String,
    pub system_security_status: SecurityStatus,
    #[serde(default)]
    pub system_edges: Vec<EveMetroEdge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EveMetroEdge {
    pub solar_system_id_dst: SystemId,
    pub solar_system_name_dst: String,
    pub solar_system_sec_dst: SecurityStatus,
    #[serde(default)]
    pub signature_src: Option<String>,
    #[serde(default)]
    pub signature_dst: Option<String>,
    #[serde(default)]
    pub wormhole_type_src: Option<String>,
    #[serde(default)]
    pub wormhole_type_dst: Option<String>,
    #[serde(default)]
    pub wormhole_mass: Option<String>,
    #[serde(default)]
    pub wormhole_eol: Option<String>,
}

/// Cached client for the EVE Metro API.
#[derive(Debug)]
pub struct EveMetroSource {
    client: Client,
    config: EveMetroConfig,
    timeout: Duration,
    cache: SourceCache,
}

impl EveMetroSource {
    pub fn new(
        config: EveMetroConfig,
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

    /// Cached or freshly fetched connections visible to the configured identity.
    pub async fn fetch(&self) -> Arc<NodeMap> {
        self.cache.get_or_refresh(|| self.load()).await
    }

    async fn load(&self) -> Result<NodeMap> {
        let body = EveMetroRequest::from(&self.config);
        let response: EveMetroResponse = bounded(SOURCE_NAME, self.timeout, async {
            let response = self
                .client
                .post(&self.config.url)
                .header(API_KEY_HEADER, &self.config.api_key)
                .json(&body)
                .send()
                .await?;
            decode_json(SOURCE_NAME, response).await
        })
        .await?;
        map_response(response)
    }
}

/// Remap an API response, treating a refused or empty answer as denied access.
pub fn map_response(response: EveMetroResponse) -> Result<NodeMap> {
    match response.connections {
        Some(connections) if response.access => Ok(map_connections(connections)),
        _ => Err(Error::UpstreamAccessDenied {
            source_name: SOURCE_NAME,
        }),
    }
}

fn map_connections(connections: Vec<EveMetroConnection>) -> NodeMap {
    connections
        .into_iter()
        .map(|connection| {
            let mut node = SystemNode::new(
                connection.system_id,
                connection.system_name,
                connection.system_security_status,
            );
            node.system_edges = connection.system_edges.into_iter().map(map_edge).collect();
            (node.system_id, node)
        })
        .collect()
}

fn map_edge(edge: EveMetroEdge) -> SystemEdge {
    SystemEdge::new(
        edge.solar_system_id_dst,
        edge.solar_system_name_dst,
        edge.solar_system_sec_dst,
        EdgeSource::EveMetro,
    )
    .with_details(ConnectionDetails {
        signature_src: edge.signature_src,
        signature_dst: edge.signature_dst,
        wormhole_type_src: edge.wormhole_type_src,
        wormhole_type_dst: edge.wormhole_type_dst,
        wormhole_mass: edge.wormhole_mass,
        wormhole_eol: edge.wormhole_eol,
        ..ConnectionDetails::default()
    })
}
