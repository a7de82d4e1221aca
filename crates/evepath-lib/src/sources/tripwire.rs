//! Tripwire wormhole mapping.
//!
//! Tripwire publishes wormholes and signatures separately. A wormhole only
//! references its two signatures by id; each signature in turn names the
//! system it sits in. Joining the two lists yields the connection graph.
//! Links that cannot be fully resolved, or belong to another mask, are
//! dropped without error.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{bounded, build_client, decode_json, lenient_id};
use crate::cache::SourceCache;
use crate::config::TripwireConfig;
use crate::dataset::{RawSystem, StaticTopology};
use crate::error::Result;
use crate::systems::{ConnectionDetails, EdgeSource, NodeMap, SystemEdge, SystemId, SystemNode};

const SOURCE_NAME: &str = "tripwire";

/// Wormhole type code used for the exit side of a connection.
const EXIT_WORMHOLE_TYPE: &str = "K162";

/// Signature type that marks a wormhole signature.
const WORMHOLE_SIGNATURE_TYPE: &str = "wormhole";

/// A wormhole record linking two signatures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripwireWormhole {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(rename = "initialID", default, deserialize_with = "lenient_id")]
    pub initial_id: Option<String>,
    #[serde(rename = "secondaryID", default, deserialize_with = "lenient_id")]
    pub secondary_id: Option<String>,
    #[serde(rename = "type", default)]
    pub wormhole_type: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    /// Lifetime state, `stable` or `critical`.
    #[serde(default)]
    pub life: Option<String>,
    /// Mass state, `stable`, `destab` or `critical`.
    #[serde(default)]
    pub mass: Option<String>,
    #[serde(rename = "maskID", default, deserialize_with = "lenient_id")]
    pub mask_id: Option<String>,
}

/// A scanned signature located in one system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripwireSignature {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(rename = "signatureID", default)]
    pub signature_id: Option<String>,
    #[serde(rename = "systemID", default, deserialize_with = "lenient_id")]
    pub system_id: Option<String>,
    #[serde(rename = "type", default)]
    pub signature_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "maskID", default, deserialize_with = "lenient_id")]
    pub mask_id: Option<String>,
}

/// Tripwire returns either a JSON array or an object keyed by record id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Records<T> {
    List(Vec<T>),
    Keyed(BTreeMap<String, T>),
}

impl<T> Records<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Records::List(records) => records,
            Records::Keyed(records) => records.into_values().collect(),
        }
    }
}

/// Cached client for a Tripwire mask.
#[derive(Debug)]
pub struct TripwireSource {
    client: Client,
    config: TripwireConfig,
    topology: Arc<StaticTopology>,
    timeout: Duration,
    cache: SourceCache,
}

impl TripwireSource {
    /// The static topology supplies names and security for joined systems.
    pub fn new(
        config: TripwireConfig,
        topology: Arc<StaticTopology>,
        timeout: Duration,
        freshness_window: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            config,
            topology,
            timeout,
            cache: SourceCache::with_freshness_window(SOURCE_NAME, freshness_window),
        })
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Cached or freshly fetched mask connections.
    pub async fn fetch(&self) -> Arc<NodeMap> {
        self.cache.get_or_refresh(|| self.load()).await
    }

    async fn load(&self) -> Result<NodeMap> {
        let (wormholes, signatures) = bounded(SOURCE_NAME, self.timeout, async {
            tokio::try_join!(
                self.query::<TripwireWormhole>("/wormholes"),
                self.query::<TripwireSignature>("/signatures"),
            )
        })
        .await?;

        Ok(build_nodes(
            &wormholes,
            &signatures,
            &self.topology,
            &self.config.mask,
        ))
    }

    async fn query<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(format!("{}/api.php", self.config.host))
            .query(&[("q", resource), ("maskID", self.config.mask.as_str())])
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?;
        let records: Records<T> = decode_json(SOURCE_NAME, response).await?;
        Ok(records.into_vec())
    }
}

struct Endpoint<'a> {
    system: &'a RawSystem,
    signature: &'a TripwireSignature,
}

/// Join wormholes with their signatures and group the resulting edges by
/// originating system.
pub fn build_nodes(
    wormholes: &[TripwireWormhole],
    signatures: &[TripwireSignature],
    topology: &StaticTopology,
    mask: &str,
) -> NodeMap {
    let signatures_by_id: HashMap<&str, &TripwireSignature> = signatures
        .iter()
        .filter(|sig| sig.signature_type.as_deref() == Some(WORMHOLE_SIGNATURE_TYPE))
        .filter_map(|sig| sig.id.as_deref().map(|id| (id, sig)))
        .collect();

    let endpoint = |signature_id: Option<&str>| resolve(&signatures_by_id, topology, signature_id);

    let mut nodes = NodeMap::new();
    let mut dropped = 0usize;

    for wormhole in wormholes {
        if wormhole.mask_id.as_deref() != Some(mask) {
            dropped += 1;
            continue;
        }
        let (Some(initial), Some(secondary)) = (
            endpoint(wormhole.initial_id.as_deref()),
            endpoint(wormhole.secondary_id.as_deref()),
        ) else {
            dropped += 1;
            continue;
        };

        let wormhole_type = wormhole.wormhole_type.as_deref();
        push_edge(&mut nodes, wormhole, &secondary, &initial, wormhole_type);
        push_edge(&mut nodes, wormhole, &initial, &secondary, Some(EXIT_WORMHOLE_TYPE));
    }

    if dropped > 0 {
        debug!(dropped, "skipped unresolvable or foreign-mask wormholes");
    }
    nodes
}

/// Locate a wormhole signature and the dataset system it sits in.
fn resolve<'a>(
    signatures_by_id: &HashMap<&str, &'a TripwireSignature>,
    topology: &'a StaticTopology,
    signature_id: Option<&str>,
) -> Option<Endpoint<'a>> {
    let signature = *signatures_by_id.get(signature_id?)?;
    let system_id: SystemId = signature.system_id.as_deref()?.parse().ok()?;
    let system = topology.system(system_id)?;
    Some(Endpoint { system, signature })
}

fn push_edge(
    nodes: &mut NodeMap,
    wormhole: &TripwireWormhole,
    from: &Endpoint<'_>,
    to: &Endpoint<'_>,
    wormhole_type: Option<&str>,
) {
    let details = ConnectionDetails {
        signature_src: to.signature.signature_id.clone(),
        signature_dst: from.signature.signature_id.clone(),
        wormhole_type_src: wormhole_type.map(str::to_string),
        wormhole_type_dst: wormhole_type.map(str::to_string),
        wormhole_mass: wormhole.mass.clone(),
        wormhole_eol: wormhole.life.clone(),
        signature_name: to.signature.name.clone(),
        ..ConnectionDetails::default()
    };
    let edge = SystemEdge::new(
        to.system.solar_system_id,
        to.system.solar_system_name.clone(),
        to.system.security,
        EdgeSource::Tripwire,
    )
    .with_details(details);

    nodes
        .entry(from.system.solar_system_id)
        .or_insert_with(|| {
            SystemNode::new(
                from.system.solar_system_id,
                from.system.solar_system_name.clone(),
                from.system.security,
            )
        })
        .system_edges
        .push(edge);
}
