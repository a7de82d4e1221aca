#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use evepath_lib::{
    EveMetroConfig, EveMetroSource, EveScoutConfig, EveScoutSource, StaticTopology, SystemId,
};
use serde_json::{json, Value};

pub const JITA: SystemId = 30000142;
pub const MAURASI: SystemId = 30000140;
pub const URLEN: SystemId = 30000139;
pub const AMARR: SystemId = 30002187;
pub const ASHAB: SystemId = 30003491;
pub const THERA: SystemId = 31000005;
pub const TURNUR: SystemId = 30002086;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_topology() -> Arc<StaticTopology> {
    let path = fixtures_dir().join("systems.json");
    Arc::new(StaticTopology::load(&path).expect("fixture systems.json loads"))
}

pub fn eve_scout_source(base_uri: &str, freshness_window: Duration) -> EveScoutSource {
    let config = EveScoutConfig {
        url: format!("{base_uri}/v2/public/signatures"),
    };
    EveScoutSource::new(config, TIMEOUT, freshness_window).expect("client builds")
}

pub fn eve_metro_source(base_uri: &str, freshness_window: Duration) -> EveMetroSource {
    let config = EveMetroConfig {
        url: format!("{base_uri}/api/connections"),
        api_key: "metro-key".to_string(),
        character_id: Some(2112000001),
        corporation_id: None,
        alliance_id: None,
    };
    EveMetroSource::new(config, TIMEOUT, freshness_window).expect("client builds")
}

/// EVE-Scout record for a wormhole between `hub` and `system`.
pub fn scout_record(hub: (SystemId, &str), system: (SystemId, &str)) -> Value {
    json!({
        "id": "1",
        "signature_type": "wormhole",
        "out_system_id": hub.0,
        "out_system_name": hub.1,
        "out_signature": "THR-001",
        "in_system_id": system.0,
        "in_system_name": system.1,
        "in_signature": "KSP-001",
        "in_system_class": "hs",
        "wh_type": "Q063",
        "max_ship_size": "medium",
        "remaining_hours": 11
    })
}

/// EVE Metro response with a single one-way link.
pub fn metro_response(from: (SystemId, &str), to: (SystemId, &str)) -> Value {
    json!({
        "access": true,
        "connections": [{
            "systemId": from.0,
            "systemName": from.1,
            "systemSecurityStatus": 0.5,
            "systemEdges": [{
                "solarSystemIdDst": to.0,
                "solarSystemNameDst": to.1,
                "solarSystemSecDst": 0.5,
                "signatureSrc": "MET-001",
                "signatureDst": "MET-002",
                "wormholeTypeSrc": "N110",
                "wormholeTypeDst": "K162",
                "wormholeMass": "stable",
                "wormholeEol": "stable"
            }]
        }]
    })
}
