use serde::Deserialize;
use std::collections::BTreeMap;
use transit_catalogue::{RenderSettings, RoutingSettings, SerializationSettings};

/// The whole input document. Each phase reads only the keys it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestDocument {
    pub base_requests: Vec<BaseRequest>,
    pub routing_settings: RoutingSettings,
    pub render_settings: RenderSettings,
    pub serialization_settings: SerializationSettings,
    pub stat_requests: Vec<StatRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop(StopRequest),
    Bus(BusRequest),
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Road distance in meters to each named neighbour
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct BusRequest {
    pub name: String,
    pub stops: Vec<String>,
    #[serde(default)]
    pub is_roundtrip: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatRequest {
    pub id: i64,
    #[serde(flatten)]
    pub kind: StatKind,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StatKind {
    Bus {
        name: String,
    },
    Stop {
        name: String,
    },
    Route {
        from: String,
        to: String,
    },
    /// Request types this tool does not answer (map rendering and the like)
    #[serde(other)]
    Unsupported,
}
