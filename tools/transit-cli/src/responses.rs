use serde::Serialize;
use transit_catalogue::{Leg, Route, RouteInfo};

pub const NOT_FOUND: &str = "not found";

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Bus {
        request_id: i64,
        curvature: f64,
        route_length: u64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    Stop {
        request_id: i64,
        buses: Vec<String>,
    },
    Route {
        request_id: i64,
        total_time: f64,
        items: Vec<RouteItem>,
    },
    Error {
        request_id: i64,
        error_message: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum RouteItem {
    Wait {
        stop_name: String,
        time: f64,
    },
    Bus {
        bus: String,
        span_count: u32,
        time: f64,
    },
}

impl Response {
    pub fn bus(request_id: i64, info: RouteInfo) -> Self {
        Self::Bus {
            request_id,
            curvature: info.curvature,
            route_length: info.real_length,
            stop_count: info.stop_count,
            unique_stop_count: info.unique_stop_count,
        }
    }

    pub fn stop(request_id: i64, buses: Vec<&str>) -> Self {
        Self::Stop {
            request_id,
            buses: buses.into_iter().map(str::to_owned).collect(),
        }
    }

    pub fn route(request_id: i64, route: &Route) -> Self {
        Self::Route {
            request_id,
            total_time: route.total_time,
            items: route.legs.iter().map(RouteItem::from).collect(),
        }
    }

    pub fn error(request_id: i64, message: impl Into<String>) -> Self {
        Self::Error {
            request_id,
            error_message: message.into(),
        }
    }

    pub fn not_found(request_id: i64) -> Self {
        Self::error(request_id, NOT_FOUND)
    }
}

impl From<&Leg> for RouteItem {
    fn from(leg: &Leg) -> Self {
        match leg {
            Leg::Wait { stop, duration } => RouteItem::Wait {
                stop_name: stop.to_string(),
                time: *duration,
            },
            Leg::Ride {
                bus,
                span_count,
                duration,
                ..
            } => RouteItem::Bus {
                bus: bus.to_string(),
                span_count: *span_count,
                time: *duration,
            },
        }
    }
}
