//! Core data types and enums for the catalogue.

use std::sync::Arc;

use geo::Point;

use crate::identifiers::StopId;

// ============================================================================
// Enums
// ============================================================================

/// Route topology of a bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BusKind {
    /// Listed stops form a closed loop and are traversed once.
    RoundTrip = 0,
    /// Listed stops are traversed forward, then back in reverse.
    OneWay = 1,
}

impl BusKind {
    pub fn from_roundtrip(is_roundtrip: bool) -> Self {
        if is_roundtrip {
            Self::RoundTrip
        } else {
            Self::OneWay
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::RoundTrip),
            1 => Some(Self::OneWay),
            _ => None,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A named stop at a fixed location.
///
/// `location` follows the `geo` convention: x is longitude, y is latitude,
/// both in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: Arc<str>,
    pub location: Point,
}

impl Stop {
    pub fn new(name: impl Into<Arc<str>>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            location: Point::new(longitude, latitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// A bus line: an ordered list of stops and the way it is traversed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bus {
    pub name: Arc<str>,
    pub stops: Vec<StopId>,
    pub kind: BusKind,
}

/// Statistics of a single bus route.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteInfo {
    /// Stops visited along the whole run, `2N - 1` for one-way buses.
    pub stop_count: usize,
    pub unique_stop_count: usize,
    /// Road length in meters.
    pub real_length: u64,
    /// Ratio of road length to great-circle length.
    pub curvature: f64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Stop already exists: {0}")]
    DuplicateStop(String),

    #[error("Bus already exists: {0}")]
    DuplicateBus(String),

    #[error("Stop not found: {0}")]
    UnknownStop(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransitError>;
