//! Catalogue data models, settings, and error types.

pub mod settings;
pub mod types;

// Re-exports for convenience
pub use settings::{Color, Offset, RenderSettings, RoutingSettings, SerializationSettings};
pub use types::{Bus, BusKind, Result, RouteInfo, Stop, TransitError};
