//! Wait/ride routing over the catalogue.

pub mod transit_router;

pub use transit_router::{EdgeInfo, Leg, Route, TransitRouter};
