//! # transit-catalogue
//!
//! In-memory bus network database with shortest-time routing.
//!
//! ## Features
//!
//! - **Catalogue**: stops, buses, directed road distances, route statistics
//! - **Routing**: fastest itineraries with wait time and transfers
//! - **Build once, query many**: the routing index is computed once, encoded
//!   to a single binary blob, and restored later without recomputation
//! - **Spatial queries**: R-tree lookups of stops around a point
//!
//! ## Example
//!
//! ```
//! use transit_catalogue::prelude::*;
//!
//! let mut store = NetworkStore::new();
//! store.add_stop("Tolstopaltsevo", 55.611087, 37.20829)?;
//! store.add_stop("Marushkino", 55.595884, 37.209755)?;
//! store.add_distance("Tolstopaltsevo", "Marushkino", 3900)?;
//! store.add_bus("750", &["Tolstopaltsevo", "Marushkino"], BusKind::OneWay)?;
//!
//! let index = TransitIndex::build(
//!     store,
//!     RoutingSettings::new(6, 40.0),
//!     RenderSettings::default(),
//! )?;
//!
//! let route = index.route("Tolstopaltsevo", "Marushkino").unwrap();
//! assert_eq!(route.legs.len(), 2); // wait, then ride
//!
//! let restored = TransitIndex::from_bytes(&index.to_bytes())?;
//! assert_eq!(restored.route("Tolstopaltsevo", "Marushkino"), Some(route));
//! # Ok::<(), TransitError>(())
//! ```

pub mod catalogue;
pub mod graph;
pub mod identifiers;
pub mod models;
pub mod persistence;
pub mod router;
pub mod session;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::catalogue::NetworkStore;
    pub use crate::identifiers::*;
    pub use crate::models::{settings::*, types::*};
    pub use crate::persistence::{BlobStorage, FileStorage};
    pub use crate::router::{Leg, Route, TransitRouter};
    pub use crate::session::TransitIndex;
}

pub use prelude::*;
