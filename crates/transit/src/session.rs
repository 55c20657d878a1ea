//! The build-once, query-many session object.

use std::path::Path;

use crate::catalogue::NetworkStore;
use crate::models::settings::{RenderSettings, RoutingSettings};
use crate::models::types::{Result, RouteInfo};
use crate::persistence::{self, BlobStorage, DecodedIndex};
use crate::router::{Route, TransitRouter};

/// A catalogue together with its built router.
///
/// Owns both for its whole lifetime; after construction it is read-only.
#[derive(Clone, Debug)]
pub struct TransitIndex {
    store: NetworkStore,
    router: TransitRouter,
    render_settings: RenderSettings,
}

impl TransitIndex {
    /// Build phase: construct the routing graph over a populated store.
    pub fn build(
        store: NetworkStore,
        routing_settings: RoutingSettings,
        render_settings: RenderSettings,
    ) -> Result<Self> {
        let mut router = TransitRouter::new(routing_settings);
        router.build_graph(&store)?;

        Ok(Self {
            store,
            router,
            render_settings,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        persistence::serialize(&self.store, &self.router, &self.render_settings)
    }

    /// Serve phase: restore a previously built index without rebuilding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let DecodedIndex {
            store,
            router,
            render_settings,
        } = persistence::deserialize(bytes)?;

        Ok(Self {
            store,
            router,
            render_settings,
        })
    }

    pub fn save(&self, storage: &impl BlobStorage, path: &Path) -> Result<()> {
        storage.save(path, &self.to_bytes())
    }

    pub fn load(storage: &impl BlobStorage, path: &Path) -> Result<Self> {
        Self::from_bytes(&storage.load(path)?)
    }

    pub fn store(&self) -> &NetworkStore {
        &self.store
    }

    pub fn router(&self) -> &TransitRouter {
        &self.router
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    // ---- Queries ----

    pub fn route_info(&self, bus_name: &str) -> Option<RouteInfo> {
        self.store.route_info(bus_name)
    }

    /// Sorted bus names through a stop, `None` if the stop is unknown
    pub fn stop_buses(&self, stop_name: &str) -> Option<Vec<&str>> {
        self.store
            .has_stop(stop_name)
            .then(|| self.store.stop_buses(stop_name))
    }

    pub fn route(&self, from: &str, to: &str) -> Option<Route> {
        self.router.get_route(&self.store, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::TransitError;
    use crate::persistence::FileStorage;
    use crate::router::transit_router::tests::{fixture, settings};

    #[test]
    fn test_build_and_query() {
        let index = TransitIndex::build(fixture(), settings(), RenderSettings::default()).unwrap();

        assert_eq!(index.route("A", "C").map(|route| route.total_time), Some(7.0));
        assert_eq!(index.route_info("1").map(|info| info.stop_count), Some(5));
        assert_eq!(index.stop_buses("C"), Some(vec!["1", "2"]));
        assert_eq!(index.stop_buses("G"), Some(vec![]));
        assert_eq!(index.stop_buses("Nowhere"), None);
        assert_eq!(index.route_info("Nowhere"), None);
    }

    #[test]
    fn test_build_rejects_bad_velocity() {
        let err = TransitIndex::build(
            fixture(),
            RoutingSettings::new(2, 0.0),
            RenderSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TransitError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_save_and_load() {
        let index = TransitIndex::build(fixture(), settings(), RenderSettings::default()).unwrap();
        let path = std::env::temp_dir().join(format!("transit-session-{}.bin", std::process::id()));

        index.save(&FileStorage, &path).unwrap();
        let loaded = TransitIndex::load(&FileStorage, &path).unwrap();
        std::fs::remove_file(&path).unwrap();

        for from in ["A", "B", "C", "D", "E", "F", "G"] {
            for to in ["A", "B", "C", "D", "E", "F", "G"] {
                assert_eq!(loaded.route(from, to), index.route(from, to));
            }
        }
        assert_eq!(loaded.render_settings(), index.render_settings());
        assert_eq!(loaded.router().settings(), index.router().settings());
    }
}
