//! Shortest-time routing between stops.
//!
//! Every visited stop gets a hub: a wait edge from its "about to wait"
//! vertex to its "done waiting" vertex, weighted by the configured wait time
//! and shared by all buses through the stop. Each bus contributes one ride
//! edge for every ordered pair of its stops, from the earlier stop's
//! done-waiting vertex to the later stop's about-to-wait vertex. A trip
//! therefore alternates wait and ride edges, one pair per boarding.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalogue::NetworkStore;
use crate::graph::{Edge, RoutingGraph};
use crate::identifiers::{BusId, EdgeId, StopId, VertexId};
use crate::models::settings::RoutingSettings;
use crate::models::types::{Bus, BusKind, Result};

/// What a graph edge means to a passenger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeInfo {
    pub is_wait: bool,
    /// Minutes
    pub duration: f64,
    /// Stop-to-stop hops covered, 0 for waits
    pub span_count: u32,
    /// Bus ridden, `None` for waits
    pub bus: Option<BusId>,
    /// Stop waited at, or stop the ride ends at
    pub stop: StopId,
}

/// One step of an itinerary.
#[derive(Clone, Debug, PartialEq)]
pub enum Leg {
    Wait {
        stop: Arc<str>,
        duration: f64,
    },
    Ride {
        bus: Arc<str>,
        /// Stop where the ride ends
        stop: Arc<str>,
        span_count: u32,
        duration: f64,
    },
}

impl Leg {
    pub fn is_wait(&self) -> bool {
        matches!(self, Leg::Wait { .. })
    }

    pub fn duration(&self) -> f64 {
        match self {
            Leg::Wait { duration, .. } | Leg::Ride { duration, .. } => *duration,
        }
    }
}

/// A fastest itinerary between two stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Minutes
    pub total_time: f64,
    pub legs: Vec<Leg>,
}

#[derive(Clone, Debug)]
pub struct TransitRouter {
    settings: RoutingSettings,
    graph: RoutingGraph<f64>,
    /// Hub edge per stop, indexed by `StopId`
    hubs: Vec<Option<EdgeId>>,
    /// Metadata per edge, indexed by `EdgeId`
    edge_info: Vec<EdgeInfo>,
}

impl TransitRouter {
    pub fn new(settings: RoutingSettings) -> Self {
        Self {
            settings,
            graph: RoutingGraph::new(0),
            hubs: Vec::new(),
            edge_info: Vec::new(),
        }
    }

    /// Restore a router from persisted state without rebuilding.
    pub(crate) fn from_parts(
        settings: RoutingSettings,
        graph: RoutingGraph<f64>,
        hubs: Vec<Option<EdgeId>>,
        edge_info: Vec<EdgeInfo>,
    ) -> Self {
        Self {
            settings,
            graph,
            hubs,
            edge_info,
        }
    }

    /// Replace the settings. Takes effect on the next [`build_graph`](Self::build_graph).
    pub fn update_settings(&mut self, settings: RoutingSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn graph(&self) -> &RoutingGraph<f64> {
        &self.graph
    }

    pub fn is_built(&self) -> bool {
        self.graph.index().is_some()
    }

    pub fn hub(&self, stop: StopId) -> Option<EdgeId> {
        self.hubs.get(stop.index()).copied().flatten()
    }

    /// Hub table indexed by `StopId`
    pub fn hubs(&self) -> &[Option<EdgeId>] {
        &self.hubs
    }

    pub fn edge_info(&self, edge: EdgeId) -> Option<&EdgeInfo> {
        self.edge_info.get(edge.index())
    }

    /// Edge metadata indexed by `EdgeId`
    pub fn edge_infos(&self) -> &[EdgeInfo] {
        &self.edge_info
    }

    /// Build the routing graph and its shortest path index from every bus.
    ///
    /// On error the router is left exactly as it was.
    pub fn build_graph(&mut self, store: &NetworkStore) -> Result<()> {
        self.settings.validate()?;

        let mut builder = GraphBuilder::new(self.settings, store);
        for (index, bus) in store.buses().iter().enumerate() {
            builder.add_bus(BusId::next(index), bus);
        }

        let GraphBuilder {
            mut graph,
            hubs,
            edge_info,
            ..
        } = builder;
        graph.build_index();

        log::info!(
            "Routing graph built: {} vertices, {} edges, {} hubs",
            graph.vertex_count(),
            graph.edge_count(),
            hubs.iter().flatten().count()
        );

        self.graph = graph;
        self.hubs = hubs;
        self.edge_info = edge_info;
        Ok(())
    }

    /// Fastest itinerary between two stops by name.
    ///
    /// `None` when either stop is unknown, no bus visits it, or no bus path
    /// connects them.
    pub fn get_route(&self, store: &NetworkStore, from: &str, to: &str) -> Option<Route> {
        let from = self.wait_vertex(store.stop(from)?)?;
        let to = self.wait_vertex(store.stop(to)?)?;

        let path = self.graph.query(from, to)?;

        let legs = path
            .edges
            .iter()
            .map(|&edge| self.leg(store, edge))
            .collect::<Option<Vec<_>>>()?;

        Some(Route {
            total_time: path.weight,
            legs,
        })
    }

    fn wait_vertex(&self, stop: StopId) -> Option<VertexId> {
        let hub = self.hub(stop)?;
        Some(self.graph.edge(hub)?.from)
    }

    fn leg(&self, store: &NetworkStore, edge: EdgeId) -> Option<Leg> {
        let info = self.edge_info(edge)?;
        let stop = store.stop_by_id(info.stop)?.name.clone();

        let leg = match info.bus {
            Some(bus) if !info.is_wait => Leg::Ride {
                bus: store.bus_by_id(bus)?.name.clone(),
                stop,
                span_count: info.span_count,
                duration: info.duration,
            },
            _ => Leg::Wait {
                stop,
                duration: info.duration,
            },
        };
        Some(leg)
    }
}

/// Accumulates graph state for a single build.
struct GraphBuilder<'a> {
    settings: RoutingSettings,
    store: &'a NetworkStore,
    graph: RoutingGraph<f64>,
    hubs: Vec<Option<EdgeId>>,
    edge_info: Vec<EdgeInfo>,
    next_vertex: u32,
}

impl<'a> GraphBuilder<'a> {
    fn new(settings: RoutingSettings, store: &'a NetworkStore) -> Self {
        // Only stops some bus visits get a hub
        let visited: HashSet<StopId> = store
            .buses()
            .iter()
            .flat_map(|bus| bus.stops.iter().copied())
            .collect();

        Self {
            settings,
            store,
            graph: RoutingGraph::new(visited.len() * 2),
            hubs: vec![None; store.stops().len()],
            edge_info: Vec::new(),
            next_vertex: 0,
        }
    }

    fn add_bus(&mut self, bus_id: BusId, bus: &Bus) {
        let stops = &bus.stops;

        for i in 0..stops.len().saturating_sub(1) {
            let current = self.hub(stops[i]);

            let mut forward = 0u64;
            let mut backward = 0u64;
            for k in i + 1..stops.len() {
                let next = self.hub(stops[k]);
                let span_count = (k - i) as u32;

                forward += u64::from(self.store.real_length(stops[k - 1], stops[k]));
                self.add_ride(current.1, next.0, forward, span_count, bus_id, stops[k]);

                if bus.kind == BusKind::OneWay {
                    backward += u64::from(self.store.real_length(stops[k], stops[k - 1]));
                    self.add_ride(next.1, current.0, backward, span_count, bus_id, stops[i]);
                }
            }
        }
    }

    /// Wait-in and wait-out vertices of a stop, creating its hub on first visit
    fn hub(&mut self, stop: StopId) -> (VertexId, VertexId) {
        if let Some(edge) = self.hubs[stop.index()].and_then(|id| self.graph.edge(id)) {
            return (edge.from, edge.to);
        }

        let wait_in = VertexId::new(self.next_vertex);
        let wait_out = VertexId::new(self.next_vertex + 1);
        self.next_vertex += 2;

        let duration = f64::from(self.settings.bus_wait_time);
        let id = self.push_edge(
            Edge::new(wait_in, wait_out, duration),
            EdgeInfo {
                is_wait: true,
                duration,
                span_count: 0,
                bus: None,
                stop,
            },
        );
        self.hubs[stop.index()] = Some(id);

        (wait_in, wait_out)
    }

    fn add_ride(
        &mut self,
        from: VertexId,
        to: VertexId,
        meters: u64,
        span_count: u32,
        bus: BusId,
        stop: StopId,
    ) {
        let duration = self.settings.travel_minutes(meters as f64);
        self.push_edge(
            Edge::new(from, to, duration),
            EdgeInfo {
                is_wait: false,
                duration,
                span_count,
                bus: Some(bus),
                stop,
            },
        );
    }

    fn push_edge(&mut self, edge: Edge<f64>, info: EdgeInfo) -> EdgeId {
        let id = self.graph.add_edge(edge);
        debug_assert_eq!(id.index(), self.edge_info.len());
        self.edge_info.push(info);
        id
    }
}
