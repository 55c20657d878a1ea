//! In-memory catalogue of stops, buses, and road distances.
//!
//! Stops and buses live in append-only arenas and are referred to by
//! [`StopId`] / [`BusId`] everywhere else. Names are unique keys.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use geo::Point;
use rstar::RTree;

use crate::identifiers::{BusId, StopId};
use crate::models::types::*;
use crate::spatial::index::StopNode;
use crate::spatial::queries::{great_circle_distance, meters_to_degrees_approx, path_length};

/// Widening of the R-tree search box before the exact great-circle filter
const ENVELOPE_MARGIN: f64 = 1.05;

#[derive(Clone, Debug, Default)]
pub struct NetworkStore {
    // Arenas
    stops: Vec<Stop>,
    buses: Vec<Bus>,

    // Lookup maps
    stop_index: HashMap<Arc<str>, StopId>,
    bus_index: HashMap<Arc<str>, BusId>,

    /// Buses through each stop, indexed by `StopId`, sorted by name
    stop_buses: Vec<BTreeSet<Arc<str>>>,

    /// Directed road distances in meters
    distances: BTreeMap<(StopId, StopId), u32>,

    // Spatial index
    stop_tree: RTree<StopNode>,
}

impl NetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Mutators ----

    /// Register a stop. Names are unique.
    pub fn add_stop(&mut self, name: &str, latitude: f64, longitude: f64) -> Result<StopId> {
        if self.stop_index.contains_key(name) {
            return Err(TransitError::DuplicateStop(name.to_string()));
        }

        let id = StopId::next(self.stops.len());
        let stop = Stop::new(name, latitude, longitude);

        self.stop_index.insert(stop.name.clone(), id);
        self.stop_tree.insert(StopNode::new(stop.location, id));
        self.stops.push(stop);
        self.stop_buses.push(BTreeSet::new());

        Ok(id)
    }

    /// Set the road distance `from -> to`.
    ///
    /// The reverse direction is filled with the same value unless it has
    /// already been set; a later explicit reverse distance overrides it.
    pub fn add_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<()> {
        let from = self.require_stop(from)?;
        let to = self.require_stop(to)?;

        self.distances.insert((from, to), meters);
        self.distances.entry((to, from)).or_insert(meters);

        Ok(())
    }

    /// Register a bus over already known stops.
    ///
    /// Nothing is modified if any stop name is unknown.
    pub fn add_bus(&mut self, name: &str, stop_names: &[&str], kind: BusKind) -> Result<BusId> {
        if self.bus_index.contains_key(name) {
            return Err(TransitError::DuplicateBus(name.to_string()));
        }

        let stops = stop_names
            .iter()
            .map(|stop| self.require_stop(stop))
            .collect::<Result<Vec<_>>>()?;

        let id = BusId::next(self.buses.len());
        let bus = Bus {
            name: name.into(),
            stops,
            kind,
        };

        for stop in &bus.stops {
            self.stop_buses[stop.index()].insert(bus.name.clone());
        }

        for pair in bus.stops.windows(2) {
            if !self.distances.contains_key(&(pair[0], pair[1])) {
                log::warn!(
                    "Bus {}: no road distance from {} to {}, counting 0",
                    bus.name,
                    self.stops[pair[0].index()].name,
                    self.stops[pair[1].index()].name
                );
            }
        }

        self.bus_index.insert(bus.name.clone(), id);
        self.buses.push(bus);

        Ok(id)
    }

    // ---- Lookups ----

    pub fn stop(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    pub fn bus(&self, name: &str) -> Option<BusId> {
        self.bus_index.get(name).copied()
    }

    pub fn has_stop(&self, name: &str) -> bool {
        self.stop_index.contains_key(name)
    }

    pub fn has_bus(&self, name: &str) -> bool {
        self.bus_index.contains_key(name)
    }

    pub fn stop_by_id(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id.index())
    }

    pub fn bus_by_id(&self, id: BusId) -> Option<&Bus> {
        self.buses.get(id.index())
    }

    // ---- Collections ----

    /// Stops in insertion order
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Buses in insertion order
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Every directed distance entry, ordered by `(from, to)`
    pub fn distances(&self) -> impl Iterator<Item = (StopId, StopId, u32)> + '_ {
        self.distances
            .iter()
            .map(|(&(from, to), &meters)| (from, to, meters))
    }

    // ---- Statistics ----

    /// Directed road distance in meters, 0 when no entry exists.
    pub fn real_length(&self, from: StopId, to: StopId) -> u32 {
        self.distances.get(&(from, to)).copied().unwrap_or(0)
    }

    pub fn route_info(&self, bus_name: &str) -> Option<RouteInfo> {
        let bus = &self.buses[self.bus(bus_name)?.index()];

        let stop_count = match bus.kind {
            BusKind::RoundTrip => bus.stops.len(),
            BusKind::OneWay => (bus.stops.len() * 2).saturating_sub(1),
        };
        let unique_stop_count = bus.stops.iter().collect::<HashSet<_>>().len();

        let geo_length = self.geo_length(bus);
        let real_length = self.bus_real_length(bus);
        let curvature = if geo_length > 0.0 {
            real_length as f64 / geo_length
        } else {
            0.0
        };

        Some(RouteInfo {
            stop_count,
            unique_stop_count,
            real_length,
            curvature,
        })
    }

    /// Names of buses through a stop, sorted. Empty for unknown or unvisited stops.
    pub fn stop_buses(&self, stop_name: &str) -> Vec<&str> {
        self.stop(stop_name)
            .map(|stop| {
                self.stop_buses[stop.index()]
                    .iter()
                    .map(|name| name.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    // ---- Spatial queries ----

    /// Stops within `radius_m` meters of `point`, nearest first
    pub fn stops_near(&self, point: Point, radius_m: f64) -> Vec<StopId> {
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }
        self.stops_within(point, radius_m)
    }

    /// The `n` stops closest to `point` by great-circle distance, nearest first
    pub fn nearest_stops(&self, point: Point, n: usize) -> Vec<StopId> {
        if n == 0 {
            return Vec::new();
        }

        // The n nearest in degree space bound the radius holding the true n nearest
        let radius = self
            .stop_tree
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .take(n)
            .map(|node| great_circle_distance(point, node.location()))
            .fold(0.0, f64::max);

        let mut found = self.stops_within(point, radius);
        found.truncate(n);
        found
    }

    // ---- Helpers ----

    fn stops_within(&self, point: Point, radius_m: f64) -> Vec<StopId> {
        // Candidate box in degrees, sized for the poleward edge where a degree
        // of longitude is shortest
        let lat_span = meters_to_degrees_approx(radius_m) * ENVELOPE_MARGIN;
        let far_lat = (point.y().abs() + lat_span).min(89.0);
        let lon_span = lat_span / far_lat.to_radians().cos();
        let envelope = lat_span.hypot(lon_span);

        let mut found: Vec<(f64, StopId)> = self
            .stop_tree
            .locate_within_distance([point.x(), point.y()], envelope * envelope)
            .map(|node| (great_circle_distance(point, node.location()), node.stop))
            .filter(|(distance, _)| *distance <= radius_m)
            .collect();

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, stop)| stop).collect()
    }

    fn require_stop(&self, name: &str) -> Result<StopId> {
        self.stop(name)
            .ok_or_else(|| TransitError::UnknownStop(name.to_string()))
    }

    fn geo_length(&self, bus: &Bus) -> f64 {
        let forward = path_length(bus.stops.iter().map(|id| self.stops[id.index()].location));
        match bus.kind {
            BusKind::RoundTrip => forward,
            BusKind::OneWay => forward * 2.0,
        }
    }

    fn bus_real_length(&self, bus: &Bus) -> u64 {
        let forward: u64 = bus
            .stops
            .windows(2)
            .map(|pair| u64::from(self.real_length(pair[0], pair[1])))
            .sum();

        match bus.kind {
            BusKind::RoundTrip => forward,
            BusKind::OneWay => {
                let backward: u64 = bus
                    .stops
                    .windows(2)
                    .map(|pair| u64::from(self.real_length(pair[1], pair[0])))
                    .sum();
                forward + backward
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_stops() -> NetworkStore {
        let mut store = NetworkStore::new();
        store.add_stop("A", 55.611087, 37.20829).unwrap();
        store.add_stop("B", 55.595884, 37.209755).unwrap();
        store.add_stop("C", 55.632761, 37.333324).unwrap();
        store
    }

    #[test]
    fn test_empty_store() {
        let store = NetworkStore::new();
        assert!(store.stops().is_empty());
        assert!(store.buses().is_empty());
        assert_eq!(store.route_info("750"), None);
        assert!(store.stop_buses("A").is_empty());
    }

    #[test]
    fn test_duplicate_stop_rejected() {
        let mut store = three_stops();
        let err = store.add_stop("A", 0.0, 0.0).unwrap_err();

        assert!(matches!(err, TransitError::DuplicateStop(name) if name == "A"));
        assert_eq!(store.stops().len(), 3);
    }

    #[test]
    fn test_distance_autofill_and_override() {
        let mut store = three_stops();
        let a = store.stop("A").unwrap();
        let b = store.stop("B").unwrap();

        store.add_distance("A", "B", 100).unwrap();
        assert_eq!(store.real_length(a, b), 100);
        assert_eq!(store.real_length(b, a), 100);

        store.add_distance("B", "A", 150).unwrap();
        assert_eq!(store.real_length(b, a), 150);
        assert_eq!(store.real_length(a, b), 100);

        // Re-setting the forward direction leaves the explicit reverse alone
        store.add_distance("A", "B", 120).unwrap();
        assert_eq!(store.real_length(a, b), 120);
        assert_eq!(store.real_length(b, a), 150);
    }

    #[test]
    fn test_distance_unknown_stop() {
        let mut store = three_stops();
        let err = store.add_distance("A", "Z", 10).unwrap_err();

        assert!(matches!(err, TransitError::UnknownStop(name) if name == "Z"));
        assert_eq!(store.distances().count(), 0);
    }

    #[test]
    fn test_missing_distance_counts_zero() {
        let store = three_stops();
        assert_eq!(store.real_length(StopId::new(0), StopId::new(2)), 0);
    }

    #[test]
    fn test_bus_unknown_stop_is_not_applied() {
        let mut store = three_stops();
        let err = store.add_bus("1", &["A", "Nowhere", "B"], BusKind::OneWay).unwrap_err();

        assert!(matches!(err, TransitError::UnknownStop(name) if name == "Nowhere"));
        assert!(!store.has_bus("1"));
        assert!(store.stop_buses("A").is_empty());
    }

    #[test]
    fn test_duplicate_bus_rejected() {
        let mut store = three_stops();
        store.add_bus("1", &["A", "B"], BusKind::OneWay).unwrap();
        let err = store.add_bus("1", &["B", "C"], BusKind::OneWay).unwrap_err();

        assert!(matches!(err, TransitError::DuplicateBus(_)));
        assert_eq!(store.stop_buses("C"), Vec::<&str>::new());
    }

    #[test]
    fn test_round_trip_vs_one_way_stats() {
        let mut store = three_stops();
        store.add_distance("A", "B", 100).unwrap();
        store.add_distance("B", "C", 200).unwrap();
        store.add_distance("C", "B", 250).unwrap();

        store.add_bus("ring", &["A", "B", "C"], BusKind::RoundTrip).unwrap();
        store.add_bus("line", &["A", "B", "C"], BusKind::OneWay).unwrap();

        let ring = store.route_info("ring").unwrap();
        assert_eq!(ring.stop_count, 3);
        assert_eq!(ring.unique_stop_count, 3);
        assert_eq!(ring.real_length, 300);

        let line = store.route_info("line").unwrap();
        assert_eq!(line.stop_count, 5);
        assert_eq!(line.unique_stop_count, 3);
        // forward 100 + 200, backward 250 + 100
        assert_eq!(line.real_length, 650);

        let a = store.stop_by_id(StopId::new(0)).unwrap().location;
        let b = store.stop_by_id(StopId::new(1)).unwrap().location;
        let c = store.stop_by_id(StopId::new(2)).unwrap().location;
        let geo = great_circle_distance(a, b) + great_circle_distance(b, c);

        assert_relative_eq!(ring.curvature, 300.0 / geo, max_relative = 1e-12);
        assert_relative_eq!(line.curvature, 650.0 / (2.0 * geo), max_relative = 1e-12);
    }

    #[test]
    fn test_closed_loop_unique_stops() {
        let mut store = three_stops();
        store.add_bus("loop", &["A", "B", "C", "A"], BusKind::RoundTrip).unwrap();

        let info = store.route_info("loop").unwrap();
        assert_eq!(info.stop_count, 4);
        assert_eq!(info.unique_stop_count, 3);
    }

    #[test]
    fn test_zero_length_route() {
        let mut store = three_stops();
        store.add_bus("stay", &["A"], BusKind::OneWay).unwrap();

        let info = store.route_info("stay").unwrap();
        assert_eq!(info.stop_count, 1);
        assert_eq!(info.real_length, 0);
        assert_eq!(info.curvature, 0.0);

        store.add_bus("empty", &[], BusKind::OneWay).unwrap();
        assert_eq!(store.route_info("empty").unwrap().stop_count, 0);
    }

    #[test]
    fn test_stop_buses_sorted() {
        let mut store = three_stops();
        store.add_bus("828", &["A", "B"], BusKind::OneWay).unwrap();
        store.add_bus("256", &["B", "C"], BusKind::OneWay).unwrap();
        store.add_bus("14", &["B", "B"], BusKind::RoundTrip).unwrap();

        assert_eq!(store.stop_buses("B"), vec!["14", "256", "828"]);
        assert_eq!(store.stop_buses("A"), vec!["828"]);
        assert!(store.stop_buses("Unknown").is_empty());
        assert!(store.has_stop("C"));
        assert!(!store.has_stop("Unknown"));
    }

    #[test]
    fn test_stops_near() {
        let store = three_stops();
        let a = store.stop("A").unwrap();
        let b = store.stop("B").unwrap();
        let near_a = store.stop_by_id(a).unwrap().location;

        // B is about 1.7 km from A, C about 8 km
        assert_eq!(store.stops_near(near_a, 500.0), vec![a]);
        assert_eq!(store.stops_near(near_a, 2_000.0), vec![a, b]);
        assert_eq!(store.stops_near(near_a, 20_000.0).len(), 3);
        assert!(store.stops_near(near_a, -1.0).is_empty());

        assert_eq!(store.nearest_stops(near_a, 1), vec![a]);
    }

    #[test]
    fn test_nearest_stops_at_high_latitude() {
        let mut store = NetworkStore::new();
        // At 70°N a degree of longitude is about a third of a degree of latitude
        let north = store.add_stop("North", 70.03, 30.0).unwrap();
        let east = store.add_stop("East", 70.0, 30.05).unwrap();
        let origin = Point::new(30.0, 70.0);

        assert!(
            great_circle_distance(origin, store.stop_by_id(east).unwrap().location)
                < great_circle_distance(origin, store.stop_by_id(north).unwrap().location)
        );
        assert_eq!(store.stops_near(origin, 1_902.0), vec![east]);
        assert_eq!(store.stops_near(origin, 5_000.0), vec![east, north]);
        assert_eq!(store.nearest_stops(origin, 1), vec![east]);
        assert_eq!(store.nearest_stops(origin, 2), vec![east, north]);
        assert_eq!(store.nearest_stops(origin, 5), vec![east, north]);
        assert!(store.nearest_stops(origin, 0).is_empty());
    }

    #[test]
    fn test_nearest_stop_at_query_point() {
        let store = three_stops();
        let b = store.stop("B").unwrap();
        let at_b = store.stop_by_id(b).unwrap().location;

        assert_eq!(store.nearest_stops(at_b, 1), vec![b]);
    }
}
