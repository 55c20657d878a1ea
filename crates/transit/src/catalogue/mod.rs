//! The network catalogue: stops, buses, distances, and route statistics.

pub mod store;

pub use store::NetworkStore;
