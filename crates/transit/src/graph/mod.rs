//! Generic directed weighted graph and its shortest path index.

pub mod directed;
pub mod shortest_paths;

pub use directed::{Edge, RoutingGraph, Weight};
pub use shortest_paths::{Path, PathEntry, ShortestPathIndex};
