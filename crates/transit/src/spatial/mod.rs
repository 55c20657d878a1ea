//! Great-circle distances and the spatial index over stops.

pub mod index;
pub mod queries;

pub use queries::{great_circle_distance, path_length};
