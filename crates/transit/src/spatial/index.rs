//! R-tree nodes for spatial lookups over stops.
//!
//! Queries use two-stage filtering: the R-tree narrows candidates with a
//! degree-space bounding envelope, then the great-circle distance decides.

use geo::Point;
use rstar::{PointDistance, RTreeObject, AABB};

use crate::identifiers::StopId;

#[derive(Clone, Debug, PartialEq)]
pub struct StopNode {
    pub stop: StopId,
    point: [f64; 2],
}

impl StopNode {
    pub fn new(location: Point, stop: StopId) -> Self {
        Self {
            stop,
            point: [location.x(), location.y()],
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.point[0], self.point[1])
    }
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StopNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}
