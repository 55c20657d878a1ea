//! Distance calculations on the Earth's surface.
//!
//! Uses the Haversine formula; coordinates are `geo` points (x = longitude,
//! y = latitude, degrees) and results are in meters.

use geo::{HaversineDistance, Point};

/// Great-circle distance between two points in meters
pub fn great_circle_distance(from: Point, to: Point) -> f64 {
    from.haversine_distance(&to)
}

/// Sum of great-circle distances between consecutive points
pub fn path_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = Point>,
{
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for point in points {
        total += great_circle_distance(previous, point);
        previous = point;
    }
    total
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / 111_320.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_great_circle_distance() {
        // Distance from NYC to LA is approximately 3,936 km
        let nyc = Point::new(-74.0060, 40.7128);
        let la = Point::new(-118.2437, 34.0522);

        let dist = great_circle_distance(nyc, la);
        assert!((dist - 3_936_000.0).abs() < 50_000.0); // Within 50km
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = Point::new(37.6517, 55.574371);
        assert_eq!(great_circle_distance(p, p), 0.0);
    }

    #[test]
    fn test_path_length() {
        let a = Point::new(37.20829, 55.611087);
        let b = Point::new(37.209755, 55.595884);
        let c = Point::new(37.333324, 55.632761);

        let expected = great_circle_distance(a, b) + great_circle_distance(b, c);
        assert!((path_length([a, b, c]) - expected).abs() < 1e-9);
        assert_eq!(path_length([a]), 0.0);
        assert_eq!(path_length(Vec::<Point>::new()), 0.0);
    }
}
