use rstar::{AABB, Envelope, PointDistance, RTreeObject};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6_371_000.0;

/// A WGS84 coordinate. Serialized as a `[lng, lat]` pair, which is how
/// campus geometry bundles and route polylines are exchanged.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> GeoPoint {
        GeoPoint { lng, lat }
    }

    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(value: [f64; 2]) -> Self {
        GeoPoint::new(value[0], value[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(value: GeoPoint) -> Self {
        [value.lng, value.lat]
    }
}

impl From<geo_types::Coord<f64>> for GeoPoint {
    fn from(value: geo_types::Coord<f64>) -> Self {
        GeoPoint::new(value.x, value.y)
    }
}

impl RTreeObject for GeoPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

impl PointDistance for GeoPoint {
    fn distance_2(&self, point: &<Self::Envelope as Envelope>::Point) -> f64 {
        self.haversine_distance(&GeoPoint::new(point[0], point[1])).powi(2)
    }
}

/// Length of a polyline in meters.
pub fn polyline_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].haversine_distance(&pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_of_identical_points_is_zero() {
        let p = GeoPoint::new(-48.9445, -16.2934);
        assert_eq!(p.haversine_distance(&p), 0.0);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let distance = a.haversine_distance(&b);
        // One degree of latitude is roughly 111.2 km
        assert!((distance - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoPoint::new(-48.9445, -16.2934);
        let b = GeoPoint::new(-48.9701, -16.3650);
        assert_eq!(a.haversine_distance(&b), b.haversine_distance(&a));
    }

    #[test]
    fn polyline_distance_sums_consecutive_pairs() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.0, 0.002),
        ];
        let total = polyline_distance(&points);
        let direct = points[0].haversine_distance(&points[2]);
        assert!((total - direct).abs() < 1e-6);
    }
}
