use crate::geopoint::GeoPoint;
use crate::model::SegmentProperties;

/// Edge cost seam for the graph builder. Indoor and outdoor graphs share
/// one builder; anything mode-specific plugs in here instead of forking
/// the construction logic.
pub trait Weighting {
    fn edge_weight(&self, a: &GeoPoint, b: &GeoPoint, properties: &SegmentProperties) -> f64;
}

/// Default cost: great-circle distance between the original points.
pub struct GeodesicWeighting;

impl Weighting for GeodesicWeighting {
    fn edge_weight(&self, a: &GeoPoint, b: &GeoPoint, _properties: &SegmentProperties) -> f64 {
        a.haversine_distance(b)
    }
}
