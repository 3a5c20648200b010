use geo::Centroid;
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

pub type StructureId = u64;
pub type RoomId = u64;
pub type SegmentId = u64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
}

/// How a connector physically crosses floors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Stairs,
    LevelPassage,
}

/// Explicit connector metadata on a segment: a feature drawn once that
/// spans two floors, such as a ramp or an inter-building sky bridge.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ConnectorSpan {
    pub from_floor: i32,
    pub to_floor: i32,
    pub kind: ConnectorKind,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentProperties {
    pub is_door: bool,
    pub is_main_entrance: bool,
    pub is_stairs: bool,
    pub is_bathroom: bool,
    /// Outdoor segments only. Absent means the segment is walkable.
    pub mode: Option<TravelMode>,
    pub connector: Option<ConnectorSpan>,
}

/// A named or anonymous line-network record: one or more polylines plus
/// tagging metadata. The same shape serves outdoor paths/roads and
/// per-floor indoor corridors; the store keys indoor segments by
/// structure and floor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub id: SegmentId,
    pub name: Option<String>,
    pub lines: Vec<Vec<GeoPoint>>,
    pub properties: SegmentProperties,
}

impl NetworkSegment {
    /// Lines that can contribute edges. Degenerate lines (fewer than two
    /// points) are skipped rather than failing the whole build.
    pub fn usable_lines(&self) -> impl Iterator<Item = &[GeoPoint]> {
        self.lines
            .iter()
            .filter(|line| line.len() >= 2)
            .map(Vec::as_slice)
    }

    pub fn points(&self) -> impl Iterator<Item = &GeoPoint> {
        self.lines.iter().flatten()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub id: StructureId,
    pub name: String,
    pub footprint: Option<Vec<GeoPoint>>,
    pub centroid: GeoPoint,
    pub floors: Vec<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub structure_id: StructureId,
    pub floor: i32,
    pub name: String,
    pub footprint: Option<Vec<GeoPoint>>,
    pub centroid: Option<GeoPoint>,
    pub searchable: bool,
}

impl Room {
    /// The point routing targets: the stored centroid, or the average of
    /// the footprint ring when no centroid was recorded.
    pub fn target_point(&self) -> Option<GeoPoint> {
        if let Some(centroid) = self.centroid {
            return Some(centroid);
        }
        self.footprint.as_deref().and_then(ring_centroid)
    }
}

/// Centroid of a polygon ring, used as the routing target for rooms and
/// structures that carry a footprint but no recorded centroid. Degenerate
/// rings (zero area) fall back to the boundary centroid.
pub fn ring_centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    if ring.is_empty() {
        return None;
    }
    let exterior: LineString<f64> = ring
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect();
    let polygon = Polygon::new(exterior, Vec::new());
    polygon.centroid().map(|c| GeoPoint::from(c.0))
}
