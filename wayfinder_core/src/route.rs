use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;
use crate::model::{Room, RoomId, StructureId, TravelMode};

/// One route query. A missing start degrades the call to metadata-only:
/// structure and rooms for map rendering, no segments.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub start: Option<GeoPoint>,
    pub destination_room_id: RoomId,
    #[serde(default)]
    pub mode: TravelMode,
}

/// Closed set of segment shapes; serialization handles each exhaustively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    External,
    Internal,
    Transition,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub mode: TravelMode,
    pub path: Vec<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    pub distance: f64,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub external_distance: f64,
    pub internal_distance: f64,
    pub floors_traversed: Vec<i32>,
}

/// Destination structure metadata with `floors` filtered down to the
/// floors the route actually touches.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInfo {
    pub id: StructureId,
    pub name: String,
    pub centroid: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Vec<GeoPoint>>,
    pub floors: Vec<i32>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub segments: Vec<RouteSegment>,
    pub total_distance: f64,
    pub estimated_time: f64,
    pub destination: RoomId,
    pub summary: RouteSummary,
    pub structure: StructureInfo,
    pub rooms_by_floor: BTreeMap<i32, Vec<Room>>,
    /// False when the entrance resolver fell back from main-entrance
    /// doors to the full door set (or when no route was computed).
    pub main_entrance_used: bool,
}
