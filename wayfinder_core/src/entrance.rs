use crate::geopoint::GeoPoint;
use crate::store::FloorSegment;

/// The door a route enters a structure through.
#[derive(Debug, Copy, Clone)]
pub struct Entrance {
    pub point: GeoPoint,
    pub floor: i32,
    pub distance: f64,
    /// False when the resolver fell back from main-entrance-flagged
    /// doors to the full door set. Surfaced in the response so callers
    /// can tell a side door was used.
    pub main_entrance: bool,
}

/// Nearest usable door of a structure to an outdoor position. Two-pass:
/// main-entrance-flagged doors win over secondary doors whenever any
/// exist; otherwise every door competes. `None` means the structure has
/// no door segments at all, which is fatal to the whole route query.
pub fn find_entrance(
    segments: &[FloorSegment],
    position: &GeoPoint,
    floor: Option<i32>,
) -> Option<Entrance> {
    let candidates: Vec<&FloorSegment> = segments
        .iter()
        .filter(|fs| fs.segment.properties.is_door)
        .filter(|fs| floor.is_none_or(|f| fs.floor == f))
        .collect();

    let main_doors: Vec<&FloorSegment> = candidates
        .iter()
        .copied()
        .filter(|fs| fs.segment.properties.is_main_entrance)
        .collect();

    if let Some(entrance) = nearest_door(&main_doors, position, true) {
        return Some(entrance);
    }

    if !main_doors.is_empty() {
        tracing::warn!("main entrance doors carry no usable geometry, trying all doors");
    }

    nearest_door(&candidates, position, false)
}

fn nearest_door(doors: &[&FloorSegment], position: &GeoPoint, main: bool) -> Option<Entrance> {
    let mut nearest: Option<Entrance> = None;

    for fs in doors {
        for point in fs.segment.points() {
            let distance = position.haversine_distance(point);
            let closer = nearest
                .as_ref()
                .is_none_or(|entrance| distance < entrance.distance);
            if closer {
                nearest = Some(Entrance {
                    point: *point,
                    floor: fs.floor,
                    distance,
                    main_entrance: main,
                });
            }
        }
    }

    nearest
}
