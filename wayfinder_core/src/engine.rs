use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{GraphCache, NoCache, segment_set_hash};
use crate::dijkstra::shortest_path;
use crate::entrance::{Entrance, find_entrance};
use crate::error::RouteError;
use crate::estimate::estimated_minutes;
use crate::floors::{FloorConfig, FloorConnectivity};
use crate::geopoint::{GeoPoint, polyline_distance};
use crate::graph::{GraphConfig, SpatialGraph, build_graph};
use crate::model::{ConnectorKind, NetworkSegment, Room, Structure, TravelMode};
use crate::reconstruct::reconstruct_polyline;
use crate::route::{
    RouteRequest, RouteResponse, RouteSegment, RouteSummary, SegmentKind, StructureInfo,
};
use crate::snap::NodeIndex;
use crate::store::CampusStore;
use crate::weighting::GeodesicWeighting;

#[derive(Copy, Clone, Debug)]
pub struct EngineConfig {
    pub graph: GraphConfig,
    pub floors: FloorConfig,
    /// Indoor lookups must land close to a corridor; a loose tolerance
    /// here routes people through walls.
    pub indoor_snap_tolerance: f64,
    /// Outdoor networks are sparse, so starts far from any drawn path
    /// still connect.
    pub outdoor_snap_tolerance: f64,
    /// Starts closer than this to the entrance skip the external leg.
    pub entrance_skip_distance: f64,
    /// Raw start/end points get appended to a reconstructed polyline
    /// when the path ends farther away than this.
    pub endpoint_stitch_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            graph: GraphConfig::default(),
            floors: FloorConfig::default(),
            indoor_snap_tolerance: 50.0,
            outdoor_snap_tolerance: 10_000.0,
            entrance_skip_distance: 5.0,
            endpoint_stitch_distance: 5.0,
        }
    }
}

/// The route assembler: resolves the destination, finds the entrance,
/// computes the external leg, plans the floor sequence, and walks each
/// floor to its connector or to the destination. Stateless between
/// queries; the injected cache is the only shared structure.
pub struct RouteEngine<S, C = NoCache> {
    store: S,
    cache: C,
    config: EngineConfig,
}

impl<S: CampusStore> RouteEngine<S, NoCache> {
    pub fn new(store: S) -> RouteEngine<S, NoCache> {
        RouteEngine {
            store,
            cache: NoCache,
            config: EngineConfig::default(),
        }
    }
}

impl<S: CampusStore, C: GraphCache> RouteEngine<S, C> {
    pub fn with_cache(store: S, cache: C) -> RouteEngine<S, C> {
        RouteEngine {
            store,
            cache,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(store: S, cache: C, config: EngineConfig) -> RouteEngine<S, C> {
        RouteEngine {
            store,
            cache,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Complete travel path from an outdoor position to a destination
    /// room. Any resolution failure aborts the whole computation; the
    /// response is never a partial route.
    pub fn route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        let room = self
            .store
            .room(request.destination_room_id)
            .ok_or(RouteError::RoomNotFound(request.destination_room_id))?;
        let structure = self
            .store
            .structure(room.structure_id)
            .ok_or(RouteError::StructureNotFound(room.structure_id))?;

        let Some(start) = request.start else {
            debug!(room = room.id, "no start position, returning metadata only");
            return Ok(self.metadata_only(&room, &structure));
        };
        validate_coordinate(&start)?;

        let destination = room
            .target_point()
            .ok_or_else(|| RouteError::InvalidInput(format!("room {} has no centroid", room.id)))?;

        info!(
            room = room.id,
            structure = structure.id,
            floor = room.floor,
            mode = ?request.mode,
            "computing complete route"
        );

        let indoor = self.store.indoor_segments(structure.id);
        let entrance = find_entrance(&indoor, &start, None)
            .ok_or(RouteError::NoEntrance(structure.id))?;
        debug!(
            floor = entrance.floor,
            distance = entrance.distance,
            main = entrance.main_entrance,
            "resolved entrance"
        );

        let mut segments: Vec<RouteSegment> = Vec::new();

        if entrance.distance > self.config.entrance_skip_distance {
            segments.push(self.external_leg(&start, &entrance, request.mode));
        } else {
            debug!("start is at the entrance, skipping external leg");
        }

        self.indoor_legs(&structure, entrance.point, entrance.floor, destination, room.floor, &mut segments)?;

        let total_distance: f64 = segments.iter().map(|s| s.distance).sum();
        let estimated_time = estimated_minutes(&segments);

        let mut floors_traversed: Vec<i32> = segments
            .iter()
            .filter(|s| s.kind != SegmentKind::External)
            .filter_map(|s| s.floor)
            .collect();
        floors_traversed.sort_unstable();
        floors_traversed.dedup();

        let mut all_floors = floors_traversed.clone();
        for floor in [entrance.floor, room.floor] {
            if !all_floors.contains(&floor) {
                all_floors.push(floor);
            }
        }
        all_floors.sort_unstable();

        let summary = RouteSummary {
            external_distance: kind_distance(&segments, SegmentKind::External),
            internal_distance: kind_distance(&segments, SegmentKind::Internal),
            floors_traversed,
        };

        info!(
            total = total_distance,
            minutes = estimated_time,
            segments = segments.len(),
            "route complete"
        );

        Ok(RouteResponse {
            segments,
            total_distance,
            estimated_time,
            destination: room.id,
            summary,
            rooms_by_floor: self.rooms_by_floor(structure.id, &all_floors),
            structure: structure_info(&structure, all_floors),
            main_entrance_used: entrance.main_entrance,
        })
    }

    /// Scenario: destination known, start unknown. Structure and rooms
    /// for map rendering, no route.
    fn metadata_only(&self, room: &Room, structure: &Structure) -> RouteResponse {
        let floors = structure.floors.clone();
        RouteResponse {
            segments: Vec::new(),
            total_distance: 0.0,
            estimated_time: 0.0,
            destination: room.id,
            summary: RouteSummary::default(),
            rooms_by_floor: self.rooms_by_floor(structure.id, &floors),
            structure: structure_info(structure, floors),
            main_entrance_used: false,
        }
    }

    fn rooms_by_floor(&self, structure: u64, floors: &[i32]) -> BTreeMap<i32, Vec<Room>> {
        let rooms = self.store.rooms_on_floors(structure, floors);
        let mut by_floor: BTreeMap<i32, Vec<Room>> = BTreeMap::new();
        for floor in floors {
            by_floor.insert(*floor, Vec::new());
        }
        for room in rooms {
            by_floor.entry(room.floor).or_default().push(room);
        }
        by_floor
    }

    /// The outdoor leg to the entrance. Outdoor segments are filtered by
    /// the requested mode (untagged segments count as walking); when no
    /// segment matches the mode, the whole network is used with a looser
    /// tolerance. If the network cannot connect start and entrance the
    /// leg degrades to a straight line rather than aborting: the
    /// destination is still reachable, the outdoor drawing just does not
    /// cover the approach.
    fn external_leg(&self, start: &GeoPoint, entrance: &Entrance, mode: TravelMode) -> RouteSegment {
        let outdoor = self.store.outdoor_segments();
        let matching: Vec<NetworkSegment> = outdoor
            .iter()
            .filter(|s| s.properties.mode.unwrap_or(TravelMode::Walking) == mode)
            .cloned()
            .collect();

        let (segments, tolerance) = if matching.is_empty() {
            debug!(?mode, "no mode-specific outdoor segments, using all");
            (&outdoor, self.config.outdoor_snap_tolerance * 2.0)
        } else {
            (&matching, self.config.outdoor_snap_tolerance)
        };

        let path = self
            .outdoor_path(segments, start, &entrance.point, tolerance)
            .unwrap_or_else(|| {
                debug!("outdoor network cannot connect start to entrance, straight line");
                vec![*start, entrance.point]
            });

        let distance = polyline_distance(&path);
        let description = match mode {
            TravelMode::Driving => format!("Drive to the entrance ({distance:.0}m)"),
            TravelMode::Walking => format!("Walk to the entrance ({distance:.0}m)"),
        };

        RouteSegment {
            kind: SegmentKind::External,
            mode,
            path,
            floor: None,
            distance,
            description,
        }
    }

    fn outdoor_path(
        &self,
        segments: &[NetworkSegment],
        start: &GeoPoint,
        end: &GeoPoint,
        tolerance: f64,
    ) -> Option<Vec<GeoPoint>> {
        let graph = self.build_cached_graph(segments);
        if graph.is_empty() {
            return None;
        }

        let index = NodeIndex::build(&graph);
        let from = index.snap(start, tolerance)?;
        let to = index.snap(end, tolerance)?;
        debug!(
            from = from.distance,
            to = to.distance,
            "snapped outdoor endpoints"
        );

        let node_path = shortest_path(&graph, from.node, to.node);
        if node_path.is_empty() {
            return None;
        }

        let mut path = reconstruct_polyline(&graph, segments, &node_path);

        // Stitch the raw endpoints back on when the network entry points
        // sit away from them, so the rendered line reaches the user.
        if let Some(first) = path.first()
            && start.haversine_distance(first) > self.config.endpoint_stitch_distance
        {
            path.insert(0, *start);
        }
        if let Some(last) = path.last()
            && end.haversine_distance(last) > self.config.endpoint_stitch_distance
        {
            path.push(*end);
        }

        Some(path)
    }

    /// Indoor legs from the entrance to the destination centroid. Equal
    /// floors need a single in-floor path and never touch the floor
    /// graph; otherwise the floor graph plans the sequence and each
    /// traversed floor contributes a walk to its connector plus a
    /// transition.
    fn indoor_legs(
        &self,
        structure: &Structure,
        entry_point: GeoPoint,
        entry_floor: i32,
        destination: GeoPoint,
        destination_floor: i32,
        segments: &mut Vec<RouteSegment>,
    ) -> Result<(), RouteError> {
        if entry_floor == destination_floor {
            let path = self.indoor_path(structure.id, entry_floor, &entry_point, &destination)?;
            segments.push(internal_segment(path, entry_floor, "to the destination"));
            return Ok(());
        }

        let indoor = self.store.indoor_segments(structure.id);
        let connectivity = FloorConnectivity::build(&indoor, &self.config.floors);
        let floor_sequence = connectivity
            .floor_path(entry_floor, destination_floor)
            .ok_or(RouteError::FloorUnreachable {
                from: entry_floor,
                to: destination_floor,
            })?;
        debug!(?floor_sequence, "planned floor sequence");

        let mut current = entry_point;

        for pair in floor_sequence.windows(2) {
            let (floor, next_floor) = (pair[0], pair[1]);

            // The connector whose near-side point is closest to where we
            // stand on this floor.
            let connector = connectivity
                .connections_between(floor, next_floor)
                .filter_map(|c| c.oriented(floor, next_floor).map(|points| (c, points)))
                .min_by(|(_, (a, _)), (_, (b, _))| {
                    current
                        .haversine_distance(a)
                        .total_cmp(&current.haversine_distance(b))
                })
                .ok_or(RouteError::FloorUnreachable {
                    from: floor,
                    to: next_floor,
                })?;
            let (connection, (near, far)) = connector;

            let path = self.indoor_path(structure.id, floor, &current, &near)?;
            segments.push(internal_segment(path, floor, "to the connector"));

            segments.push(RouteSegment {
                kind: SegmentKind::Transition,
                mode: TravelMode::Walking,
                path: vec![near, far],
                floor: Some(next_floor),
                distance: connection.cost,
                description: transition_description(connection.kind, floor, next_floor),
            });

            current = far;
        }

        let final_floor = *floor_sequence.last().expect("floor sequence is non-empty");
        let path = self.indoor_path(structure.id, final_floor, &current, &destination)?;
        segments.push(internal_segment(path, final_floor, "to the destination"));

        Ok(())
    }

    fn indoor_path(
        &self,
        structure: u64,
        floor: i32,
        start: &GeoPoint,
        end: &GeoPoint,
    ) -> Result<Vec<GeoPoint>, RouteError> {
        let segments = self.store.indoor_segments_on_floor(structure, floor);
        let graph = self.build_cached_graph(&segments);
        if graph.is_empty() {
            return Err(RouteError::NoIndoorPath { floor });
        }

        let index = NodeIndex::build(&graph);
        let from = index
            .snap(start, self.config.indoor_snap_tolerance)
            .ok_or(RouteError::NoIndoorPath { floor })?;
        let to = index
            .snap(end, self.config.indoor_snap_tolerance)
            .ok_or(RouteError::NoIndoorPath { floor })?;
        debug!(
            floor,
            from = from.distance,
            to = to.distance,
            "snapped indoor endpoints"
        );

        let node_path = shortest_path(&graph, from.node, to.node);
        if node_path.is_empty() {
            return Err(RouteError::NoIndoorPath { floor });
        }

        Ok(reconstruct_polyline(&graph, &segments, &node_path))
    }

    fn build_cached_graph(&self, segments: &[NetworkSegment]) -> Arc<SpatialGraph> {
        let key = segment_set_hash(segments);
        self.cache.get_or_build(key, &mut || {
            build_graph(segments, &self.config.graph, &GeodesicWeighting)
        })
    }
}

fn validate_coordinate(point: &GeoPoint) -> Result<(), RouteError> {
    if !point.lng.is_finite() || !point.lat.is_finite() {
        return Err(RouteError::InvalidInput("non-finite coordinate".to_string()));
    }
    if point.lng.abs() > 180.0 || point.lat.abs() > 90.0 {
        return Err(RouteError::InvalidInput(format!(
            "coordinate [{}, {}] out of range",
            point.lng, point.lat
        )));
    }
    Ok(())
}

fn kind_distance(segments: &[RouteSegment], kind: SegmentKind) -> f64 {
    segments
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.distance)
        .sum()
}

fn internal_segment(path: Vec<GeoPoint>, floor: i32, target: &str) -> RouteSegment {
    let distance = polyline_distance(&path);
    RouteSegment {
        kind: SegmentKind::Internal,
        mode: TravelMode::Walking,
        path,
        floor: Some(floor),
        distance,
        description: format!("Floor {floor} - {target} ({distance:.0}m)"),
    }
}

fn transition_description(kind: ConnectorKind, from: i32, to: i32) -> String {
    match kind {
        ConnectorKind::Stairs if to > from => format!("Take the stairs up: floor {from} to {to}"),
        ConnectorKind::Stairs => format!("Take the stairs down: floor {from} to {to}"),
        ConnectorKind::LevelPassage => format!("Cross the passage: floor {from} to {to}"),
    }
}

fn structure_info(structure: &Structure, floors: Vec<i32>) -> StructureInfo {
    StructureInfo {
        id: structure.id,
        name: structure.name.clone(),
        centroid: structure.centroid,
        footprint: structure.footprint.clone(),
        floors,
    }
}
