use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fxhash::FxHashMap;

use crate::geopoint::GeoPoint;
use crate::model::ConnectorKind;
use crate::store::FloorSegment;

/// Thresholds for discovering vertical connectors. Stair footprints on
/// different floors are rarely coordinate-aligned, hence the loose
/// default; doors that double as level passages must align tightly.
#[derive(Copy, Clone, Debug)]
pub struct FloorConfig {
    pub vertical_adjacency_threshold: f64,
    pub door_alignment_threshold: f64,
    /// Fixed traversal cost for any connector. The physical effort of a
    /// flight of stairs is not a function of horizontal distance.
    pub transition_cost: f64,
}

impl Default for FloorConfig {
    fn default() -> Self {
        FloorConfig {
            vertical_adjacency_threshold: 10.0,
            door_alignment_threshold: 5.0,
            transition_cost: 3.0,
        }
    }
}

/// A physical way to change floors: a representative point on each side
/// and a fixed traversal cost.
#[derive(Debug, Clone)]
pub struct FloorConnection {
    pub from_floor: i32,
    pub to_floor: i32,
    pub from_point: GeoPoint,
    pub to_point: GeoPoint,
    pub cost: f64,
    pub kind: ConnectorKind,
}

impl FloorConnection {
    /// The connection's point pair oriented as `a -> b`, if it links
    /// those two floors in either direction.
    pub fn oriented(&self, a: i32, b: i32) -> Option<(GeoPoint, GeoPoint)> {
        if self.from_floor == a && self.to_floor == b {
            Some((self.from_point, self.to_point))
        } else if self.from_floor == b && self.to_floor == a {
            Some((self.to_point, self.from_point))
        } else {
            None
        }
    }
}

/// The floor graph of one structure: nodes are floor numbers, edges are
/// connectors. Built once per structure per query.
pub struct FloorConnectivity {
    connections: Vec<FloorConnection>,
}

impl FloorConnectivity {
    /// Scans a structure's indoor segments and classifies connectors:
    /// explicit spans (ramps, sky bridges) carrying from/to metadata,
    /// stair points adjacent across floors, and doors that align across
    /// floors acting as extra level passages.
    pub fn build(segments: &[FloorSegment], config: &FloorConfig) -> FloorConnectivity {
        let mut connections = Vec::new();

        for fs in segments {
            let Some(span) = fs.segment.properties.connector else {
                continue;
            };
            let mut points = fs.segment.points();
            let Some(first) = points.next().copied() else {
                continue;
            };
            let last = points.last().copied().unwrap_or(first);
            connections.push(FloorConnection {
                from_floor: span.from_floor,
                to_floor: span.to_floor,
                from_point: first,
                to_point: last,
                cost: config.transition_cost,
                kind: span.kind,
            });
        }

        let stairs = points_by_floor(segments, |fs| fs.segment.properties.is_stairs);
        connect_adjacent_floors(
            &stairs,
            config.vertical_adjacency_threshold,
            config.transition_cost,
            ConnectorKind::Stairs,
            &mut connections,
        );

        let doors = points_by_floor(segments, |fs| fs.segment.properties.is_door);
        connect_adjacent_floors(
            &doors,
            config.door_alignment_threshold,
            config.transition_cost,
            ConnectorKind::LevelPassage,
            &mut connections,
        );

        tracing::debug!(connections = connections.len(), "mapped floor connectivity");

        FloorConnectivity { connections }
    }

    pub fn connections(&self) -> &[FloorConnection] {
        &self.connections
    }

    pub fn connections_between(
        &self,
        a: i32,
        b: i32,
    ) -> impl Iterator<Item = &FloorConnection> {
        self.connections
            .iter()
            .filter(move |c| c.oriented(a, b).is_some())
    }

    /// Dijkstra over the floor graph. Returns the ordered floor sequence
    /// from `start` to `end`, or `None` when no connector chain links
    /// them. Floors are tiny graphs, but a detour through a third floor
    /// can genuinely be the only option, so this is a real search, not a
    /// consecutive-floor walk.
    pub fn floor_path(&self, start: i32, end: i32) -> Option<Vec<i32>> {
        if start == end {
            return Some(vec![start]);
        }

        let mut floors: Vec<i32> = self
            .connections
            .iter()
            .flat_map(|c| [c.from_floor, c.to_floor])
            .chain([start, end])
            .collect();
        floors.sort_unstable();
        floors.dedup();

        let index: FxHashMap<i32, usize> =
            floors.iter().enumerate().map(|(i, &f)| (f, i)).collect();

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); floors.len()];
        for c in &self.connections {
            let a = index[&c.from_floor];
            let b = index[&c.to_floor];
            adjacency[a].push((b, c.cost));
            adjacency[b].push((a, c.cost));
        }

        let mut distance = vec![f64::INFINITY; floors.len()];
        let mut parent = vec![usize::MAX; floors.len()];
        let mut heap = BinaryHeap::new();

        let start_idx = index[&start];
        let end_idx = index[&end];
        distance[start_idx] = 0.0;
        heap.push(FloorHeapItem {
            floor: start_idx,
            cost: 0.0,
        });

        while let Some(FloorHeapItem { floor, cost }) = heap.pop() {
            if cost > distance[floor] {
                continue;
            }
            if floor == end_idx {
                break;
            }
            for &(next, edge_cost) in &adjacency[floor] {
                let alt = cost + edge_cost;
                if alt < distance[next] {
                    distance[next] = alt;
                    parent[next] = floor;
                    heap.push(FloorHeapItem {
                        floor: next,
                        cost: alt,
                    });
                }
            }
        }

        if distance[end_idx].is_infinite() {
            return None;
        }

        let mut path = vec![floors[end_idx]];
        let mut current = end_idx;
        while parent[current] != usize::MAX {
            current = parent[current];
            path.push(floors[current]);
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Copy, Clone)]
struct FloorHeapItem {
    floor: usize,
    cost: f64,
}

impl PartialEq for FloorHeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.floor == other.floor
    }
}

impl Eq for FloorHeapItem {}

impl PartialOrd for FloorHeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloorHeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.floor.cmp(&other.floor))
    }
}

fn points_by_floor(
    segments: &[FloorSegment],
    select: impl Fn(&FloorSegment) -> bool,
) -> FxHashMap<i32, Vec<GeoPoint>> {
    let mut by_floor: FxHashMap<i32, Vec<GeoPoint>> = FxHashMap::default();
    for fs in segments {
        if !select(fs) {
            continue;
        }
        by_floor
            .entry(fs.floor)
            .or_default()
            .extend(fs.segment.points().copied());
    }
    by_floor
}

/// For every pair of adjacent floor numbers, pair each lower-floor point
/// with its closest upper-floor counterpart within `threshold`.
fn connect_adjacent_floors(
    points: &FxHashMap<i32, Vec<GeoPoint>>,
    threshold: f64,
    cost: f64,
    kind: ConnectorKind,
    out: &mut Vec<FloorConnection>,
) {
    let mut floors: Vec<i32> = points.keys().copied().collect();
    floors.sort_unstable();

    for pair in floors.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        for from_point in &points[&lower] {
            let best = points[&upper]
                .iter()
                .map(|p| (p, from_point.haversine_distance(p)))
                .filter(|(_, d)| *d < threshold)
                .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2));
            if let Some((to_point, _)) = best {
                out.push(FloorConnection {
                    from_floor: lower,
                    to_floor: upper,
                    from_point: *from_point,
                    to_point: *to_point,
                    cost,
                    kind,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectorSpan, NetworkSegment, SegmentProperties};

    fn floor_segment(floor: i32, lines: Vec<Vec<GeoPoint>>, properties: SegmentProperties) -> FloorSegment {
        FloorSegment {
            floor,
            segment: NetworkSegment {
                id: 0,
                name: None,
                lines,
                properties,
            },
        }
    }

    fn stairs(floor: i32, point: GeoPoint) -> FloorSegment {
        floor_segment(
            floor,
            vec![vec![point, GeoPoint::new(point.lng + 0.00002, point.lat)]],
            SegmentProperties {
                is_stairs: true,
                ..SegmentProperties::default()
            },
        )
    }

    #[test]
    fn explicit_connector_span_becomes_one_connection() {
        let segments = vec![floor_segment(
            2,
            vec![vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0)]],
            SegmentProperties {
                connector: Some(ConnectorSpan {
                    from_floor: 2,
                    to_floor: 3,
                    kind: ConnectorKind::LevelPassage,
                }),
                ..SegmentProperties::default()
            },
        )];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        assert_eq!(connectivity.connections().len(), 1);
        assert_eq!(connectivity.connections()[0].kind, ConnectorKind::LevelPassage);
    }

    #[test]
    fn stairs_across_adjacent_floors_connect_within_threshold() {
        // Stair footprints ~5m apart horizontally across floors 0 and 1
        let segments = vec![
            stairs(0, GeoPoint::new(0.0, 0.0)),
            stairs(1, GeoPoint::new(0.000045, 0.0)),
        ];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        let stairs_connections: Vec<_> = connectivity
            .connections()
            .iter()
            .filter(|c| c.kind == ConnectorKind::Stairs)
            .collect();
        assert!(!stairs_connections.is_empty());
        assert_eq!(stairs_connections[0].from_floor, 0);
        assert_eq!(stairs_connections[0].to_floor, 1);
    }

    #[test]
    fn distant_stairs_do_not_connect() {
        // ~100m apart, far beyond the 10m vertical adjacency threshold
        let segments = vec![
            stairs(0, GeoPoint::new(0.0, 0.0)),
            stairs(1, GeoPoint::new(0.0009, 0.0)),
        ];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        assert!(connectivity.connections().is_empty());
    }

    fn door(floor: i32, point: GeoPoint) -> FloorSegment {
        floor_segment(
            floor,
            vec![vec![point, GeoPoint::new(point.lng + 0.00002, point.lat)]],
            SegmentProperties {
                is_door: true,
                ..SegmentProperties::default()
            },
        )
    }

    #[test]
    fn aligned_doors_across_floors_become_level_passages() {
        // Doors ~3m apart horizontally on floors 0 and 1
        let segments = vec![
            door(0, GeoPoint::new(0.0, 0.0)),
            door(1, GeoPoint::new(0.000027, 0.0)),
        ];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        let passages: Vec<_> = connectivity
            .connections()
            .iter()
            .filter(|c| c.kind == ConnectorKind::LevelPassage)
            .collect();
        assert!(!passages.is_empty());
        assert_eq!(passages[0].from_floor, 0);
        assert_eq!(passages[0].to_floor, 1);
        assert_eq!(connectivity.floor_path(0, 1), Some(vec![0, 1]));
    }

    #[test]
    fn misaligned_doors_do_not_connect() {
        // ~11m apart, beyond the 5m door alignment threshold
        let segments = vec![
            door(0, GeoPoint::new(0.0, 0.0)),
            door(1, GeoPoint::new(0.0001, 0.0)),
        ];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        assert!(connectivity.connections().is_empty());
    }

    #[test]
    fn floor_path_spans_intermediate_floors() {
        let segments = vec![
            stairs(0, GeoPoint::new(0.0, 0.0)),
            stairs(1, GeoPoint::new(0.0, 0.0)),
            stairs(2, GeoPoint::new(0.0, 0.0)),
        ];

        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        assert_eq!(connectivity.floor_path(0, 2), Some(vec![0, 1, 2]));
    }

    #[test]
    fn unconnected_floors_have_no_path() {
        let segments = vec![stairs(0, GeoPoint::new(0.0, 0.0))];
        let connectivity = FloorConnectivity::build(&segments, &FloorConfig::default());
        assert_eq!(connectivity.floor_path(0, 3), None);
    }

    #[test]
    fn same_floor_path_is_trivial() {
        let connectivity = FloorConnectivity::build(&[], &FloorConfig::default());
        assert_eq!(connectivity.floor_path(1, 1), Some(vec![1]));
    }

    #[test]
    fn oriented_flips_direction() {
        let connection = FloorConnection {
            from_floor: 0,
            to_floor: 1,
            from_point: GeoPoint::new(0.0, 0.0),
            to_point: GeoPoint::new(1.0, 1.0),
            cost: 3.0,
            kind: ConnectorKind::Stairs,
        };

        let (from, to) = connection.oriented(1, 0).unwrap();
        assert_eq!(from.lng, 1.0);
        assert_eq!(to.lng, 0.0);
        assert!(connection.oriented(2, 3).is_none());
    }
}
