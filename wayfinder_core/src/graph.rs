use fxhash::FxHashMap;

use crate::geopoint::GeoPoint;
use crate::model::NetworkSegment;
use crate::weighting::Weighting;

/// Tunable thresholds for graph construction. Both trade false merges
/// against disconnected graphs; the defaults match the campus data the
/// engine was calibrated on.
#[derive(Copy, Clone, Debug)]
pub struct GraphConfig {
    /// Raw points closer than this collapse into one canonical node.
    /// Independently drawn lines rarely share bit-identical coordinates.
    pub normalization_threshold: f64,
    /// Canonical nodes closer than this get linked even when no line
    /// connects them. Repairs lines that visually cross or touch
    /// without sharing a vertex.
    pub intersection_threshold: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            normalization_threshold: 0.5,
            intersection_threshold: 5.0,
        }
    }
}

type RawKey = (u64, u64);

fn raw_key(point: &GeoPoint) -> RawKey {
    (point.lng.to_bits(), point.lat.to_bits())
}

/// Weighted undirected point graph over canonical nodes. Built fresh per
/// query from one floor's or the outdoor segment set; never persisted.
pub struct SpatialGraph {
    nodes: Vec<GeoPoint>,
    adjacency: Vec<FxHashMap<usize, f64>>,
    index: FxHashMap<RawKey, usize>,
}

impl SpatialGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &GeoPoint {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[GeoPoint] {
        &self.nodes
    }

    pub fn neighbors(&self, id: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[id].iter().map(|(&node, &weight)| (node, weight))
    }

    pub fn edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        self.adjacency[from].get(&to).copied()
    }

    /// The canonical node a raw coordinate was snapped to, if the
    /// coordinate appeared in the source segments.
    pub fn canonical_node(&self, point: &GeoPoint) -> Option<usize> {
        self.index.get(&raw_key(point)).copied()
    }

    /// Edges are only tightened, never loosened: duplicate connections
    /// keep the minimum weight.
    fn tighten_edge(&mut self, a: usize, b: usize, weight: f64) {
        let entry = self.adjacency[a].entry(b).or_insert(f64::INFINITY);
        if weight < *entry {
            *entry = weight;
        }
        let entry = self.adjacency[b].entry(a).or_insert(f64::INFINITY);
        if weight < *entry {
            *entry = weight;
        }
    }
}

/// Builds the spatial graph for one segment set. One builder serves both
/// indoor and outdoor graphs; mode selection happens upstream and edge
/// cost is pluggable through `Weighting`.
///
/// O(n^2) in raw points: acceptable because a call only ever sees one
/// floor's or one structure's segments, low hundreds of points.
pub fn build_graph<W: Weighting>(
    segments: &[NetworkSegment],
    config: &GraphConfig,
    weighting: &W,
) -> SpatialGraph {
    let mut graph = SpatialGraph {
        nodes: Vec::new(),
        adjacency: Vec::new(),
        index: FxHashMap::default(),
    };

    let raw_points: Vec<GeoPoint> = segments
        .iter()
        .flat_map(|segment| segment.usable_lines().flatten().copied())
        .collect();

    // Normalization pass: the first point of each near-coincident cluster
    // becomes the canonical node for the whole cluster.
    for i in 0..raw_points.len() {
        let point = raw_points[i];
        if graph.index.contains_key(&raw_key(&point)) {
            continue;
        }

        let id = graph.nodes.len();
        graph.nodes.push(point);
        graph.adjacency.push(FxHashMap::default());
        graph.index.insert(raw_key(&point), id);

        for other in &raw_points[i + 1..] {
            let key = raw_key(other);
            if graph.index.contains_key(&key) {
                continue;
            }
            if point.haversine_distance(other) < config.normalization_threshold {
                graph.index.insert(key, id);
            }
        }
    }

    // Edge pass: weights come from the original, non-snapped points so
    // normalization never shortens a corridor.
    for segment in segments {
        for line in segment.usable_lines() {
            for pair in line.windows(2) {
                let a = graph.index[&raw_key(&pair[0])];
                let b = graph.index[&raw_key(&pair[1])];
                if a == b {
                    continue;
                }
                let weight = weighting.edge_weight(&pair[0], &pair[1], &segment.properties);
                graph.tighten_edge(a, b, weight);
            }
        }
    }

    // Intersection pass: link disjoint lines that pass close enough to
    // be physically connected.
    for a in 0..graph.nodes.len() {
        for b in a + 1..graph.nodes.len() {
            let distance = graph.nodes[a].haversine_distance(&graph.nodes[b]);
            if distance < config.intersection_threshold {
                graph.tighten_edge(a, b, distance);
            }
        }
    }

    tracing::debug!(
        nodes = graph.node_count(),
        segments = segments.len(),
        "built spatial graph"
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SegmentProperties;
    use crate::weighting::GeodesicWeighting;

    fn segment(lines: Vec<Vec<GeoPoint>>) -> NetworkSegment {
        NetworkSegment {
            id: 0,
            name: None,
            lines,
            properties: SegmentProperties::default(),
        }
    }

    // Roughly 0.3m of longitude at the equator
    const LNG_30_CM: f64 = 0.0000027;
    // Roughly 100m of longitude at the equator
    const LNG_100_M: f64 = 0.0009;

    #[test]
    fn endpoints_within_normalization_threshold_merge() {
        let segments = vec![
            segment(vec![vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(LNG_100_M, 0.0)]]),
            segment(vec![vec![
                GeoPoint::new(LNG_100_M + LNG_30_CM, 0.0),
                GeoPoint::new(2.0 * LNG_100_M, 0.0),
            ]]),
        ];

        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        // Four raw points, but the two near-coincident endpoints share a node
        assert_eq!(graph.node_count(), 3);

        let shared = graph
            .canonical_node(&GeoPoint::new(LNG_100_M, 0.0))
            .unwrap();
        let also_shared = graph
            .canonical_node(&GeoPoint::new(LNG_100_M + LNG_30_CM, 0.0))
            .unwrap();
        assert_eq!(shared, also_shared);
    }

    #[test]
    fn edges_are_symmetric() {
        let segments = vec![segment(vec![vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(LNG_100_M, 0.0),
        ]])];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let a = graph.canonical_node(&GeoPoint::new(0.0, 0.0)).unwrap();
        let b = graph.canonical_node(&GeoPoint::new(LNG_100_M, 0.0)).unwrap();

        let forward = graph.edge_weight(a, b).unwrap();
        let backward = graph.edge_weight(b, a).unwrap();
        assert!(backward <= forward);
        assert!(forward <= backward);
    }

    #[test]
    fn duplicate_connections_keep_minimum_weight() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(LNG_100_M, 0.0);
        let segments = vec![
            segment(vec![vec![a, b]]),
            segment(vec![vec![a, b]]),
        ];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);
        let na = graph.canonical_node(&a).unwrap();
        let nb = graph.canonical_node(&b).unwrap();
        assert_eq!(
            graph.edge_weight(na, nb).unwrap(),
            a.haversine_distance(&b)
        );
    }

    #[test]
    fn disjoint_lines_within_intersection_threshold_are_linked() {
        // Two parallel lines about 3m apart that never share a vertex
        let lng_3_m = 0.000027;
        let segments = vec![
            segment(vec![vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(LNG_100_M, 0.0)]]),
            segment(vec![vec![
                GeoPoint::new(0.0, lng_3_m),
                GeoPoint::new(LNG_100_M, lng_3_m),
            ]]),
        ];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let a = graph.canonical_node(&GeoPoint::new(0.0, 0.0)).unwrap();
        let b = graph.canonical_node(&GeoPoint::new(0.0, lng_3_m)).unwrap();
        assert!(graph.edge_weight(a, b).is_some());
    }

    #[test]
    fn degenerate_lines_are_skipped_not_fatal() {
        let segments = vec![
            segment(vec![vec![GeoPoint::new(0.0, 0.0)]]),
            segment(vec![vec![GeoPoint::new(0.1, 0.0), GeoPoint::new(0.2, 0.0)]]),
        ];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = build_graph(&[], &GraphConfig::default(), &GeodesicWeighting);
        assert!(graph.is_empty());
    }
}
