use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::SpatialGraph;

#[derive(Copy, Clone, Debug)]
struct HeapItem {
    node: usize,
    weight: f64,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &HeapItem) -> bool {
        self.weight == other.weight && self.node == other.node
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip weight to make this a min-heap; tie-break on node id so
        // repeated runs settle nodes in the same order.
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| self.node.cmp(&other.node))
    }
}

const INVALID_NODE: usize = usize::MAX;

/// Single-source Dijkstra over the spatial graph, terminating when the
/// target is settled. Returns the node sequence from `start` to `end`,
/// or an empty sequence when `end` is unreachable. Unreachability is a
/// normal outcome (disjoint components exist in real campus data), not
/// an error.
pub fn shortest_path(graph: &SpatialGraph, start: usize, end: usize) -> Vec<usize> {
    if graph.is_empty() {
        return Vec::new();
    }

    let mut distance = vec![f64::INFINITY; graph.node_count()];
    let mut parent = vec![INVALID_NODE; graph.node_count()];
    let mut settled = vec![false; graph.node_count()];

    let mut heap = BinaryHeap::with_capacity(graph.node_count());
    distance[start] = 0.0;
    heap.push(HeapItem {
        node: start,
        weight: 0.0,
    });

    while let Some(HeapItem { node, weight }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == end {
            break;
        }

        for (neighbor, edge_weight) in graph.neighbors(node) {
            let alt = weight + edge_weight;
            if alt < distance[neighbor] {
                distance[neighbor] = alt;
                parent[neighbor] = node;
                heap.push(HeapItem {
                    node: neighbor,
                    weight: alt,
                });
            }
        }
    }

    if !settled[end] && start != end {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current = end;
    while current != INVALID_NODE {
        path.push(current);
        if current == start {
            break;
        }
        current = parent[current];
    }

    if path.last() != Some(&start) {
        return Vec::new();
    }

    path.reverse();
    path
}

/// Total weight along a node sequence.
pub fn path_weight(graph: &SpatialGraph, path: &[usize]) -> f64 {
    path.windows(2)
        .map(|pair| graph.edge_weight(pair[0], pair[1]).unwrap_or(f64::INFINITY))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geopoint::GeoPoint;
    use crate::graph::{GraphConfig, build_graph};
    use crate::model::{NetworkSegment, SegmentProperties};
    use crate::weighting::GeodesicWeighting;

    fn segment(lines: Vec<Vec<GeoPoint>>) -> NetworkSegment {
        NetworkSegment {
            id: 0,
            name: None,
            lines,
            properties: SegmentProperties::default(),
        }
    }

    // Roughly 100m of longitude/latitude at the equator
    const STEP: f64 = 0.0009;

    #[test]
    fn picks_the_shorter_of_two_branches() {
        // Direct line a-b plus a detour a-c-b twice as long
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(STEP, 0.0);
        let c = GeoPoint::new(STEP / 2.0, STEP);
        let segments = vec![segment(vec![vec![a, b], vec![a, c, b]])];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let start = graph.canonical_node(&a).unwrap();
        let end = graph.canonical_node(&b).unwrap();
        let path = shortest_path(&graph, start, end);

        assert_eq!(path, vec![start, end]);
    }

    #[test]
    fn returns_empty_for_disjoint_components() {
        let segments = vec![
            segment(vec![vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(STEP, 0.0)]]),
            // A kilometer away, no connection
            segment(vec![vec![GeoPoint::new(0.01, 0.0), GeoPoint::new(0.01 + STEP, 0.0)]]),
        ];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let start = graph.canonical_node(&GeoPoint::new(0.0, 0.0)).unwrap();
        let end = graph.canonical_node(&GeoPoint::new(0.01, 0.0)).unwrap();
        assert!(shortest_path(&graph, start, end).is_empty());
    }

    #[test]
    fn start_equals_end_yields_single_node() {
        let segments = vec![segment(vec![vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(STEP, 0.0),
        ]])];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);
        let node = graph.canonical_node(&GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(shortest_path(&graph, node, node), vec![node]);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(STEP, 0.0);
        let c = GeoPoint::new(STEP, STEP);
        let d = GeoPoint::new(0.0, STEP);
        let segments = vec![segment(vec![vec![a, b, c], vec![a, d, c]])];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let start = graph.canonical_node(&a).unwrap();
        let end = graph.canonical_node(&c).unwrap();

        let first = shortest_path(&graph, start, end);
        let first_weight = path_weight(&graph, &first);
        for _ in 0..5 {
            let run = shortest_path(&graph, start, end);
            assert_eq!(run, first);
            assert_eq!(path_weight(&graph, &run), first_weight);
        }
    }

    #[test]
    fn path_weight_is_at_least_direct_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(STEP, 0.0);
        let c = GeoPoint::new(STEP, STEP);
        let segments = vec![segment(vec![vec![a, b, c]])];
        let graph = build_graph(&segments, &GraphConfig::default(), &GeodesicWeighting);

        let start = graph.canonical_node(&a).unwrap();
        let end = graph.canonical_node(&c).unwrap();
        let path = shortest_path(&graph, start, end);

        let direct = graph.node(start).haversine_distance(graph.node(end));
        assert!(path_weight(&graph, &path) >= direct - 1e-9);
    }
}
