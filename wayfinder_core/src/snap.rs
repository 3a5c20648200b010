use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::geopoint::GeoPoint;
use crate::graph::SpatialGraph;

/// A coordinate resolved onto the graph: the canonical node it snapped
/// to and how far away it was.
#[derive(Debug, Copy, Clone)]
pub struct Snap {
    pub node: usize,
    pub distance: f64,
}

type IndexedNode = GeomWithData<GeoPoint, usize>;

/// Spatial index over a graph's canonical nodes. Rebuilt alongside the
/// graph; cheap at per-floor node counts.
pub struct NodeIndex {
    tree: RTree<IndexedNode>,
}

impl NodeIndex {
    pub fn build(graph: &SpatialGraph) -> NodeIndex {
        let tree = RTree::bulk_load(
            graph
                .nodes()
                .iter()
                .enumerate()
                .map(|(id, point)| IndexedNode::new(*point, id))
                .collect(),
        );
        NodeIndex { tree }
    }

    /// Nearest canonical node within `tolerance` meters. Beyond the
    /// tolerance this is a hard "cannot connect to network" signal, not
    /// a best-effort fallback.
    pub fn snap(&self, target: &GeoPoint, tolerance: f64) -> Option<Snap> {
        let nearest = self
            .tree
            .nearest_neighbor(&[target.lng, target.lat])?;

        let distance = target.haversine_distance(nearest.geom());
        if distance > tolerance {
            tracing::debug!(
                distance,
                tolerance,
                "nearest node exceeds snap tolerance"
            );
            return None;
        }

        Some(Snap {
            node: nearest.data,
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphConfig, build_graph};
    use crate::model::{NetworkSegment, SegmentProperties};
    use crate::weighting::GeodesicWeighting;

    fn line_graph() -> SpatialGraph {
        let segment = NetworkSegment {
            id: 0,
            name: None,
            lines: vec![vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0009, 0.0),
                GeoPoint::new(0.0018, 0.0),
            ]],
            properties: SegmentProperties::default(),
        };
        build_graph(&[segment], &GraphConfig::default(), &GeodesicWeighting)
    }

    #[test]
    fn snaps_to_closest_node_within_tolerance() {
        let graph = line_graph();
        let index = NodeIndex::build(&graph);

        // ~10m east of the middle node
        let target = GeoPoint::new(0.0009 + 0.00009, 0.0);
        let snap = index.snap(&target, 50.0).unwrap();

        assert_eq!(
            snap.node,
            graph.canonical_node(&GeoPoint::new(0.0009, 0.0)).unwrap()
        );
        assert!(snap.distance < 15.0);
    }

    #[test]
    fn rejects_targets_beyond_tolerance() {
        let graph = line_graph();
        let index = NodeIndex::build(&graph);

        // ~1km away, tolerance 50m
        let target = GeoPoint::new(0.009, 0.0);
        assert!(index.snap(&target, 50.0).is_none());
    }

    #[test]
    fn empty_graph_never_matches() {
        let graph = build_graph(&[], &GraphConfig::default(), &GeodesicWeighting);
        let index = NodeIndex::build(&graph);
        assert!(index.snap(&GeoPoint::new(0.0, 0.0), 1000.0).is_none());
    }
}
