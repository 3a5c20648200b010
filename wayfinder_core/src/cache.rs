use std::hash::Hasher;
use std::sync::{Arc, RwLock};

use fxhash::{FxHashMap, FxHasher};

use crate::graph::SpatialGraph;
use crate::model::NetworkSegment;

/// Content hash of a segment set. Two queries over byte-identical
/// geometry share a cache entry; any edit to the data produces a new key,
/// so stale graphs age out instead of being served.
pub fn segment_set_hash(segments: &[NetworkSegment]) -> u64 {
    let mut hasher = FxHasher::default();
    for segment in segments {
        hasher.write_u64(segment.id);
        for line in &segment.lines {
            hasher.write_usize(line.len());
            for point in line {
                hasher.write_u64(point.lng.to_bits());
                hasher.write_u64(point.lat.to_bits());
            }
        }
    }
    hasher.finish()
}

/// Injectable graph cache collaborator. The engine rebuilds graphs per
/// query through this seam; deployments choose whether rebuilds are
/// memoized. Never global state.
pub trait GraphCache: Send + Sync {
    fn get_or_build(
        &self,
        key: u64,
        build: &mut dyn FnMut() -> SpatialGraph,
    ) -> Arc<SpatialGraph>;
}

/// Rebuilds every time. Fine at per-floor segment counts.
pub struct NoCache;

impl GraphCache for NoCache {
    fn get_or_build(
        &self,
        _key: u64,
        build: &mut dyn FnMut() -> SpatialGraph,
    ) -> Arc<SpatialGraph> {
        Arc::new(build())
    }
}

/// Keeps built graphs keyed by content hash.
#[derive(Default)]
pub struct MemoryGraphCache {
    graphs: RwLock<FxHashMap<u64, Arc<SpatialGraph>>>,
}

impl MemoryGraphCache {
    pub fn new() -> MemoryGraphCache {
        MemoryGraphCache::default()
    }

    pub fn len(&self) -> usize {
        self.graphs.read().expect("graph cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GraphCache for MemoryGraphCache {
    fn get_or_build(
        &self,
        key: u64,
        build: &mut dyn FnMut() -> SpatialGraph,
    ) -> Arc<SpatialGraph> {
        if let Some(graph) = self
            .graphs
            .read()
            .expect("graph cache lock poisoned")
            .get(&key)
        {
            return Arc::clone(graph);
        }

        let graph = Arc::new(build());
        self.graphs
            .write()
            .expect("graph cache lock poisoned")
            .insert(key, Arc::clone(&graph));
        graph
    }
}
