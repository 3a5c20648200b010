use crate::geopoint::GeoPoint;
use crate::graph::SpatialGraph;
use crate::model::NetworkSegment;

/// How far a node may sit from a line vertex and still count as lying on
/// that line. Generous on purpose: node coordinates survive
/// normalization but the matching line may have been drawn by hand.
const SEARCH_TOLERANCE: f64 = 50.0;

/// Two points closer than this are the same vertex for de-duplication.
const COINCIDENT: f64 = 1e-6;

/// Expands a solver node sequence back into a dense polyline by
/// re-walking the original segments between consecutive nodes. A single
/// graph edge can stand for many original vertices; collapsing to nodes
/// loses the curvature, and distance and rendering both need it back.
pub fn reconstruct_polyline(
    graph: &SpatialGraph,
    segments: &[NetworkSegment],
    path: &[usize],
) -> Vec<GeoPoint> {
    if path.len() < 2 {
        return path.iter().map(|&node| *graph.node(node)).collect();
    }

    let mut full_path: Vec<GeoPoint> = Vec::with_capacity(path.len());

    for pair in path.windows(2) {
        let current = *graph.node(pair[0]);
        let next = *graph.node(pair[1]);

        match full_path.last() {
            Some(last) if last.haversine_distance(&current) < COINCIDENT => {}
            _ => full_path.push(current),
        }

        match find_line_run(segments, &current, &next) {
            Some(run) => full_path.extend(run.into_iter().skip(1)),
            None => full_path.push(next),
        }
    }

    let last_node = *graph.node(*path.last().unwrap());
    match full_path.last() {
        Some(last) if last.haversine_distance(&last_node) < COINCIDENT => {}
        _ => full_path.push(last_node),
    }

    full_path
}

/// Searches every original line for a sub-polyline whose endpoints best
/// match `start` and `end`, preferring the longest run of intermediate
/// vertices over degenerate single-edge jumps.
fn find_line_run(
    segments: &[NetworkSegment],
    start: &GeoPoint,
    end: &GeoPoint,
) -> Option<Vec<GeoPoint>> {
    let mut best_run: Option<Vec<GeoPoint>> = None;
    let mut best_span = 0usize;

    for segment in segments {
        for line in segment.usable_lines() {
            let mut start_idx = None;
            let mut end_idx = None;
            let mut min_start = SEARCH_TOLERANCE;
            let mut min_end = SEARCH_TOLERANCE;

            for (i, point) in line.iter().enumerate() {
                let to_start = start.haversine_distance(point);
                let to_end = end.haversine_distance(point);

                if to_start < min_start {
                    min_start = to_start;
                    start_idx = Some(i);
                }
                if to_end < min_end {
                    min_end = to_end;
                    end_idx = Some(i);
                }
            }

            let (Some(s), Some(e)) = (start_idx, end_idx) else {
                continue;
            };

            let span = s.abs_diff(e);
            if span > best_span {
                best_span = span;
                let run: Vec<GeoPoint> = if s < e {
                    line[s..=e].to_vec()
                } else {
                    line[e..=s].iter().rev().copied().collect()
                };
                best_run = Some(run);
            }
        }
    }

    best_run
}
