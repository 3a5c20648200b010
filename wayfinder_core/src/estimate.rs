use crate::model::TravelMode;
use crate::route::RouteSegment;

/// Mode speeds in meters per second.
const WALKING_SPEED: f64 = 1.4;
const DRIVING_SPEED: f64 = 8.3;

pub fn mode_speed(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Walking => WALKING_SPEED,
        TravelMode::Driving => DRIVING_SPEED,
    }
}

/// Estimated travel time in minutes: each segment's distance over its
/// mode speed, summed. Transition segments carry a fixed nominal
/// distance reflecting stair/passage effort, so they feed in unchanged.
pub fn estimated_minutes(segments: &[RouteSegment]) -> f64 {
    let seconds: f64 = segments
        .iter()
        .map(|segment| segment.distance / mode_speed(segment.mode))
        .sum();
    seconds / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::SegmentKind;

    fn segment(kind: SegmentKind, mode: TravelMode, distance: f64) -> RouteSegment {
        RouteSegment {
            kind,
            mode,
            path: Vec::new(),
            floor: None,
            distance,
            description: String::new(),
        }
    }

    #[test]
    fn walking_segment_time() {
        let segments = vec![segment(SegmentKind::Internal, TravelMode::Walking, 84.0)];
        // 84m at 1.4 m/s is exactly one minute
        assert!((estimated_minutes(&segments) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn driving_is_faster_than_walking() {
        let walk = vec![segment(SegmentKind::External, TravelMode::Walking, 500.0)];
        let drive = vec![segment(SegmentKind::External, TravelMode::Driving, 500.0)];
        assert!(estimated_minutes(&drive) < estimated_minutes(&walk));
    }

    #[test]
    fn mixed_modes_sum_per_segment() {
        let segments = vec![
            segment(SegmentKind::External, TravelMode::Driving, 830.0),
            segment(SegmentKind::Internal, TravelMode::Walking, 84.0),
        ];
        // 100s driving + 60s walking
        assert!((estimated_minutes(&segments) - 160.0 / 60.0).abs() < 1e-9);
    }
}
