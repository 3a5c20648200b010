use thiserror::Error;

use crate::model::{RoomId, StructureId};

/// Everything that can stop a route query. All variants are
/// request-scoped: the caller turns them into a "no route" response,
/// never a crash.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),
    #[error("structure {0} not found")]
    StructureNotFound(StructureId),
    #[error("structure {0} has no door segments")]
    NoEntrance(StructureId),
    #[error("no connector path from floor {from} to floor {to}")]
    FloorUnreachable { from: i32, to: i32 },
    #[error("no indoor path on floor {floor}")]
    NoIndoorPath { floor: i32 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failures while loading a campus geometry bundle. Unlike `RouteError`
/// these happen at startup, before any query runs.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to parse campus bundle")]
    Parse(#[source] geojson::Error),
    #[error("campus bundle is not a FeatureCollection")]
    NotAFeatureCollection,
    #[error("feature is missing required property `{0}`")]
    MissingField(&'static str),
    #[error("feature carries an unsupported geometry type")]
    UnsupportedGeometry,
}

impl RouteError {
    /// Coarse classification used by the request boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RouteError::RoomNotFound(_) | RouteError::StructureNotFound(_)
        )
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RouteError::NoEntrance(_)
                | RouteError::FloorUnreachable { .. }
                | RouteError::NoIndoorPath { .. }
        )
    }
}
