//! Multi-modal, multi-floor route planning for a campus: outdoor
//! approach, indoor corridors per floor, and vertical transitions
//! (stairs, ramps, sky bridges) stitched into one continuous itinerary
//! with distance and time estimates.

pub mod cache;
pub mod dijkstra;
pub mod engine;
pub mod entrance;
pub mod error;
pub mod estimate;
pub mod floors;
pub mod geopoint;
pub mod graph;
pub mod loader;
pub mod model;
pub mod reconstruct;
pub mod route;
pub mod snap;
pub mod store;
pub mod weighting;

pub use engine::{EngineConfig, RouteEngine};
pub use error::{LoadError, RouteError};
pub use geopoint::GeoPoint;
pub use route::{RouteRequest, RouteResponse};
