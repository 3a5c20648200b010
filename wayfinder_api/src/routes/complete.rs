use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wayfinder_core::route::{RouteRequest, RouteResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub struct CompleteRouteResponse(RouteResponse);

impl IntoResponse for CompleteRouteResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// The main entry point: a start position, a destination room and a
/// travel mode in; the stitched itinerary out. Without a start position
/// the response degrades to structure and room metadata for rendering.
pub async fn complete_route_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<CompleteRouteResponse, ApiError> {
    let Json(body) = body?;
    let response = state.engine.route(&body)?;

    tracing::info!(
        destination = body.destination_room_id,
        segments = response.segments.len(),
        total = response.total_distance,
        "complete route computed"
    );

    Ok(CompleteRouteResponse(response))
}
