use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wayfinder_core::RouteError;

pub enum ApiError {
    BadRequest(String),
    NotFound { stage: &'static str, message: String },
    InternalServerError(String),
}

impl From<RouteError> for ApiError {
    fn from(error: RouteError) -> Self {
        let stage = match &error {
            RouteError::RoomNotFound(_) | RouteError::StructureNotFound(_) => "destination",
            RouteError::NoEntrance(_) => "entrance",
            RouteError::FloorUnreachable { .. } => "floor_path",
            RouteError::NoIndoorPath { .. } => "indoor_path",
            RouteError::InvalidInput(message) => {
                return ApiError::BadRequest(message.clone());
            }
        };
        ApiError::NotFound {
            stage,
            message: error.to_string(),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalServerError(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::NotFound { stage, message } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": message, "stage": stage })),
            )
                .into_response(),
            ApiError::InternalServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
