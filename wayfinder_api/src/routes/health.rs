use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store = state.engine.store();
    Json(json!({
        "status": "healthy",
        "segments": {
            "indoor": store.indoor_count(),
            "outdoor": store.outdoor_count(),
        }
    }))
}
