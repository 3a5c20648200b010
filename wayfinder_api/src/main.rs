mod error;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};
use wayfinder_core::cache::MemoryGraphCache;
use wayfinder_core::engine::RouteEngine;
use wayfinder_core::loader::load_campus;

use crate::routes::complete::complete_route_handler;
use crate::routes::health::health_handler;
use crate::state::AppState;

fn app(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/routes/complete", post(complete_route_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let bundle_path =
        std::env::var("CAMPUS_BUNDLE").unwrap_or_else(|_| "./data/campus.geojson".to_string());
    let raw = std::fs::read_to_string(&bundle_path)
        .with_context(|| format!("cannot read campus bundle at {bundle_path}"))?;
    let store = load_campus(&raw)?;

    let state = Arc::new(AppState {
        engine: RouteEngine::with_cache(store, MemoryGraphCache::new()),
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("wayfinder api listening on port {port}");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
