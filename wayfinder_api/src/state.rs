use wayfinder_core::cache::MemoryGraphCache;
use wayfinder_core::engine::RouteEngine;
use wayfinder_core::store::MemoryStore;

pub struct AppState {
    pub engine: RouteEngine<MemoryStore, MemoryGraphCache>,
}
