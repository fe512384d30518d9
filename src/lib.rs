//! Wellness event pricing service.
//!
//! The pricing engine lives in [`pricing`]; this crate root wires it into an
//! axum application with shared state, a result cache and configuration.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::ResultCache;
use crate::config::Config;
use crate::pricing::{PricingEngine, ServiceRegistry};

/// Application state shared across requests
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
    /// Custom service types, owned by the application rather than the engine
    pub registry: Arc<RwLock<ServiceRegistry>>,
}

impl AppState {
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            registry: Arc::new(RwLock::new(ServiceRegistry::new())),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut engine = PricingEngine::new(config.limits.clone());
        if config.cache_enabled {
            engine = engine.with_cache(ResultCache::new(config.cache_ttl, config.cache_capacity));
        }
        Self::new(engine)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/pricing", pricing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
