//! HTTP routes for the pricing engine.
//!
//! Mounted under `/api/pricing` by [`crate::app`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::AppState;

use super::models::{AggregateResult, CalculationInput, CalculationResult, ServiceType};
use super::presets::{self, EventSize, PresetConfiguration};
use super::requests::{CalculateMultipleRequest, RegisterServiceRequest};
use super::responses::{CacheStatsResponse, PresetListResponse, ServiceListResponse};

/// Query parameters for preset lookups
#[derive(Debug, Deserialize)]
pub struct PresetQuery {
    pub service_type: String,
}

/// Pricing API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/calculate-multiple", post(calculate_multiple))
        .route("/presets", get(list_presets))
        .route("/presets/:size", get(get_preset))
        .route("/services", get(list_services).post(register_service))
        .route("/cache/stats", get(cache_stats))
        .route("/cache", axum::routing::delete(clear_cache))
}

/// POST /calculate
async fn calculate(
    State(state): State<AppState>,
    Json(input): Json<CalculationInput>,
) -> Result<Json<CalculationResult>> {
    let registry = state.registry.read().await;
    let result = state.engine.calculate(&registry, &input)?;
    Ok(Json(result))
}

/// POST /calculate-multiple
async fn calculate_multiple(
    State(state): State<AppState>,
    Json(request): Json<CalculateMultipleRequest>,
) -> Result<Json<AggregateResult>> {
    let registry = state.registry.read().await;
    let result =
        state
            .engine
            .calculate_multiple(&registry, &request.configurations, request.events_per_year)?;
    Ok(Json(result))
}

async fn resolve_service(state: &AppState, name: &str) -> Result<ServiceType> {
    state
        .registry
        .read()
        .await
        .resolve(name)
        .ok_or_else(|| AppError::NotFound(format!("service type '{}'", name)))
}

/// GET /presets?service_type=...
async fn list_presets(
    State(state): State<AppState>,
    Query(query): Query<PresetQuery>,
) -> Result<Json<PresetListResponse>> {
    let service_type = resolve_service(&state, &query.service_type).await?;
    let presets = presets::presets_for(&service_type)
        .into_iter()
        .map(|(size, preset)| (size.to_string(), preset))
        .collect();

    Ok(Json(PresetListResponse {
        service_type: service_type.name().to_string(),
        presets,
    }))
}

/// GET /presets/:size?service_type=...
async fn get_preset(
    State(state): State<AppState>,
    Path(size): Path<String>,
    Query(query): Query<PresetQuery>,
) -> Result<Json<PresetConfiguration>> {
    let size: EventSize = size.parse().map_err(AppError::BadRequest)?;
    let service_type = resolve_service(&state, &query.service_type).await?;

    presets::get_preset(&service_type, size)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} preset for '{}'", size, service_type)))
}

/// GET /services
async fn list_services(State(state): State<AppState>) -> Json<ServiceListResponse> {
    let services = state.registry.read().await.service_types();
    Json(ServiceListResponse { services })
}

/// POST /services
async fn register_service(
    State(state): State<AppState>,
    Json(request): Json<RegisterServiceRequest>,
) -> Result<(StatusCode, Json<ServiceType>)> {
    let service = state.registry.write().await.register(
        &request.name,
        request.margin,
        request.requires_retouching,
    )?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// GET /cache/stats
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.engine.cache().map(|cache| cache.stats());
    Json(CacheStatsResponse {
        enabled: stats.is_some(),
        stats,
    })
}

/// DELETE /cache
async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    if let Some(cache) = state.engine.cache() {
        cache.clear();
    }
    StatusCode::NO_CONTENT
}
