//! Response DTOs for pricing API endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

use super::models::ServiceType;
use super::presets::PresetConfiguration;

/// Known service types, built-ins first
#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub services: Vec<ServiceType>,
}

/// All presets for one service type, keyed by size
#[derive(Debug, Serialize)]
pub struct PresetListResponse {
    pub service_type: String,
    pub presets: BTreeMap<String, PresetConfiguration>,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Result cache status
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub enabled: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
}
