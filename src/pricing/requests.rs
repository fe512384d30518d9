//! Request DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::CalculationInput;

fn default_events_per_year() -> u32 {
    12
}

/// Request to price several day/location configurations
#[derive(Debug, Deserialize)]
pub struct CalculateMultipleRequest {
    pub configurations: Vec<CalculationInput>,
    #[serde(default = "default_events_per_year")]
    pub events_per_year: u32,
}

/// Request to register a custom service type
#[derive(Debug, Deserialize)]
pub struct RegisterServiceRequest {
    pub name: String,
    #[serde(default)]
    pub margin: Option<Decimal>,
    #[serde(default)]
    pub requires_retouching: Option<bool>,
}
