//! Pricing engine entry points.
//!
//! [`PricingEngine`] wires validation, the optional result cache and the
//! pure calculators together. The service registry stays with the caller and
//! is passed into each call.

use tracing::{debug, warn};

use crate::cache::ResultCache;

use super::calculators::{aggregate_results, price_event};
use super::models::{AggregateResult, CalculationInput, CalculationResult, ServiceType};
use super::presets::{self, EventSize, PresetConfiguration};
use super::registry::ServiceRegistry;
use super::validation::{validate, ValidationLimits};

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("Invalid service type '{name}': {constraint}")]
    InvalidServiceType { name: String, constraint: String },

    #[error("Invalid duration: {field} {constraint}")]
    InvalidDuration { field: &'static str, constraint: String },

    #[error("Invalid appointment time: {field} {constraint}")]
    InvalidAppointmentTime { field: &'static str, constraint: String },

    #[error("Invalid professional count: {field} {constraint}")]
    InvalidProfessionalCount { field: &'static str, constraint: String },

    #[error("Invalid rate: {field} {constraint}")]
    InvalidRate { field: &'static str, constraint: String },

    #[error("Invalid retouching cost: {field} {constraint}")]
    InvalidRetouchingCost { field: &'static str, constraint: String },

    #[error("Invalid discount: {field} {constraint}")]
    InvalidDiscount { field: &'static str, constraint: String },

    #[error("Invalid appointment count: {field} {constraint}")]
    InvalidAppointmentCount { field: &'static str, constraint: String },

    #[error("Invalid events per year: {field} {constraint}")]
    InvalidEventsPerYear { field: &'static str, constraint: String },

    #[error("Division by zero computing {context}")]
    DivisionByZero { context: &'static str },

    #[error("Arithmetic overflow computing {context}")]
    ArithmeticOverflow { context: &'static str },

    #[error("No configurations to calculate")]
    EmptyConfigurationList,
}

impl CalculationError {
    /// Stable machine-readable code for this error
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationError::InvalidServiceType { .. } => "invalid_service_type",
            CalculationError::InvalidDuration { .. } => "invalid_duration",
            CalculationError::InvalidAppointmentTime { .. } => "invalid_appointment_time",
            CalculationError::InvalidProfessionalCount { .. } => "invalid_professional_count",
            CalculationError::InvalidRate { .. } => "invalid_rate",
            CalculationError::InvalidRetouchingCost { .. } => "invalid_retouching_cost",
            CalculationError::InvalidDiscount { .. } => "invalid_discount",
            CalculationError::InvalidAppointmentCount { .. } => "invalid_appointment_count",
            CalculationError::InvalidEventsPerYear { .. } => "invalid_events_per_year",
            CalculationError::DivisionByZero { .. } => "division_by_zero",
            CalculationError::ArithmeticOverflow { .. } => "arithmetic_overflow",
            CalculationError::EmptyConfigurationList => "empty_configuration_list",
        }
    }

    /// Input field the error refers to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CalculationError::InvalidServiceType { .. } => Some("service_type"),
            CalculationError::InvalidDuration { field, .. }
            | CalculationError::InvalidAppointmentTime { field, .. }
            | CalculationError::InvalidProfessionalCount { field, .. }
            | CalculationError::InvalidRate { field, .. }
            | CalculationError::InvalidRetouchingCost { field, .. }
            | CalculationError::InvalidDiscount { field, .. }
            | CalculationError::InvalidAppointmentCount { field, .. }
            | CalculationError::InvalidEventsPerYear { field, .. } => Some(field),
            CalculationError::DivisionByZero { .. }
            | CalculationError::ArithmeticOverflow { .. }
            | CalculationError::EmptyConfigurationList => None,
        }
    }
}

/// Stateless pricing engine with an optional result cache.
pub struct PricingEngine {
    limits: ValidationLimits,
    cache: Option<ResultCache>,
}

impl PricingEngine {
    pub fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
            cache: None,
        }
    }

    /// Attach a result cache. Cached and uncached engines return identical
    /// results for identical inputs.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    /// Price a single event configuration.
    ///
    /// Validation always runs, even when the result is already cached, so a
    /// custom service removed from `registry` stops pricing immediately.
    pub fn calculate(
        &self,
        registry: &ServiceRegistry,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        validate(input, registry, &self.limits)?;

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(input) {
                debug!("Cache HIT for {} calculation", input.service_type);
                return Ok(cached.result.clone());
            }
            debug!("Cache MISS for {} calculation", input.service_type);
        }

        let result = price_event(input)?;
        debug!(
            service_type = %input.service_type,
            total_appointments = result.total_appointments,
            customer_total_cost = %result.customer_total_cost,
            "Priced event"
        );

        if let Some(cache) = &self.cache {
            cache.insert(input.clone(), result.clone());
        }

        Ok(result)
    }

    /// Price several day/location configurations and fold them into grand and
    /// per-location totals.
    ///
    /// Stops at the first failing configuration; no partial aggregate is
    /// returned.
    pub fn calculate_multiple(
        &self,
        registry: &ServiceRegistry,
        inputs: &[CalculationInput],
        events_per_year: u32,
    ) -> Result<AggregateResult, CalculationError> {
        if inputs.is_empty() {
            return Err(CalculationError::EmptyConfigurationList);
        }
        if events_per_year == 0 {
            return Err(CalculationError::InvalidEventsPerYear {
                field: "events_per_year",
                constraint: "must be a positive integer".to_string(),
            });
        }

        let mut results = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let result = self.calculate(registry, input).map_err(|err| {
                warn!("Configuration {} rejected: {}", index + 1, err);
                err
            })?;
            results.push(result);
        }

        aggregate_results(results, events_per_year)
    }

    /// Look up a preset configuration. Never consulted by the calculations.
    pub fn get_preset(service_type: &ServiceType, size: EventSize) -> Option<PresetConfiguration> {
        presets::get_preset(service_type, size)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(ValidationLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn massage_event() -> CalculationInput {
        CalculationInput::new(ServiceType::MassageSpa, dec!(4), dec!(20), 2, dec!(50))
            .with_customer_rate(dec!(135))
            .with_early_arrival_fee(dec!(100))
    }

    fn headshot_event() -> CalculationInput {
        CalculationInput::new(ServiceType::Headshot, dec!(5), dec!(12), 2, dec!(400))
    }

    fn cached_engine() -> PricingEngine {
        PricingEngine::default().with_cache(ResultCache::new(Duration::from_secs(300), 100))
    }

    #[test]
    fn test_calculation_error_display() {
        let err = CalculationError::InvalidRate {
            field: "customer_hourly_rate",
            constraint: "must be greater than zero".to_string(),
        };
        assert!(err.to_string().contains("customer_hourly_rate"));
        assert_eq!(err.kind(), "invalid_rate");
        assert_eq!(err.field(), Some("customer_hourly_rate"));

        let err = CalculationError::DivisionByZero {
            context: "event profit margin",
        };
        assert!(err.to_string().contains("event profit margin"));
        assert_eq!(err.field(), None);

        assert_eq!(
            CalculationError::EmptyConfigurationList.kind(),
            "empty_configuration_list"
        );
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let engine = PricingEngine::default();
        let registry = ServiceRegistry::new();
        let first = engine.calculate(&registry, &massage_event()).unwrap();
        let second = engine.calculate(&registry, &massage_event()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cached_and_uncached_results_match() {
        let registry = ServiceRegistry::new();
        let plain = PricingEngine::default();
        let cached = cached_engine();

        for input in [massage_event(), headshot_event().with_discount(dec!(10))] {
            let expected = plain.calculate(&registry, &input).unwrap();
            let miss = cached.calculate(&registry, &input).unwrap();
            let hit = cached.calculate(&registry, &input).unwrap();
            assert_eq!(expected, miss);
            assert_eq!(expected, hit);
        }

        let stats = cached.cache().unwrap().stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_cache_hit_serializes_like_fresh_result() {
        let registry = ServiceRegistry::new();
        let engine = cached_engine();
        let mut scaled = massage_event();
        scaled.total_hours = dec!(4.00);

        let first = engine.calculate(&registry, &scaled).unwrap();
        let hit = engine.calculate(&registry, &massage_event()).unwrap();
        let fresh = PricingEngine::default()
            .calculate(&registry, &massage_event())
            .unwrap();

        assert_eq!(engine.cache().unwrap().stats().hits, 1);
        assert_eq!(
            serde_json::to_string(&hit).unwrap(),
            serde_json::to_string(&fresh).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&fresh).unwrap()
        );
    }

    #[test]
    fn test_overflow_is_a_typed_error_and_not_cached() {
        let registry = ServiceRegistry::new();
        let engine = cached_engine();
        let input = CalculationInput::new(ServiceType::MassageSpa, dec!(1), dec!(20), 2, Decimal::MAX)
            .with_customer_rate(dec!(1));

        let err = engine.calculate(&registry, &input).unwrap_err();
        assert_eq!(err.field(), Some("professional_hourly_rate"));
        assert!(engine.cache().unwrap().get(&input).is_none());
    }

    #[test]
    fn test_failed_calculation_is_not_cached() {
        let registry = ServiceRegistry::new();
        let engine = cached_engine();
        let input = massage_event().with_discount(dec!(100));

        assert!(engine.calculate(&registry, &input).is_err());
        assert!(engine.cache().unwrap().get(&input).is_none());
    }

    #[test]
    fn test_validation_runs_before_cache() {
        let mut registry = ServiceRegistry::new();
        let service = registry.register("yoga", None, None).unwrap();
        let engine = cached_engine();
        let input = CalculationInput::new(service, dec!(2), dec!(30), 1, dec!(40))
            .with_customer_rate(dec!(90));

        assert!(engine.calculate(&registry, &input).is_ok());
        registry.remove("yoga");
        assert!(matches!(
            engine.calculate(&registry, &input),
            Err(CalculationError::InvalidServiceType { .. })
        ));
    }

    #[test]
    fn test_calculate_multiple_grand_totals() {
        let engine = PricingEngine::default();
        let registry = ServiceRegistry::new();
        let inputs = vec![
            massage_event().at("Monday", "HQ"),
            headshot_event().with_discount(dec!(10)).at("Tuesday", "Downtown"),
        ];

        let aggregate = engine.calculate_multiple(&registry, &inputs, 12).unwrap();
        assert_eq!(aggregate.totals.customer_total_cost, dec!(5580));

        let per_input_appointments: u64 = inputs
            .iter()
            .map(|input| u64::from(engine.calculate(&registry, input).unwrap().total_appointments))
            .sum();
        assert_eq!(aggregate.totals.total_appointments, per_input_appointments);

        let expected_margin = crate::pricing::round_money(
            aggregate.totals.net_profit / aggregate.totals.customer_total_cost * dec!(100),
            2,
        );
        assert_eq!(aggregate.totals.profit_margin_percent, expected_margin);
        let mean_margin = aggregate
            .day_results
            .iter()
            .map(|r| r.profit_margin_percent)
            .sum::<Decimal>()
            / dec!(2);
        assert_ne!(aggregate.totals.profit_margin_percent, mean_margin);

        assert_eq!(aggregate.location_results["HQ"].customer_total_cost, dec!(1080));
        assert_eq!(aggregate.location_results["Downtown"].net_profit, dec!(900));
    }

    #[test]
    fn test_calculate_multiple_stops_at_first_failure() {
        let engine = PricingEngine::default();
        let registry = ServiceRegistry::new();
        let mut bad_hours = massage_event();
        bad_hours.total_hours = Decimal::ZERO;
        let mut bad_pros = massage_event();
        bad_pros.num_professionals = 0;

        let err = engine
            .calculate_multiple(&registry, &[massage_event(), bad_hours, bad_pros], 12)
            .unwrap_err();
        assert!(matches!(err, CalculationError::InvalidDuration { .. }));
    }

    #[test]
    fn test_calculate_multiple_rejects_empty_and_zero_events() {
        let engine = PricingEngine::default();
        let registry = ServiceRegistry::new();
        assert_eq!(
            engine.calculate_multiple(&registry, &[], 12).unwrap_err(),
            CalculationError::EmptyConfigurationList
        );
        assert!(matches!(
            engine.calculate_multiple(&registry, &[massage_event()], 0),
            Err(CalculationError::InvalidEventsPerYear { .. })
        ));
    }

    #[test]
    fn test_get_preset_delegates_to_table() {
        let preset = PricingEngine::get_preset(&ServiceType::Headshot, EventSize::Medium).unwrap();
        assert_eq!(preset.num_professionals, 3);
    }
}
