//! Domain models for event pricing.
//!
//! Every monetary, hour and minute quantity is an exact `Decimal`, which also
//! makes [`CalculationInput`] hashable so it can key the result cache.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::services::CalculationError;

/// Canonical names of the built-in service types.
pub const BUILT_IN_SERVICE_NAMES: [&str; 3] = ["massage/spa", "hair/nails", "headshot"];

/// Default margin applied to custom services registered without one.
pub const DEFAULT_CUSTOM_MARGIN: Decimal = dec!(25);

/// Kind of service being priced.
///
/// Built-ins serialize as their canonical name (`"massage/spa"`), custom
/// services as `{"custom": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "massage/spa")]
    MassageSpa,
    #[serde(rename = "hair/nails")]
    HairNails,
    #[serde(rename = "headshot")]
    Headshot,
    #[serde(rename = "custom")]
    Custom(CustomService),
}

/// A caller-defined service type with its own margin and retouching rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomService {
    pub name: String,
    /// Margin percentage, in `[0, 100)`
    pub margin: Decimal,
    pub requires_retouching: bool,
}

impl ServiceType {
    /// Look up a built-in service by its canonical name.
    pub fn built_in(name: &str) -> Option<Self> {
        match name {
            "massage/spa" => Some(ServiceType::MassageSpa),
            "hair/nails" => Some(ServiceType::HairNails),
            "headshot" => Some(ServiceType::Headshot),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ServiceType::MassageSpa => "massage/spa",
            ServiceType::HairNails => "hair/nails",
            ServiceType::Headshot => "headshot",
            ServiceType::Custom(custom) => &custom.name,
        }
    }

    /// Margin percentage used by the retouching path (25 for massage/spa and
    /// hair/nails, 20 for headshots).
    pub fn margin(&self) -> Decimal {
        match self {
            ServiceType::MassageSpa | ServiceType::HairNails => dec!(25),
            ServiceType::Headshot => dec!(20),
            ServiceType::Custom(custom) => custom.margin,
        }
    }

    /// Whether appointments carry a per-appointment retouching surcharge,
    /// which switches pricing to the fixed-margin path.
    pub fn requires_retouching(&self) -> bool {
        match self {
            ServiceType::Headshot => true,
            ServiceType::Custom(custom) => custom.requires_retouching,
            _ => false,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ServiceType::Custom(_))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_retouching_cost() -> Decimal {
    dec!(40)
}

fn default_events_per_year() -> u32 {
    12
}

/// One event, day or location configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalculationInput {
    pub service_type: ServiceType,
    /// Event duration in hours
    pub total_hours: Decimal,
    /// Length of a single appointment slot in minutes
    pub appointment_minutes: Decimal,
    pub num_professionals: u32,
    /// Hourly rate paid to each professional
    pub professional_hourly_rate: Decimal,
    /// Hourly rate charged to the customer; unused by retouching services
    #[serde(default)]
    pub customer_hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub early_arrival_fee: Decimal,
    #[serde(default = "default_retouching_cost")]
    pub retouching_cost_per_appointment: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Overrides the computed appointment count when present
    #[serde(default)]
    pub explicit_appointment_count: Option<u32>,
    #[serde(default = "default_events_per_year")]
    pub events_per_year: u32,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CalculationInput {
    /// Create an input with every optional field at its default.
    pub fn new(
        service_type: ServiceType,
        total_hours: Decimal,
        appointment_minutes: Decimal,
        num_professionals: u32,
        professional_hourly_rate: Decimal,
    ) -> Self {
        Self {
            service_type,
            total_hours,
            appointment_minutes,
            num_professionals,
            professional_hourly_rate,
            customer_hourly_rate: None,
            early_arrival_fee: Decimal::ZERO,
            retouching_cost_per_appointment: default_retouching_cost(),
            discount_percent: Decimal::ZERO,
            explicit_appointment_count: None,
            events_per_year: default_events_per_year(),
            day: None,
            location: None,
        }
    }

    pub fn with_customer_rate(mut self, rate: Decimal) -> Self {
        self.customer_hourly_rate = Some(rate);
        self
    }

    pub fn with_early_arrival_fee(mut self, fee: Decimal) -> Self {
        self.early_arrival_fee = fee;
        self
    }

    pub fn with_retouching_cost(mut self, cost: Decimal) -> Self {
        self.retouching_cost_per_appointment = cost;
        self
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn with_appointment_count(mut self, count: u32) -> Self {
        self.explicit_appointment_count = Some(count);
        self
    }

    pub fn with_events_per_year(mut self, events: u32) -> Self {
        self.events_per_year = events;
        self
    }

    pub fn at(mut self, day: impl Into<String>, location: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self.location = Some(location.into());
        self
    }
}

/// Priced outcome of a single configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub appointments_per_professional_per_hour: u32,
    pub appointments_per_hour: u32,
    pub total_appointments: u32,
    /// Amount paid out to professionals
    pub professional_revenue: Decimal,
    /// Amount charged to the customer, after any discount
    pub customer_total_cost: Decimal,
    pub net_profit: Decimal,
    pub profit_margin_percent: Decimal,
    pub annualized_cost: Decimal,
    pub service_type: ServiceType,
    pub total_hours: Decimal,
    pub day: Option<String>,
    pub location: Option<String>,
}

/// Summed figures over a set of configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub total_appointments: u64,
    pub professional_revenue: Decimal,
    pub customer_total_cost: Decimal,
    pub net_profit: Decimal,
    /// Recomputed from the sums, never averaged
    pub profit_margin_percent: Decimal,
    pub annualized_cost: Decimal,
}

impl AggregateTotals {
    /// Fold one result into the running sums.
    pub(crate) fn add(
        &mut self,
        result: &CalculationResult,
        context: &'static str,
    ) -> Result<(), CalculationError> {
        let overflow = CalculationError::ArithmeticOverflow { context };
        self.total_appointments = self
            .total_appointments
            .checked_add(u64::from(result.total_appointments))
            .ok_or_else(|| overflow.clone())?;
        self.professional_revenue = self
            .professional_revenue
            .checked_add(result.professional_revenue)
            .ok_or_else(|| overflow.clone())?;
        self.customer_total_cost = self
            .customer_total_cost
            .checked_add(result.customer_total_cost)
            .ok_or_else(|| overflow.clone())?;
        self.net_profit = self
            .net_profit
            .checked_add(result.net_profit)
            .ok_or(overflow)?;
        Ok(())
    }
}

/// Outcome of a multi-day / multi-location calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    #[serde(flatten)]
    pub totals: AggregateTotals,
    /// Annualization factor applied to the grand and per-location costs
    pub events_per_year: u32,
    /// Per-configuration results, labels filled with positional defaults
    pub day_results: Vec<CalculationResult>,
    pub location_results: BTreeMap<String, AggregateTotals>,
}
