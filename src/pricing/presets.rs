//! Preset event configurations used to pre-fill calculator inputs.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::models::{CalculationInput, ServiceType};

/// Preset event size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSize {
    Small,
    Medium,
    Large,
}

impl EventSize {
    pub const ALL: [EventSize; 3] = [EventSize::Small, EventSize::Medium, EventSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSize::Small => "small",
            EventSize::Medium => "medium",
            EventSize::Large => "large",
        }
    }
}

impl fmt::Display for EventSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(EventSize::Small),
            "medium" => Ok(EventSize::Medium),
            "large" => Ok(EventSize::Large),
            other => Err(format!("unknown event size: {}", other)),
        }
    }
}

/// Named bundle of input defaults for one service type and size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetConfiguration {
    pub name: &'static str,
    pub total_hours: Decimal,
    pub appointment_minutes: Decimal,
    pub num_professionals: u32,
    pub professional_hourly_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_arrival_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retouching_cost: Option<Decimal>,
    pub description: &'static str,
}

impl PresetConfiguration {
    /// Pre-fill a calculation input for `service_type`.
    pub fn to_input(&self, service_type: ServiceType) -> CalculationInput {
        let mut input = CalculationInput::new(
            service_type,
            self.total_hours,
            self.appointment_minutes,
            self.num_professionals,
            self.professional_hourly_rate,
        );
        input.customer_hourly_rate = self.customer_hourly_rate;
        if let Some(fee) = self.early_arrival_fee {
            input.early_arrival_fee = fee;
        }
        if let Some(cost) = self.retouching_cost {
            input.retouching_cost_per_appointment = cost;
        }
        input
    }
}

fn hourly(
    name: &'static str,
    total_hours: Decimal,
    appointment_minutes: Decimal,
    num_professionals: u32,
    early_arrival_fee: Decimal,
    description: &'static str,
) -> PresetConfiguration {
    PresetConfiguration {
        name,
        total_hours,
        appointment_minutes,
        num_professionals,
        professional_hourly_rate: dec!(50),
        customer_hourly_rate: Some(dec!(135)),
        early_arrival_fee: Some(early_arrival_fee),
        retouching_cost: None,
        description,
    }
}

fn headshot(
    name: &'static str,
    total_hours: Decimal,
    num_professionals: u32,
    description: &'static str,
) -> PresetConfiguration {
    PresetConfiguration {
        name,
        total_hours,
        appointment_minutes: dec!(12),
        num_professionals,
        professional_hourly_rate: dec!(400),
        customer_hourly_rate: None,
        early_arrival_fee: None,
        retouching_cost: Some(dec!(40)),
        description,
    }
}

/// Look up the preset for a built-in service and size.
///
/// Custom services have no presets.
pub fn get_preset(service_type: &ServiceType, size: EventSize) -> Option<PresetConfiguration> {
    let preset = match (service_type, size) {
        (ServiceType::MassageSpa, EventSize::Small) => hourly(
            "Small Event (24 appointments)",
            dec!(4),
            dec!(20),
            2,
            dec!(100),
            "24 appointments (2 pros × 4 hours × 3 appts/hour)",
        ),
        (ServiceType::MassageSpa, EventSize::Medium) => hourly(
            "Medium Event (36 appointments)",
            dec!(4),
            dec!(20),
            3,
            dec!(200),
            "36 appointments (3 pros × 4 hours × 3 appts/hour)",
        ),
        (ServiceType::MassageSpa, EventSize::Large) => hourly(
            "Large Event (54 appointments)",
            dec!(6),
            dec!(20),
            3,
            dec!(300),
            "54 appointments (3 pros × 6 hours × 3 appts/hour)",
        ),
        (ServiceType::HairNails, EventSize::Small) => hourly(
            "Small Event (24 appointments)",
            dec!(6),
            dec!(30),
            2,
            dec!(100),
            "24 appointments (2 pros × 6 hours × 2 appts/hour)",
        ),
        (ServiceType::HairNails, EventSize::Medium) => hourly(
            "Medium Event (32 appointments)",
            dec!(8),
            dec!(30),
            2,
            dec!(200),
            "32 appointments (2 pros × 8 hours × 2 appts/hour)",
        ),
        (ServiceType::HairNails, EventSize::Large) => hourly(
            "Large Event (48 appointments)",
            dec!(8),
            dec!(30),
            3,
            dec!(300),
            "48 appointments (3 pros × 8 hours × 2 appts/hour)",
        ),
        (ServiceType::Headshot, EventSize::Small) => headshot(
            "Small Event (30 appointments)",
            dec!(3),
            2,
            "30 appointments (2 pros × 3 hours × 5 appts/hour)",
        ),
        (ServiceType::Headshot, EventSize::Medium) => headshot(
            "Medium Event (60 appointments)",
            dec!(4),
            3,
            "60 appointments (3 pros × 4 hours × 5 appts/hour)",
        ),
        (ServiceType::Headshot, EventSize::Large) => headshot(
            "Large Event (90 appointments)",
            dec!(6),
            3,
            "90 appointments (3 pros × 6 hours × 5 appts/hour)",
        ),
        (ServiceType::Custom(_), _) => return None,
    };
    Some(preset)
}

/// Every preset for a service, smallest first.
pub fn presets_for(service_type: &ServiceType) -> Vec<(EventSize, PresetConfiguration)> {
    EventSize::ALL
        .iter()
        .filter_map(|size| get_preset(service_type, *size).map(|preset| (*size, preset)))
        .collect()
}
