//! Structural validation of calculation inputs.
//!
//! Rules run in a fixed order and the first violation wins. Out-of-range
//! values are rejected, never clamped.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::CalculationInput;
use super::registry::ServiceRegistry;
use super::services::CalculationError;

/// Optional bounds applied on top of the structural rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationLimits {
    pub min_appointment_minutes: Option<Decimal>,
    pub max_appointment_minutes: Option<Decimal>,
}

impl ValidationLimits {
    /// Bound appointment length to `[min, max]` minutes.
    pub fn appointment_window(min: Decimal, max: Decimal) -> Self {
        Self {
            min_appointment_minutes: Some(min),
            max_appointment_minutes: Some(max),
        }
    }
}

fn positive(value: Decimal) -> bool {
    value > Decimal::ZERO
}

/// Check `input` against the registry and limits.
pub fn validate(
    input: &CalculationInput,
    registry: &ServiceRegistry,
    limits: &ValidationLimits,
) -> Result<(), CalculationError> {
    if !registry.contains(&input.service_type) {
        return Err(CalculationError::InvalidServiceType {
            name: input.service_type.name().to_string(),
            constraint: "must be a built-in or registered custom service".to_string(),
        });
    }

    if !positive(input.total_hours) {
        return Err(CalculationError::InvalidDuration {
            field: "total_hours",
            constraint: "must be greater than zero".to_string(),
        });
    }

    if !positive(input.appointment_minutes) {
        return Err(CalculationError::InvalidAppointmentTime {
            field: "appointment_minutes",
            constraint: "must be greater than zero".to_string(),
        });
    }
    if let Some(min) = limits.min_appointment_minutes {
        if input.appointment_minutes < min {
            return Err(CalculationError::InvalidAppointmentTime {
                field: "appointment_minutes",
                constraint: format!("must be at least {}", min),
            });
        }
    }
    if let Some(max) = limits.max_appointment_minutes {
        if input.appointment_minutes > max {
            return Err(CalculationError::InvalidAppointmentTime {
                field: "appointment_minutes",
                constraint: format!("must be at most {}", max),
            });
        }
    }

    if input.num_professionals == 0 {
        return Err(CalculationError::InvalidProfessionalCount {
            field: "num_professionals",
            constraint: "must be a positive integer".to_string(),
        });
    }

    if !positive(input.professional_hourly_rate) {
        return Err(CalculationError::InvalidRate {
            field: "professional_hourly_rate",
            constraint: "must be greater than zero".to_string(),
        });
    }

    if input.service_type.requires_retouching() {
        if input.retouching_cost_per_appointment < Decimal::ZERO {
            return Err(CalculationError::InvalidRetouchingCost {
                field: "retouching_cost_per_appointment",
                constraint: "must not be negative".to_string(),
            });
        }
    } else {
        match input.customer_hourly_rate {
            Some(rate) if positive(rate) => {}
            Some(_) => {
                return Err(CalculationError::InvalidRate {
                    field: "customer_hourly_rate",
                    constraint: "must be greater than zero".to_string(),
                })
            }
            None => {
                return Err(CalculationError::InvalidRate {
                    field: "customer_hourly_rate",
                    constraint: "is required for this service type".to_string(),
                })
            }
        }
        if input.early_arrival_fee < Decimal::ZERO {
            return Err(CalculationError::InvalidRate {
                field: "early_arrival_fee",
                constraint: "must not be negative".to_string(),
            });
        }
    }

    if input.discount_percent < Decimal::ZERO || input.discount_percent > dec!(100) {
        return Err(CalculationError::InvalidDiscount {
            field: "discount_percent",
            constraint: "must be between 0 and 100".to_string(),
        });
    }

    if input.explicit_appointment_count == Some(0) {
        return Err(CalculationError::InvalidAppointmentCount {
            field: "explicit_appointment_count",
            constraint: "must be a positive integer when given".to_string(),
        });
    }

    if input.events_per_year == 0 {
        return Err(CalculationError::InvalidEventsPerYear {
            field: "events_per_year",
            constraint: "must be a positive integer".to_string(),
        });
    }

    Ok(())
}
