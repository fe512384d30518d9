//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no caching, no registry access.
//! Inputs are expected to have passed [`validate`](super::validation::validate).
//! Every step rounds its result before the next step consumes it, so the
//! rounding order is part of the contract.

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::{AggregateResult, AggregateTotals, CalculationInput, CalculationResult};
use super::services::CalculationError;

/// Decimal places kept for every monetary and percentage figure.
pub const CALCULATION_PRECISION: u32 = 2;

const MINUTES_PER_HOUR: Decimal = dec!(60);
const HUNDRED: Decimal = dec!(100);

/// Round to specified decimal places, half-up.
///
/// Ties move toward positive infinity, so `2.5` becomes `3` and `-2.5`
/// becomes `-2`. The result always carries exactly `places` decimals.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use wellness_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(-2.5), 0), dec!(-2));
/// assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    let strategy = if amount.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    let mut rounded = amount.round_dp_with_strategy(places, strategy);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(places);
    rounded
}

fn round(amount: Decimal) -> Decimal {
    round_money(amount, CALCULATION_PRECISION)
}

fn too_large_rate(field: &'static str) -> CalculationError {
    CalculationError::InvalidRate {
        field,
        constraint: "is too large to price".to_string(),
    }
}

/// `net / cost * 100`, refusing a zero cost.
pub fn margin_percent(
    net_profit: Decimal,
    customer_total_cost: Decimal,
    context: &'static str,
) -> Result<Decimal, CalculationError> {
    if customer_total_cost.is_zero() {
        return Err(CalculationError::DivisionByZero { context });
    }
    net_profit
        .checked_div(customer_total_cost)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map(round)
        .ok_or(CalculationError::ArithmeticOverflow { context })
}

/// `rate * hours * professionals`, unrounded.
fn hourly_amount(
    rate: Decimal,
    input: &CalculationInput,
    field: &'static str,
) -> Result<Decimal, CalculationError> {
    rate.checked_mul(input.total_hours)
        .and_then(|amount| amount.checked_mul(Decimal::from(input.num_professionals)))
        .ok_or_else(|| too_large_rate(field))
}

fn annualize(customer_total_cost: Decimal, events_per_year: u32) -> Result<Decimal, CalculationError> {
    customer_total_cost
        .checked_mul(Decimal::from(events_per_year))
        .map(round)
        .ok_or_else(|| CalculationError::InvalidEventsPerYear {
            field: "events_per_year",
            constraint: "gives an annualized cost too large to represent".to_string(),
        })
}

/// Appointment throughput for one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentCounts {
    pub per_professional_per_hour: u32,
    pub per_hour: u32,
    pub total: u32,
}

/// Work out how many appointments fit in the event.
///
/// Slots longer than an hour give zero appointments per hour; that flows
/// through unchanged.
pub fn appointment_counts(input: &CalculationInput) -> Result<AppointmentCounts, CalculationError> {
    let per_professional_per_hour = MINUTES_PER_HOUR
        .checked_div(input.appointment_minutes)
        .and_then(|slots| slots.floor().to_u32())
        .ok_or_else(|| CalculationError::InvalidAppointmentTime {
            field: "appointment_minutes",
            constraint: "must yield a representable number of appointments per hour".to_string(),
        })?;

    let per_hour = per_professional_per_hour
        .checked_mul(input.num_professionals)
        .ok_or_else(|| CalculationError::InvalidProfessionalCount {
            field: "num_professionals",
            constraint: "must yield a representable number of appointments per hour".to_string(),
        })?;

    let total = match input.explicit_appointment_count {
        Some(count) => count,
        None => Decimal::from(per_hour)
            .checked_mul(input.total_hours)
            .and_then(|appointments| round_money(appointments, 0).to_u32())
            .ok_or_else(|| CalculationError::InvalidDuration {
                field: "total_hours",
                constraint: "must yield a representable number of appointments".to_string(),
            })?,
    };

    Ok(AppointmentCounts {
        per_professional_per_hour,
        per_hour,
        total,
    })
}

/// Money figures before annualization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventMoney {
    professional_revenue: Decimal,
    customer_total_cost: Decimal,
    net_profit: Decimal,
    profit_margin_percent: Decimal,
}

/// Fixed-margin path for services with retouching.
///
/// The customer cost is back-derived from the professional revenue so that
/// the margin holds exactly; the per-appointment retouching charge never
/// reaches the customer figure.
fn price_retouching(input: &CalculationInput) -> Result<EventMoney, CalculationError> {
    let margin = input.service_type.margin();
    let margin_share = margin / HUNDRED;
    let professional_revenue = round(hourly_amount(
        input.professional_hourly_rate,
        input,
        "professional_hourly_rate",
    )?);

    let divisor = Decimal::ONE - margin_share;
    if divisor.is_zero() {
        return Err(CalculationError::DivisionByZero {
            context: "customer cost from a 100% margin",
        });
    }
    let mut customer_total_cost = professional_revenue
        .checked_div(divisor)
        .map(round)
        .ok_or_else(|| too_large_rate("professional_hourly_rate"))?;

    if input.discount_percent > Decimal::ZERO {
        customer_total_cost = apply_discount(customer_total_cost, input.discount_percent)?;
    }
    let net_profit = customer_total_cost
        .checked_mul(margin_share)
        .map(round)
        .ok_or_else(|| too_large_rate("professional_hourly_rate"))?;

    Ok(EventMoney {
        professional_revenue,
        customer_total_cost,
        net_profit,
        profit_margin_percent: round(margin),
    })
}

/// Hourly-rate path. The early-arrival fee is paid to professionals but not
/// billed to the customer.
fn price_standard(input: &CalculationInput) -> Result<EventMoney, CalculationError> {
    let customer_rate = input.customer_hourly_rate.ok_or(CalculationError::InvalidRate {
        field: "customer_hourly_rate",
        constraint: "is required for this service type".to_string(),
    })?;

    let professional_revenue =
        hourly_amount(input.professional_hourly_rate, input, "professional_hourly_rate")?
            .checked_add(input.early_arrival_fee)
            .map(round)
            .ok_or_else(|| too_large_rate("early_arrival_fee"))?;
    let mut customer_total_cost =
        round(hourly_amount(customer_rate, input, "customer_hourly_rate")?);

    if input.discount_percent > Decimal::ZERO {
        customer_total_cost = apply_discount(customer_total_cost, input.discount_percent)?;
    }

    let net_profit = customer_total_cost
        .checked_sub(professional_revenue)
        .map(round)
        .ok_or(CalculationError::ArithmeticOverflow {
            context: "event net profit",
        })?;
    let profit_margin_percent = margin_percent(net_profit, customer_total_cost, "event profit margin")?;

    Ok(EventMoney {
        professional_revenue,
        customer_total_cost,
        net_profit,
        profit_margin_percent,
    })
}

fn apply_discount(
    customer_total_cost: Decimal,
    discount_percent: Decimal,
) -> Result<Decimal, CalculationError> {
    customer_total_cost
        .checked_mul(discount_percent / HUNDRED)
        .map(round)
        .and_then(|discount| customer_total_cost.checked_sub(discount))
        .map(round)
        .ok_or_else(|| CalculationError::InvalidDiscount {
            field: "discount_percent",
            constraint: "gives a discount too large to represent".to_string(),
        })
}

/// Price a single validated configuration.
pub fn price_event(input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
    let counts = appointment_counts(input)?;

    let money = if input.service_type.requires_retouching() {
        price_retouching(input)?
    } else {
        price_standard(input)?
    };

    let annualized_cost = annualize(money.customer_total_cost, input.events_per_year)?;

    Ok(CalculationResult {
        appointments_per_professional_per_hour: counts.per_professional_per_hour,
        appointments_per_hour: counts.per_hour,
        total_appointments: counts.total,
        professional_revenue: money.professional_revenue,
        customer_total_cost: money.customer_total_cost,
        net_profit: money.net_profit,
        profit_margin_percent: money.profit_margin_percent,
        annualized_cost,
        service_type: input.service_type.clone(),
        total_hours: input.total_hours.normalize(),
        day: input.day.clone(),
        location: input.location.clone(),
    })
}

/// Default label for the day at a 0-based position.
pub fn default_day_label(index: usize) -> String {
    format!("Day {}", index + 1)
}

/// Default label for the location at a 0-based position.
pub fn default_location_label(index: usize) -> String {
    format!("Location {}", index + 1)
}

fn finish_totals(
    totals: &mut AggregateTotals,
    events_per_year: u32,
    context: &'static str,
) -> Result<(), CalculationError> {
    totals.profit_margin_percent =
        margin_percent(totals.net_profit, totals.customer_total_cost, context)?;
    totals.annualized_cost = annualize(totals.customer_total_cost, events_per_year)?;
    Ok(())
}

/// Fold per-configuration results into grand and per-location totals.
///
/// Results are labelled in place: a missing day becomes `Day {n}` and a
/// missing location `Location {n}`, 1-based by position. Margins are
/// recomputed from the summed figures and annualization uses only
/// `events_per_year`, never the per-input value.
pub fn aggregate_results(
    results: Vec<CalculationResult>,
    events_per_year: u32,
) -> Result<AggregateResult, CalculationError> {
    if results.is_empty() {
        return Err(CalculationError::EmptyConfigurationList);
    }

    let mut totals = AggregateTotals::default();
    let mut location_results: BTreeMap<String, AggregateTotals> = BTreeMap::new();
    let mut day_results = Vec::with_capacity(results.len());

    for (index, mut result) in results.into_iter().enumerate() {
        let day = result.day.take().unwrap_or_else(|| default_day_label(index));
        let location = result
            .location
            .take()
            .unwrap_or_else(|| default_location_label(index));

        totals.add(&result, "aggregate totals")?;
        location_results
            .entry(location.clone())
            .or_default()
            .add(&result, "location totals")?;

        result.day = Some(day);
        result.location = Some(location);
        day_results.push(result);
    }

    finish_totals(&mut totals, events_per_year, "aggregate profit margin")?;
    for location_totals in location_results.values_mut() {
        finish_totals(location_totals, events_per_year, "location profit margin")?;
    }

    Ok(AggregateResult {
        totals,
        events_per_year,
        day_results,
        location_results,
    })
}
