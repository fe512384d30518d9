//! Property-based tests for the pricing engine.
//!
//! These check that the pricing invariants hold across generated valid
//! inputs, using `proptest` for case generation.

use std::time::Duration;

use proptest::prelude::*;
use rust_decimal::Decimal;
use wellness_pricing::cache::ResultCache;
use wellness_pricing::pricing::{
    round_money, CalculationInput, CustomService, PricingEngine, ServiceRegistry, ServiceType,
};

// =============================================================================
// Generators
// =============================================================================

/// Built-ins plus custom services keyed by their margin and retouching flag,
/// so equal names always carry equal payloads.
fn arb_service_type() -> impl Strategy<Value = ServiceType> {
    prop_oneof![
        Just(ServiceType::MassageSpa),
        Just(ServiceType::HairNails),
        Just(ServiceType::Headshot),
        (0u32..100, any::<bool>()).prop_map(|(margin, requires_retouching)| {
            ServiceType::Custom(CustomService {
                name: format!("custom-{}-{}", margin, requires_retouching),
                margin: Decimal::from(margin),
                requires_retouching,
            })
        }),
    ]
}

/// Money with two decimals, in cents.
fn arb_money(min_cents: i64, max_cents: i64) -> impl Strategy<Value = Decimal> {
    (min_cents..=max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

/// A valid configuration whose customer cost stays positive after discount.
fn arb_input() -> impl Strategy<Value = CalculationInput> {
    (
        arb_service_type(),
        1i64..=96,                          // quarter hours
        5u32..=90,                          // appointment minutes
        1u32..=20,                          // professionals
        arb_money(1_000, 100_000),          // professional hourly rate
        arb_money(1_000, 100_000),          // customer hourly rate
        arb_money(0, 50_000),               // early arrival fee
        0i64..=5_000,                       // discount, hundredths of a percent
        proptest::option::of(1u32..=500),   // explicit appointment count
        1u32..=52,                          // events per year
    )
        .prop_map(
            |(
                service_type,
                quarters,
                minutes,
                professionals,
                professional_rate,
                customer_rate,
                fee,
                discount,
                explicit_count,
                events,
            )| {
                let mut input = CalculationInput::new(
                    service_type,
                    Decimal::new(quarters * 25, 2),
                    Decimal::from(minutes),
                    professionals,
                    professional_rate,
                )
                .with_customer_rate(customer_rate)
                .with_early_arrival_fee(fee)
                .with_discount(Decimal::new(discount, 2))
                .with_events_per_year(events);
                input.explicit_appointment_count = explicit_count;
                input
            },
        )
}

fn arb_inputs(max_count: usize) -> impl Strategy<Value = Vec<CalculationInput>> {
    proptest::collection::vec(arb_input(), 1..=max_count)
}

/// Amounts up to roughly 1.8e28, near the top of the decimal range.
fn arb_large_amount() -> impl Strategy<Value = Decimal> {
    (1u64..=u64::MAX, 0u32..=10).prop_map(|(mantissa, exp)| {
        Decimal::from(mantissa)
            .checked_mul(Decimal::from(10u64.pow(exp)))
            .unwrap_or(Decimal::MAX)
    })
}

fn registry_for(inputs: &[CalculationInput]) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    for input in inputs {
        if let ServiceType::Custom(custom) = &input.service_type {
            registry
                .register(&custom.name, Some(custom.margin), Some(custom.requires_retouching))
                .unwrap();
        }
    }
    registry
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Standard path: net profit is customer cost minus professional revenue,
    /// after any discount, and the margin is derived from those two figures.
    #[test]
    fn prop_standard_net_is_cost_minus_revenue(input in arb_input()) {
        prop_assume!(!input.service_type.requires_retouching());
        let registry = registry_for(std::slice::from_ref(&input));
        let result = PricingEngine::default().calculate(&registry, &input).unwrap();

        prop_assert_eq!(
            result.net_profit,
            result.customer_total_cost - result.professional_revenue
        );
        prop_assert_eq!(
            result.profit_margin_percent,
            round_money(result.net_profit / result.customer_total_cost * Decimal::ONE_HUNDRED, 2)
        );
    }

    /// Retouching path: the reported margin is the configured margin under
    /// any discount.
    #[test]
    fn prop_retouching_margin_is_configured_margin(input in arb_input()) {
        prop_assume!(input.service_type.requires_retouching());
        let registry = registry_for(std::slice::from_ref(&input));
        let result = PricingEngine::default().calculate(&registry, &input).unwrap();
        let margin = input.service_type.margin();

        prop_assert_eq!(result.profit_margin_percent, margin);
        prop_assert_eq!(
            result.net_profit,
            round_money(result.customer_total_cost * margin / Decimal::ONE_HUNDRED, 2)
        );
    }

    /// A discount never raises the customer cost.
    #[test]
    fn prop_discount_never_raises_cost(input in arb_input()) {
        let registry = registry_for(std::slice::from_ref(&input));
        let engine = PricingEngine::default();
        let mut undiscounted = input.clone();
        undiscounted.discount_percent = Decimal::ZERO;

        let discounted = engine.calculate(&registry, &input).unwrap();
        let full_price = engine.calculate(&registry, &undiscounted).unwrap();
        prop_assert!(discounted.customer_total_cost <= full_price.customer_total_cost);
        prop_assert_eq!(discounted.professional_revenue, full_price.professional_revenue);
    }

    /// Identical inputs give identical results, with or without the cache.
    #[test]
    fn prop_calculate_is_idempotent(input in arb_input()) {
        let registry = registry_for(std::slice::from_ref(&input));
        let plain = PricingEngine::default();
        let cached = PricingEngine::default()
            .with_cache(ResultCache::new(Duration::from_secs(300), 100));

        let expected = plain.calculate(&registry, &input).unwrap();
        prop_assert_eq!(&plain.calculate(&registry, &input).unwrap(), &expected);
        prop_assert_eq!(&cached.calculate(&registry, &input).unwrap(), &expected);
        prop_assert_eq!(&cached.calculate(&registry, &input).unwrap(), &expected);
    }

    /// Aggregate appointments and money are the sums of the per-day results,
    /// and the margin is recomputed from those sums.
    #[test]
    fn prop_aggregate_sums_and_margin(inputs in arb_inputs(6), events_per_year in 1u32..=52) {
        let registry = registry_for(&inputs);
        let aggregate = PricingEngine::default()
            .calculate_multiple(&registry, &inputs, events_per_year)
            .unwrap();
        let days = &aggregate.day_results;
        prop_assert_eq!(days.len(), inputs.len());

        let appointments: u64 = days.iter().map(|r| u64::from(r.total_appointments)).sum();
        let cost: Decimal = days.iter().map(|r| r.customer_total_cost).sum();
        let net: Decimal = days.iter().map(|r| r.net_profit).sum();
        let totals = &aggregate.totals;

        prop_assert_eq!(totals.total_appointments, appointments);
        prop_assert_eq!(totals.customer_total_cost, cost);
        prop_assert_eq!(totals.net_profit, net);
        prop_assert_eq!(
            totals.profit_margin_percent,
            round_money(net / cost * Decimal::ONE_HUNDRED, 2)
        );
        prop_assert_eq!(
            totals.annualized_cost,
            round_money(cost * Decimal::from(events_per_year), 2)
        );

        let location_cost: Decimal = aggregate
            .location_results
            .values()
            .map(|location| location.customer_total_cost)
            .sum();
        let location_appointments: u64 = aggregate
            .location_results
            .values()
            .map(|location| location.total_appointments)
            .sum();
        prop_assert_eq!(location_cost, cost);
        prop_assert_eq!(location_appointments, appointments);
    }

    /// Inputs at the edge of the decimal range give a typed error or a
    /// result, never a panic.
    #[test]
    fn prop_large_amounts_never_panic(
        service_type in arb_service_type(),
        total_hours in arb_large_amount(),
        professional_rate in arb_large_amount(),
        customer_rate in arb_large_amount(),
        fee in arb_large_amount(),
        events_per_year in 1u32..=u32::MAX,
    ) {
        let input = CalculationInput::new(
            service_type,
            total_hours,
            Decimal::from(15),
            3,
            professional_rate,
        )
        .with_customer_rate(customer_rate)
        .with_early_arrival_fee(fee)
        .with_events_per_year(events_per_year);
        let registry = registry_for(std::slice::from_ref(&input));
        let engine = PricingEngine::default();

        if let Ok(result) = engine.calculate(&registry, &input) {
            prop_assert!(result.customer_total_cost >= Decimal::ZERO);
        }
        let inputs = vec![input.clone(), input];
        let _ = engine.calculate_multiple(&registry, &inputs, events_per_year);
    }
}
