//! Pricing engine module for wellness events.
//!
//! Turns event parameters into appointment counts, revenue, customer cost,
//! margin and annualized totals. The HTTP routes are a thin layer over
//! [`PricingEngine`].

pub mod calculators;
pub mod models;
pub mod presets;
pub mod proposals;
pub mod registry;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use calculators::round_money;
pub use models::{
    AggregateResult, AggregateTotals, CalculationInput, CalculationResult, CustomService, ServiceType,
};
pub use presets::{get_preset, EventSize, PresetConfiguration};
pub use proposals::{AccessCode, ProposalError, ProposalSnapshot, SavedCalculation};
pub use registry::{RegistryError, ServiceRegistry};
pub use routes::router;
pub use services::{CalculationError, PricingEngine};
pub use validation::ValidationLimits;
