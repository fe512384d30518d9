//! Caller-owned registry of custom service types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use super::models::{CustomService, ServiceType, BUILT_IN_SERVICE_NAMES, DEFAULT_CUSTOM_MARGIN};

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Cannot override built-in service type: {0}")]
    BuiltInName(String),

    #[error("Service type name must not be empty")]
    EmptyName,

    #[error("Margin for '{name}' must be at least 0 and below 100, got {margin}")]
    InvalidMargin { name: String, margin: Decimal },
}

/// Custom service types known to a caller.
///
/// Built-ins are always accepted and never stored here.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    custom: BTreeMap<String, CustomService>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom service type.
    ///
    /// Missing margin defaults to 25%, missing retouching flag to `false`.
    pub fn register(
        &mut self,
        name: &str,
        margin: Option<Decimal>,
        requires_retouching: Option<bool>,
    ) -> Result<ServiceType, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if BUILT_IN_SERVICE_NAMES.contains(&name) {
            return Err(RegistryError::BuiltInName(name.to_string()));
        }

        let margin = margin.unwrap_or(DEFAULT_CUSTOM_MARGIN);
        if margin < Decimal::ZERO || margin >= dec!(100) {
            return Err(RegistryError::InvalidMargin {
                name: name.to_string(),
                margin,
            });
        }

        let service = CustomService {
            name: name.to_string(),
            margin,
            requires_retouching: requires_retouching.unwrap_or(false),
        };
        if self.custom.insert(name.to_string(), service.clone()).is_some() {
            info!("Replaced custom service type: {}", name);
        } else {
            info!("Registered custom service type: {}", name);
        }

        Ok(ServiceType::Custom(service))
    }

    pub fn remove(&mut self, name: &str) -> Option<CustomService> {
        self.custom.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&CustomService> {
        self.custom.get(name)
    }

    /// Built-ins always; custom services only when the payload matches the
    /// registered entry exactly.
    pub fn contains(&self, service_type: &ServiceType) -> bool {
        match service_type {
            ServiceType::Custom(custom) => self.custom.get(&custom.name) == Some(custom),
            _ => true,
        }
    }

    /// Resolve a service by name, built-ins first.
    pub fn resolve(&self, name: &str) -> Option<ServiceType> {
        ServiceType::built_in(name)
            .or_else(|| self.custom.get(name).cloned().map(ServiceType::Custom))
    }

    /// All known service types, built-ins first.
    pub fn service_types(&self) -> Vec<ServiceType> {
        BUILT_IN_SERVICE_NAMES
            .iter()
            .filter_map(|name| ServiceType::built_in(name))
            .chain(self.custom.values().cloned().map(ServiceType::Custom))
            .collect()
    }
}
