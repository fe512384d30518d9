//! Runtime configuration from environment variables (and `.env`).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::pricing::ValidationLimits;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub limits: ValidationLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            cache_enabled: true,
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
            limits: ValidationLimits::default(),
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = lookup("PRICING_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let cache_enabled =
            parse_var(&lookup, "PRICING_CACHE_ENABLED")?.unwrap_or(defaults.cache_enabled);
        let cache_ttl = parse_var::<u64, _>(&lookup, "PRICING_CACHE_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);
        let cache_capacity =
            parse_var(&lookup, "PRICING_CACHE_CAPACITY")?.unwrap_or(defaults.cache_capacity);

        let limits = ValidationLimits {
            min_appointment_minutes: parse_var::<Decimal, _>(&lookup, "PRICING_MIN_APPOINTMENT_MINUTES")?,
            max_appointment_minutes: parse_var::<Decimal, _>(&lookup, "PRICING_MAX_APPOINTMENT_MINUTES")?,
        };
        if let (Some(min), Some(max)) = (limits.min_appointment_minutes, limits.max_appointment_minutes) {
            if min > max {
                bail!("PRICING_MIN_APPOINTMENT_MINUTES ({}) exceeds PRICING_MAX_APPOINTMENT_MINUTES ({})", min, max);
            }
        }

        Ok(Self {
            bind_addr,
            cache_enabled,
            cache_ttl,
            cache_capacity,
            limits,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}
