//! Records handed to the persistence and sharing layers.
//!
//! Both store a calculation input next to its result and replay the input
//! through the engine on demand. Storage itself lives outside this crate.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{CalculationInput, CalculationResult};
use super::registry::ServiceRegistry;
use super::services::{CalculationError, PricingEngine};

const ACCESS_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ACCESS_CODE_LEN: usize = 6;

/// Proposal errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposalError {
    #[error("Malformed access code")]
    MalformedAccessCode,

    #[error("Access code does not match")]
    AccessDenied,

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

/// Six characters drawn from `A-Z0-9`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessCode(String);

impl AccessCode {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..ACCESS_CODE_LEN)
            .map(|_| ACCESS_CODE_CHARSET[rng.gen_range(0..ACCESS_CODE_CHARSET.len())] as char)
            .collect();
        AccessCode(code)
    }

    pub fn parse(code: &str) -> Result<Self, ProposalError> {
        let well_formed = code.len() == ACCESS_CODE_LEN
            && code.bytes().all(|b| ACCESS_CODE_CHARSET.contains(&b));
        if well_formed {
            Ok(AccessCode(code.to_string()))
        } else {
            Err(ProposalError::MalformedAccessCode)
        }
    }

    /// Exact, case-sensitive comparison
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccessCode {
    type Error = ProposalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AccessCode::parse(&value)
    }
}

impl From<AccessCode> for String {
    fn from(code: AccessCode) -> Self {
        code.0
    }
}

/// A calculation as kept by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub id: Uuid,
    pub input: CalculationInput,
    pub result: CalculationResult,
    pub saved_at: DateTime<Utc>,
}

impl SavedCalculation {
    pub fn new(input: CalculationInput, result: CalculationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            result,
            saved_at: Utc::now(),
        }
    }

    /// Replay the stored input through the engine.
    pub fn recalculate(
        &self,
        engine: &PricingEngine,
        registry: &ServiceRegistry,
    ) -> Result<CalculationResult, CalculationError> {
        engine.calculate(registry, &self.input)
    }
}

/// A calculator snapshot shared with a client behind an access code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    pub id: Uuid,
    pub access_code: AccessCode,
    #[serde(default)]
    pub client_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub calculator_state: CalculationInput,
    pub summary: CalculationResult,
}

impl ProposalSnapshot {
    /// Price `calculator_state` and wrap it with a fresh id and access code.
    pub fn create(
        engine: &PricingEngine,
        registry: &ServiceRegistry,
        calculator_state: CalculationInput,
        client_name: Option<String>,
    ) -> Result<Self, ProposalError> {
        let summary = engine.calculate(registry, &calculator_state)?;
        Ok(Self {
            id: Uuid::new_v4(),
            access_code: AccessCode::generate(),
            client_name,
            created_at: Utc::now(),
            calculator_state,
            summary,
        })
    }

    /// Gate access on an exact access-code match.
    pub fn open(&self, code: &str) -> Result<&Self, ProposalError> {
        if self.access_code.matches(code) {
            Ok(self)
        } else {
            Err(ProposalError::AccessDenied)
        }
    }

    pub fn recalculate(
        &self,
        engine: &PricingEngine,
        registry: &ServiceRegistry,
    ) -> Result<CalculationResult, CalculationError> {
        engine.calculate(registry, &self.calculator_state)
    }
}
