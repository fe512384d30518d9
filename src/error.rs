//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::{CalculationError, RegistryError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            AppError::Calculation(e) => {
                tracing::debug!("Calculation rejected: {}", e);
                let details = e.field().map(|field| serde_json::json!({ "field": field }));
                (StatusCode::UNPROCESSABLE_ENTITY, e.kind(), details)
            }
            AppError::Registry(e) => {
                let status = match e {
                    RegistryError::BuiltInName(_) => StatusCode::CONFLICT,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, "registry_error", None)
            }
        };

        let body = PricingErrorResponse {
            error_type: error_type.to_string(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
