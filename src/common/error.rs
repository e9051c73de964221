//! Error handling primitives shared across the core.
//!
//! Every failure a caller can observe maps to one `HealthError` variant, and
//! every variant carries a stable numeric code that the HTTP layer echoes back.

use serde_json::Value;
use thiserror::Error;

/// Stable error codes surfaced in API responses.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HealthCode {
    /// Payload was absent, not an object, or empty.
    EmptyPayload = 1,
    /// One or more required features were absent.
    MissingFeatures = 2,
    /// A feature value could not be converted to a number.
    InvalidFeatureValue = 3,
    /// Scaler or classifier artefact failed to load at startup.
    ModelUnavailable = 4,
    /// Scaling or classification failed unexpectedly.
    InferenceFailed = 5,
}

/// Canonical error type for the core.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HealthError {
    #[error("no JSON object provided")]
    EmptyPayload,

    #[error("missing required features: {}", .missing.join(", "))]
    MissingFeatures { missing: Vec<String> },

    #[error("feature {field} must be numeric, received {received}")]
    InvalidFeatureValue { field: String, received: String },

    #[error("model or scaler not loaded (model loaded: {model_loaded}, scaler loaded: {scaler_loaded})")]
    ModelUnavailable {
        model_loaded: bool,
        scaler_loaded: bool,
    },

    /// The cause is logged where it happens and never reaches callers.
    #[error("prediction failed unexpectedly")]
    InferenceFailed,
}

/// Result alias used throughout the crate.
pub type HealthResult<T> = Result<T, HealthError>;

impl HealthError {
    pub fn code(&self) -> HealthCode {
        match self {
            HealthError::EmptyPayload => HealthCode::EmptyPayload,
            HealthError::MissingFeatures { .. } => HealthCode::MissingFeatures,
            HealthError::InvalidFeatureValue { .. } => HealthCode::InvalidFeatureValue,
            HealthError::ModelUnavailable { .. } => HealthCode::ModelUnavailable,
            HealthError::InferenceFailed => HealthCode::InferenceFailed,
        }
    }

    /// Whether the caller can fix the failure by resubmitting corrected input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HealthError::EmptyPayload
                | HealthError::MissingFeatures { .. }
                | HealthError::InvalidFeatureValue { .. }
        )
    }

    /// Validation helper rendering the offending value for diagnostics.
    pub fn invalid_value(field: &str, received: &Value) -> Self {
        let received = match received {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        HealthError::InvalidFeatureValue {
            field: field.to_string(),
            received,
        }
    }
}
