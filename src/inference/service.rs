//! Inference orchestration: availability check, scaling, classification and
//! response shaping.

use std::time::Instant;

use serde_json::Value;
use tracing::{error, info};

use crate::common::error::{HealthError, HealthResult};
use crate::model::{ModelStore, StoreError};

use super::domain::{class_info, AssembledFeatures, PredictionResult, FALLBACK_CONFIDENCE};
use super::validate;

/// Validate a raw payload and run it through the model.
///
/// Availability is checked before the payload is looked at, so an unavailable
/// store answers every request with `ModelUnavailable`.
pub fn predict(store: &ModelStore, payload: &Value) -> HealthResult<PredictionResult> {
    ensure_available(store)?;
    let features = validate::assemble(payload).map_err(|err| {
        info!(code = err.code() as u32, reason = %err, "rejected prediction request");
        err
    })?;
    infer(store, &features)
}

/// Run already-validated features through the scaler and classifier.
pub fn infer(store: &ModelStore, features: &AssembledFeatures) -> HealthResult<PredictionResult> {
    ensure_available(store)?;

    let start = Instant::now();
    let scaled = store.scale(&features.model_vector).map_err(inference_failure)?;
    if let Some(idx) = scaled.iter().position(|v| !v.is_finite()) {
        error!(feature_index = idx, "scaled features contain a non-finite value");
        return Err(HealthError::InferenceFailed);
    }
    let classification = store.classify(&scaled).map_err(inference_failure)?;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let confidence = confidence(classification.probabilities.as_deref());
    let info = class_info(classification.class);

    info!(
        class = classification.class,
        label = info.label,
        confidence,
        latency_ms,
        "prediction served"
    );

    Ok(PredictionResult {
        success: true,
        health_impact_class: classification.class,
        class_label: info.label,
        confidence,
        recommendations: info.recommendations,
        input_features: features.full_features.clone(),
        latency_ms,
    })
}

/// Highest class probability as a percentage rounded to one decimal (ties to
/// even), or the fallback when the classifier gives no probabilities.
pub fn confidence(probabilities: Option<&[f64]>) -> f64 {
    match probabilities {
        Some(probs) if !probs.is_empty() => {
            let max = probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max * 100.0 * 10.0).round_ties_even() / 10.0
        }
        _ => FALLBACK_CONFIDENCE,
    }
}

fn ensure_available(store: &ModelStore) -> HealthResult<()> {
    let status = store.status();
    if status.available() {
        Ok(())
    } else {
        Err(HealthError::ModelUnavailable {
            model_loaded: status.model_loaded,
            scaler_loaded: status.scaler_loaded,
        })
    }
}

fn inference_failure(err: StoreError) -> HealthError {
    match err {
        StoreError::Unavailable(status) => HealthError::ModelUnavailable {
            model_loaded: status.model_loaded,
            scaler_loaded: status.scaler_loaded,
        },
        StoreError::Artefact(err) => {
            error!(error = %err, "inference failed");
            HealthError::InferenceFailed
        }
    }
}
