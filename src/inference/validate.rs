//! Request validation and feature assembly.
//!
//! Turns an untrusted JSON payload into the ordered model vector. Steps run in
//! a fixed order and stop at the first failing one:
//!
//! 1. the payload must be a non-empty object,
//! 2. absent defaultable fields are filled with 0.0 on a private copy,
//! 3. every accepted field must be present (all missing names are reported),
//! 4. schema values are coerced to `f64` in order (the first bad value is reported),
//! 5. the schema values become the model vector.
//!
//! Defaultable fields never fail a request: they are echoed when they coerce
//! and dropped otherwise.

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::error::{HealthError, HealthResult};

use super::domain::{
    accepted_fields, AssembledFeatures, FeatureSet, DEFAULTABLE_FEATURES, DEFAULT_FEATURE_VALUE,
    FEATURE_SCHEMA, NUM_MODEL_FEATURES,
};

/// Validate `payload` and assemble the model input. The caller's value is
/// never modified.
pub fn assemble(payload: &Value) -> HealthResult<AssembledFeatures> {
    let mut fields = match payload {
        Value::Object(map) if !map.is_empty() => map.clone(),
        _ => return Err(HealthError::EmptyPayload),
    };

    inject_defaults(&mut fields);

    let missing: Vec<String> = accepted_fields()
        .filter(|name| !fields.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(HealthError::MissingFeatures { missing });
    }

    let mut model_vector = [0.0; NUM_MODEL_FEATURES];
    let mut full_features = FeatureSet::with_capacity(NUM_MODEL_FEATURES + DEFAULTABLE_FEATURES.len());
    for (slot, name) in model_vector.iter_mut().zip(FEATURE_SCHEMA) {
        let raw = &fields[name];
        *slot = coerce(raw).ok_or_else(|| HealthError::invalid_value(name, raw))?;
        full_features.push(name, *slot);
    }

    for name in DEFAULTABLE_FEATURES {
        match coerce(&fields[name]) {
            Some(value) => full_features.push(name, value),
            None => debug!(feature = name, "dropped non-numeric optional feature"),
        }
    }

    Ok(AssembledFeatures {
        model_vector,
        full_features,
    })
}

fn inject_defaults(fields: &mut Map<String, Value>) {
    for name in DEFAULTABLE_FEATURES {
        if !fields.contains_key(name) {
            debug!(feature = name, "defaulted missing feature to 0.0");
            fields.insert(name.to_string(), Value::from(DEFAULT_FEATURE_VALUE));
        }
    }
}

/// Numeric coercion for a single payload value.
///
/// Numbers convert directly, booleans become 1.0/0.0 and strings are parsed
/// after trimming surrounding whitespace. `null`, arrays and objects fail.
pub fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
