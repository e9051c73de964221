//! Capability contracts for the scaler and classifier artefacts.
//!
//! The store only ever talks to these traits, so any implementation that can
//! transform a feature vector or classify one is substitutable.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or evaluating an artefact.
#[derive(Debug, Error)]
pub enum ArtefactError {
    #[error("failed to read artefact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artefact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artefact: {0}")]
    Invalid(String),

    #[error("expected {expected} features, got {actual}")]
    Shape { expected: usize, actual: usize },
}

impl ArtefactError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ArtefactError::Invalid(msg.into())
    }

    /// Shape guard shared by every artefact.
    pub fn check_len(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(ArtefactError::Shape { expected, actual })
        }
    }
}

/// Output of a single classification.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub class: i64,
    /// Per-class probabilities, present only when the classifier estimates them.
    pub probabilities: Option<Vec<f64>>,
}

/// Feature scaling capability.
pub trait Scaler: Send + Sync {
    /// Short name reported by the model-info endpoint.
    fn kind(&self) -> &str;
    fn n_features(&self) -> usize;
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtefactError>;
}

/// Classification capability.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &str;
    fn n_features(&self) -> usize;
    fn classify(&self, features: &[f64]) -> Result<Classification, ArtefactError>;
}
