//! Inference domain: payload validation, feature assembly and the responder
//! that turns a classification into a health-impact result.

pub mod domain;
pub mod service;
pub mod validate;

pub use domain::{AssembledFeatures, FeatureSet, PredictionResult, FEATURE_SCHEMA};
pub use service::{infer, predict};
pub use validate::assemble;
