//! Shared utilities that glue the model store, inference and API together.
pub mod config;
pub mod error;
pub mod log;

pub use error::{HealthCode, HealthError, HealthResult};
