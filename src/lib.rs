// lib.rs - air-quality health-impact prediction service
pub mod api;
pub mod common;
pub mod inference;
pub mod model;

pub use common::{HealthCode, HealthError, HealthResult};
pub use inference::{assemble, infer, predict, PredictionResult};
pub use model::{FsArtefactRepo, ModelStore};
