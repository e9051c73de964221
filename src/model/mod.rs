//! Model store: the scaler and classifier artefacts loaded at startup.
//!
//! Artefacts are JSON documents tagged by `kind`; the rest of the crate only
//! sees them through the `Scaler` and `Classifier` traits.

pub mod classifier;
pub mod domain;
pub mod repo_fs;
pub mod scaler;
pub mod store;

pub use domain::{ArtefactError, Classification, Classifier, Scaler};
pub use repo_fs::FsArtefactRepo;
pub use store::{ModelStore, StoreError, StoreStatus};
