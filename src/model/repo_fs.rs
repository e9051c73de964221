//! Filesystem access to the serialized scaler and classifier artefacts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::common::config::AppCfg;

use super::classifier::ClassifierArtefact;
use super::domain::ArtefactError;
use super::scaler::ScalerArtefact;

/// Reads artefacts from the paths named in the configuration.
#[derive(Clone, Debug)]
pub struct FsArtefactRepo {
    model_path: PathBuf,
    scaler_path: PathBuf,
}

impl FsArtefactRepo {
    pub fn new(cfg: &AppCfg) -> Self {
        Self::with_paths(&cfg.model_path, &cfg.scaler_path)
    }

    pub fn with_paths(model_path: impl AsRef<Path>, scaler_path: impl AsRef<Path>) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            scaler_path: scaler_path.as_ref().to_path_buf(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    pub fn load_classifier(&self) -> Result<ClassifierArtefact, ArtefactError> {
        let model: ClassifierArtefact = read_json(&self.model_path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load_scaler(&self) -> Result<ScalerArtefact, ArtefactError> {
        let scaler: ScalerArtefact = read_json(&self.scaler_path)?;
        scaler.validate()?;
        Ok(scaler)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtefactError> {
    let raw = fs::read(path).map_err(|source| ArtefactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ArtefactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
