//! Process-lifetime holder for the loaded scaler and classifier.

use thiserror::Error;
use tracing::{error, info};

use crate::inference::domain::NUM_MODEL_FEATURES;

use super::domain::{ArtefactError, Classification, Classifier, Scaler};
use super::repo_fs::FsArtefactRepo;

/// Load status reported by health probes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StoreStatus {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
}

impl StoreStatus {
    pub fn available(&self) -> bool {
        self.model_loaded && self.scaler_loaded
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("model store unavailable")]
    Unavailable(StoreStatus),
    #[error(transparent)]
    Artefact(#[from] ArtefactError),
}

/// Immutable after construction. A store missing either artefact stays
/// unavailable for its whole lifetime.
pub struct ModelStore {
    scaler: Option<Box<dyn Scaler>>,
    classifier: Option<Box<dyn Classifier>>,
}

impl ModelStore {
    pub fn new(scaler: Box<dyn Scaler>, classifier: Box<dyn Classifier>) -> Self {
        Self::from_parts(Some(scaler), Some(classifier))
    }

    pub fn from_parts(
        scaler: Option<Box<dyn Scaler>>,
        classifier: Option<Box<dyn Classifier>>,
    ) -> Self {
        Self { scaler, classifier }
    }

    pub fn unavailable() -> Self {
        Self::from_parts(None, None)
    }

    /// Load both artefacts once. Failures are logged and leave the store
    /// unavailable; nothing is retried.
    pub fn load(repo: &FsArtefactRepo) -> Self {
        Self::load_with_width(repo, NUM_MODEL_FEATURES)
    }

    /// Like `load`, but an artefact whose input width differs from
    /// `n_features` is treated as a load failure.
    pub fn load_with_width(repo: &FsArtefactRepo, n_features: usize) -> Self {
        let classifier = match repo.load_classifier().and_then(|model| {
            ArtefactError::check_len(n_features, model.n_features())?;
            Ok(model)
        }) {
            Ok(model) => {
                info!(path = %repo.model_path().display(), kind = model.kind(), "model loaded");
                Some(Box::new(model) as Box<dyn Classifier>)
            }
            Err(err) => {
                error!(path = %repo.model_path().display(), error = %err, "failed to load model");
                None
            }
        };

        let scaler = match repo.load_scaler().and_then(|scaler| {
            ArtefactError::check_len(n_features, scaler.n_features())?;
            Ok(scaler)
        }) {
            Ok(scaler) => {
                info!(path = %repo.scaler_path().display(), kind = scaler.kind(), "scaler loaded");
                Some(Box::new(scaler) as Box<dyn Scaler>)
            }
            Err(err) => {
                error!(path = %repo.scaler_path().display(), error = %err, "failed to load scaler");
                None
            }
        };

        Self::from_parts(scaler, classifier)
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            model_loaded: self.classifier.is_some(),
            scaler_loaded: self.scaler.is_some(),
        }
    }

    pub fn available(&self) -> bool {
        self.status().available()
    }

    pub fn classifier_kind(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.kind())
    }

    pub fn scaler_kind(&self) -> Option<&str> {
        self.scaler.as_deref().map(|s| s.kind())
    }

    fn parts(&self) -> Result<(&dyn Scaler, &dyn Classifier), StoreError> {
        match (self.scaler.as_deref(), self.classifier.as_deref()) {
            (Some(scaler), Some(classifier)) => Ok((scaler, classifier)),
            _ => Err(StoreError::Unavailable(self.status())),
        }
    }

    pub fn scale(&self, features: &[f64]) -> Result<Vec<f64>, StoreError> {
        let (scaler, _) = self.parts()?;
        Ok(scaler.transform(features)?)
    }

    pub fn classify(&self, features: &[f64]) -> Result<Classification, StoreError> {
        let (_, classifier) = self.parts()?;
        Ok(classifier.classify(features)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classifier::{ClassifierArtefact, DecisionTree, TreeNode};
    use crate::model::scaler::ScalerArtefact;

    fn scaler() -> Box<dyn Scaler> {
        Box::new(ScalerArtefact::Standard {
            mean: vec![0.0],
            scale: vec![2.0],
        })
    }

    fn classifier() -> Box<dyn Classifier> {
        Box::new(ClassifierArtefact::RandomForest {
            n_features: 1,
            classes: vec![4],
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Leaf { value: vec![1.0] }],
            }],
        })
    }

    #[test]
    fn complete_store_is_available() {
        let store = ModelStore::new(scaler(), classifier());
        assert!(store.available());
        assert_eq!(store.scale(&[4.0]).unwrap(), vec![2.0]);
        assert_eq!(store.classify(&[2.0]).unwrap().class, 4);
        assert_eq!(store.classifier_kind(), Some("random_forest"));
        assert_eq!(store.scaler_kind(), Some("standard"));
    }

    #[test]
    fn partial_store_reports_each_artefact() {
        let store = ModelStore::from_parts(Some(scaler()), None);
        assert!(!store.available());
        assert_eq!(
            store.status(),
            StoreStatus {
                model_loaded: false,
                scaler_loaded: true
            }
        );
        assert!(matches!(store.scale(&[1.0]), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.classify(&[1.0]), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn failed_load_leaves_store_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsArtefactRepo::with_paths(dir.path().join("m.json"), dir.path().join("s.json"));
        let store = ModelStore::load(&repo);
        assert!(!store.available());
        assert_eq!(store.classifier_kind(), None);
    }

    fn write(path: &std::path::Path, contents: &str) {
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn artefacts_of_the_wrong_width_are_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("m.json");
        let scaler = dir.path().join("s.json");
        write(
            &model,
            r#"{"kind":"random_forest","n_features":10,"classes":[0,1],"trees":[{"nodes":[{"value":[1,0]}]}]}"#,
        );
        write(&scaler, r#"{"kind":"standard","mean":[0,0,0],"scale":[1,1,1]}"#);

        let store = ModelStore::load(&FsArtefactRepo::with_paths(&model, &scaler));
        assert_eq!(
            store.status(),
            StoreStatus {
                model_loaded: true,
                scaler_loaded: false
            }
        );
        assert!(!store.available());

        let store = ModelStore::load_with_width(&FsArtefactRepo::with_paths(&model, &scaler), 3);
        assert_eq!(
            store.status(),
            StoreStatus {
                model_loaded: false,
                scaler_loaded: true
            }
        );
    }

    #[test]
    fn bundled_artefacts_match_the_schema_width() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("health_model");
        let repo = FsArtefactRepo::with_paths(root.join("HealthPredict.json"), root.join("HealthScaler.json"));
        assert!(ModelStore::load(&repo).available());
    }

    #[test]
    fn artefact_errors_pass_through() {
        let store = ModelStore::new(scaler(), classifier());
        assert!(matches!(
            store.scale(&[1.0, 2.0]),
            Err(StoreError::Artefact(ArtefactError::Shape { .. }))
        ));
    }
}
