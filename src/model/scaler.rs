//! Serialized feature scalers.

use serde::{Deserialize, Serialize};

use super::domain::{ArtefactError, Scaler};

fn unit_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Scaler artefact as stored on disk, tagged by `kind`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtefact {
    /// Rescales each column from `[data_min, data_max]` onto `feature_range`.
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "unit_range")]
        feature_range: [f64; 2],
    },
    /// Centres on `mean` and divides by `scale`.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

// Constant columns keep a unit divisor instead of dividing by zero.
fn non_zero(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

impl ScalerArtefact {
    pub fn validate(&self) -> Result<(), ArtefactError> {
        match self {
            ScalerArtefact::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                if data_min.is_empty() {
                    return Err(ArtefactError::invalid("min_max scaler has no columns"));
                }
                if data_min.len() != data_max.len() {
                    return Err(ArtefactError::invalid(format!(
                        "min_max scaler has {} minimums but {} maximums",
                        data_min.len(),
                        data_max.len()
                    )));
                }
                if feature_range[0] >= feature_range[1] {
                    return Err(ArtefactError::invalid(format!(
                        "min_max feature_range {feature_range:?} is not increasing"
                    )));
                }
            }
            ScalerArtefact::Standard { mean, scale } => {
                if mean.is_empty() {
                    return Err(ArtefactError::invalid("standard scaler has no columns"));
                }
                if mean.len() != scale.len() {
                    return Err(ArtefactError::invalid(format!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Scaler for ScalerArtefact {
    fn kind(&self) -> &str {
        match self {
            ScalerArtefact::MinMax { .. } => "min_max",
            ScalerArtefact::Standard { .. } => "standard",
        }
    }

    fn n_features(&self) -> usize {
        match self {
            ScalerArtefact::MinMax { data_min, .. } => data_min.len(),
            ScalerArtefact::Standard { mean, .. } => mean.len(),
        }
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtefactError> {
        ArtefactError::check_len(self.n_features(), features.len())?;
        let scaled = match self {
            ScalerArtefact::MinMax {
                data_min,
                data_max,
                feature_range: [lo, hi],
            } => features
                .iter()
                .zip(data_min.iter().zip(data_max))
                .map(|(x, (min, max))| (x - min) / non_zero(max - min) * (hi - lo) + lo)
                .collect(),
            ScalerArtefact::Standard { mean, scale } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / non_zero(*s))
                .collect(),
        };
        Ok(scaled)
    }
}
