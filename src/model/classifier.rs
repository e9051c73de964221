//! Serialized classifiers: a tree ensemble with probability estimates and a
//! linear one-vs-rest model without them.

use serde::{Deserialize, Serialize};

use super::domain::{ArtefactError, Classification, Classifier};

/// Classifier artefact as stored on disk, tagged by `kind`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtefact {
    RandomForest {
        n_features: usize,
        classes: Vec<i64>,
        trees: Vec<DecisionTree>,
    },
    Linear {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

/// Flat node array; node 0 is the root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TreeNode {
    /// Samples with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (counts or fractions) at the leaf.
    Leaf { value: Vec<f64> },
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ArtefactError> {
        if self.nodes.is_empty() {
            return Err(ArtefactError::invalid("tree has no nodes"));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(ArtefactError::invalid(format!(
                            "node {idx} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(ArtefactError::invalid(format!(
                            "node {idx} points outside the tree"
                        )));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(ArtefactError::invalid(format!(
                            "leaf {idx} has {} weights for {n_classes} classes",
                            value.len()
                        )));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(ArtefactError::invalid(format!(
                            "leaf {idx} has a negative or non-finite weight"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its normalized distribution.
    fn leaf_distribution(&self, features: &[f64]) -> Result<Vec<f64>, ArtefactError> {
        let mut idx = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if total > 0.0 {
                        return Ok(value.iter().map(|w| w / total).collect());
                    }
                    return Ok(value.clone());
                }
            }
        }
        Err(ArtefactError::invalid("tree contains a cycle"))
    }
}

/// Index of the first maximum.
fn arg_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

impl ClassifierArtefact {
    pub fn validate(&self) -> Result<(), ArtefactError> {
        match self {
            ClassifierArtefact::RandomForest {
                n_features,
                classes,
                trees,
            } => {
                if classes.is_empty() {
                    return Err(ArtefactError::invalid("random_forest has no classes"));
                }
                if trees.is_empty() {
                    return Err(ArtefactError::invalid("random_forest has no trees"));
                }
                for (idx, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features, classes.len())
                        .map_err(|err| match err {
                            ArtefactError::Invalid(msg) => {
                                ArtefactError::invalid(format!("tree {idx}: {msg}"))
                            }
                            other => other,
                        })?;
                }
            }
            ClassifierArtefact::Linear {
                classes,
                coef,
                intercept,
            } => {
                if classes.is_empty() {
                    return Err(ArtefactError::invalid("linear model has no classes"));
                }
                let binary = classes.len() == 2 && coef.len() == 1;
                if coef.len() != classes.len() && !binary {
                    return Err(ArtefactError::invalid(format!(
                        "linear model has {} coefficient rows for {} classes",
                        coef.len(),
                        classes.len()
                    )));
                }
                if intercept.len() != coef.len() {
                    return Err(ArtefactError::invalid(format!(
                        "linear model has {} intercepts for {} coefficient rows",
                        intercept.len(),
                        coef.len()
                    )));
                }
                let width = coef[0].len();
                if width == 0 || coef.iter().any(|row| row.len() != width) {
                    return Err(ArtefactError::invalid(
                        "linear model coefficient rows differ in width",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Classifier for ClassifierArtefact {
    fn kind(&self) -> &str {
        match self {
            ClassifierArtefact::RandomForest { .. } => "random_forest",
            ClassifierArtefact::Linear { .. } => "linear",
        }
    }

    fn n_features(&self) -> usize {
        match self {
            ClassifierArtefact::RandomForest { n_features, .. } => *n_features,
            ClassifierArtefact::Linear { coef, .. } => coef.first().map_or(0, Vec::len),
        }
    }

    fn classify(&self, features: &[f64]) -> Result<Classification, ArtefactError> {
        ArtefactError::check_len(self.n_features(), features.len())?;
        match self {
            ClassifierArtefact::RandomForest { classes, trees, .. } => {
                let mut probabilities = vec![0.0; classes.len()];
                for tree in trees {
                    let dist = tree.leaf_distribution(features)?;
                    for (acc, p) in probabilities.iter_mut().zip(dist) {
                        *acc += p;
                    }
                }
                let n_trees = trees.len() as f64;
                probabilities.iter_mut().for_each(|p| *p /= n_trees);

                let best = arg_max(&probabilities)
                    .ok_or_else(|| ArtefactError::invalid("random_forest has no classes"))?;
                Ok(Classification {
                    class: classes[best],
                    probabilities: Some(probabilities),
                })
            }
            ClassifierArtefact::Linear {
                classes,
                coef,
                intercept,
            } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
                    .collect();

                let class = if classes.len() == 2 && scores.len() == 1 {
                    if scores[0] > 0.0 {
                        classes[1]
                    } else {
                        classes[0]
                    }
                } else {
                    let best = arg_max(&scores)
                        .ok_or_else(|| ArtefactError::invalid("linear model has no classes"))?;
                    classes[best]
                };

                Ok(Classification {
                    class,
                    probabilities: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(value: &[f64]) -> TreeNode {
        TreeNode::Leaf {
            value: value.to_vec(),
        }
    }

    fn stump(feature: usize, threshold: f64, left: &[f64], right: &[f64]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                leaf(left),
                leaf(right),
            ],
        }
    }

    fn forest() -> ClassifierArtefact {
        ClassifierArtefact::RandomForest {
            n_features: 2,
            classes: vec![0, 1, 2],
            trees: vec![
                stump(0, 0.5, &[0.0, 0.0, 4.0], &[4.0, 0.0, 0.0]),
                stump(1, 0.5, &[0.0, 2.0, 2.0], &[1.0, 3.0, 0.0]),
            ],
        }
    }

    #[test]
    fn forest_averages_leaf_distributions() {
        let out = forest().classify(&[0.2, 0.2]).unwrap();
        assert_eq!(out.class, 2);
        assert_eq!(out.probabilities, Some(vec![0.0, 0.25, 0.75]));

        let out = forest().classify(&[0.9, 0.9]).unwrap();
        assert_eq!(out.class, 0);
        assert_eq!(out.probabilities, Some(vec![0.625, 0.375, 0.0]));
    }

    #[test]
    fn forest_ties_resolve_to_first_class() {
        let model = ClassifierArtefact::RandomForest {
            n_features: 1,
            classes: vec![3, 4],
            trees: vec![DecisionTree {
                nodes: vec![leaf(&[1.0, 1.0])],
            }],
        };
        assert_eq!(model.classify(&[0.0]).unwrap().class, 3);
    }

    #[test]
    fn forest_rejects_dangling_children() {
        let model = ClassifierArtefact::RandomForest {
            n_features: 1,
            classes: vec![0],
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 7,
                }],
            }],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn forest_rejects_negative_or_non_finite_leaf_weights() {
        for weights in [[-1.0, 2.0], [f64::NAN, 1.0], [f64::INFINITY, 0.0]] {
            let model = ClassifierArtefact::RandomForest {
                n_features: 1,
                classes: vec![0, 1],
                trees: vec![DecisionTree {
                    nodes: vec![leaf(&weights)],
                }],
            };
            assert!(
                matches!(model.validate(), Err(ArtefactError::Invalid(_))),
                "weights {weights:?}"
            );
        }
    }

    #[test]
    fn tree_errors_name_the_tree_once() {
        let model = ClassifierArtefact::RandomForest {
            n_features: 1,
            classes: vec![0, 1],
            trees: vec![
                DecisionTree {
                    nodes: vec![leaf(&[1.0, 0.0])],
                },
                DecisionTree {
                    nodes: vec![leaf(&[1.0])],
                },
            ],
        };
        let err = model.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid artefact: tree 1: leaf 0 has 1 weights for 2 classes"
        );
    }

    #[test]
    fn forest_detects_cycles() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(matches!(
            tree.leaf_distribution(&[1.0]),
            Err(ArtefactError::Invalid(_))
        ));
    }

    #[test]
    fn linear_picks_highest_score_without_probabilities() {
        let model = ClassifierArtefact::Linear {
            classes: vec![0, 1, 2],
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercept: vec![0.0, 0.5, 0.0],
        };
        model.validate().unwrap();
        let out = model.classify(&[1.0, 1.0]).unwrap();
        assert_eq!(out.class, 1);
        assert_eq!(out.probabilities, None);
    }

    #[test]
    fn linear_binary_uses_sign_of_single_row() {
        let model = ClassifierArtefact::Linear {
            classes: vec![3, 4],
            coef: vec![vec![1.0]],
            intercept: vec![-1.0],
        };
        model.validate().unwrap();
        assert_eq!(model.classify(&[2.0]).unwrap().class, 4);
        assert_eq!(model.classify(&[0.5]).unwrap().class, 3);
    }

    #[test]
    fn wrong_width_is_a_shape_error() {
        let err = forest().classify(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ArtefactError::Shape { expected: 2, actual: 3 }));
    }

    #[test]
    fn deserializes_tagged_forest() {
        let json = r#"{
            "kind": "random_forest",
            "n_features": 1,
            "classes": [0, 1],
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 1.5, "left": 1, "right": 2},
                {"value": [3, 1]},
                {"value": [0, 2]}
            ]}]
        }"#;
        let model: ClassifierArtefact = serde_json::from_str(json).unwrap();
        model.validate().unwrap();
        assert_eq!(model.kind(), "random_forest");
        assert_eq!(model.classify(&[2.0]).unwrap().class, 1);
    }
}
