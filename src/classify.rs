use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classifier capability
// ---------------------------------------------------------------------------

/// The capability the evaluation layer needs from a trained model: hard
/// labels and class-1 probabilities for a feature matrix.
///
/// Passed by reference wherever it is used, so tests can substitute stubs
/// without touching any global state.
pub trait BinaryClassifier {
    /// Class-1 probability per row, each in `[0, 1]`.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64>;

    /// Hard 0/1 label per row. Default: threshold the probability at 0.5.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| (p >= 0.5) as u8)
            .collect()
    }

    /// Training-time feature order, when the model records one. Evaluation
    /// uses this to refuse datasets whose columns are ordered differently,
    /// since position-addressed splits would silently mispredict.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

// ---------------------------------------------------------------------------
// Random forest – inference only
// ---------------------------------------------------------------------------

/// One node of a binary decision tree. Values `<=` the threshold go left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// Class-1 probability at this leaf.
        proba: f64,
    },
}

impl TreeNode {
    fn proba_for(&self, features: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { proba } => return *proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Training hyper-parameters carried along for the model card. The forest
/// itself is trained elsewhere; this crate only runs inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
    /// `None` = unbounded depth.
    pub max_depth: Option<usize>,
}

/// A serialized random-forest classifier: an ensemble of decision trees
/// whose leaf probabilities are averaged.
///
/// `feature_names` records the training-time feature order. Tree splits
/// address features by position, so evaluation refuses datasets whose
/// feature columns disagree with this list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    feature_names: Vec<String>,
    trees: Vec<TreeNode>,
    /// Normalized per-feature importances, same order as `feature_names`.
    feature_importances: Vec<f64>,
    params: ForestParams,
}

impl RandomForest {
    pub fn new(
        feature_names: Vec<String>,
        trees: Vec<TreeNode>,
        feature_importances: Vec<f64>,
        params: ForestParams,
    ) -> Self {
        RandomForest {
            feature_names,
            trees,
            feature_importances,
            params,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Feature names paired with their importances, for the explanation
    /// page's bar chart.
    pub fn feature_importance_map(&self) -> Vec<(&str, f64)> {
        self.feature_names
            .iter()
            .map(String::as_str)
            .zip(self.feature_importances.iter().copied())
            .collect()
    }

    fn proba_one(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.proba_for(features)).sum();
        sum / self.trees.len() as f64
    }
}

impl BinaryClassifier for RandomForest {
    fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.proba_one(row)).collect()
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(TreeNode::Leaf { proba: low }),
            right: Box::new(TreeNode::Leaf { proba: high }),
        }
    }

    fn demo_forest() -> RandomForest {
        RandomForest::new(
            vec!["age".into(), "smoker".into()],
            vec![stump(1, 0.5, 0.1, 0.9), stump(0, 40.0, 0.2, 0.6)],
            vec![0.4, 0.6],
            ForestParams {
                n_trees: 2,
                min_samples_split: 2,
                min_samples_leaf: 1,
                max_features: 2,
                max_depth: None,
            },
        )
    }

    #[test]
    fn proba_is_mean_of_tree_leaves() {
        let forest = demo_forest();
        // smoker=1, age=50 → trees give 0.9 and 0.6
        let p = forest.predict_proba(&[vec![50.0, 1.0]]);
        assert!((p[0] - 0.75).abs() < 1e-12);
        // non-smoker, age=20 → 0.1 and 0.2
        let p = forest.predict_proba(&[vec![20.0, 0.0]]);
        assert!((p[0] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn predict_thresholds_at_half() {
        let forest = demo_forest();
        let labels = forest.predict(&[vec![50.0, 1.0], vec![20.0, 0.0]]);
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn threshold_boundary_goes_left() {
        let tree = stump(0, 40.0, 0.0, 1.0);
        assert_eq!(tree.proba_for(&[40.0]), 0.0);
        assert_eq!(tree.proba_for(&[40.0001]), 1.0);
    }

    #[test]
    fn json_round_trip_preserves_predictions() {
        let forest = demo_forest();
        let text = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&text).unwrap();

        let x = vec![vec![35.0, 1.0], vec![64.0, 0.0]];
        assert_eq!(forest.predict_proba(&x), back.predict_proba(&x));
        assert_eq!(back.feature_names(), forest.feature_names());
    }
}
