use thiserror::Error;

use crate::classify::BinaryClassifier;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a metric could not be computed for the selected subset. Shown to the
/// user as "not computable", never a crash.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("subset contains no rows")]
    Empty,
    #[error("ROC-AUC is undefined when only one class is present ({n} rows, all label {label})")]
    SingleClass { n: usize, label: u8 },
    #[error("model was trained on features {expected:?} but the dataset provides {got:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Metrics for one classifier on one filtered subset.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub n_examples: usize,
    pub n_positive: usize,
    /// Fraction of exact label matches.
    pub accuracy: f64,
    /// Area under the ROC curve (threshold-independent).
    pub roc_auc: f64,
    /// Ordered `[fpr, tpr]` points from `[0, 0]` to `[1, 1]`.
    pub roc_points: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a classifier on a (typically filtered) dataset.
///
/// Splits the dataset into a feature matrix and binary label vector, then
/// computes accuracy, ROC-AUC, and the ROC curve points. The classifier is
/// an injected collaborator; nothing here reads global state.
pub fn evaluate(
    dataset: &Dataset,
    model: &dyn BinaryClassifier,
) -> Result<EvaluationResult, EvalError> {
    if dataset.is_empty() {
        return Err(EvalError::Empty);
    }

    if let Some(expected) = model.feature_names() {
        let got = dataset.feature_columns();
        if expected.iter().map(String::as_str).ne(got.iter().copied()) {
            return Err(EvalError::FeatureMismatch {
                expected: expected.to_vec(),
                got: got.iter().map(|c| c.to_string()).collect(),
            });
        }
    }

    let y = dataset.labels();
    let n_positive = y.iter().filter(|&&l| l == 1).count();
    if n_positive == 0 || n_positive == y.len() {
        return Err(EvalError::SingleClass {
            n: y.len(),
            label: y[0],
        });
    }

    let x = dataset.feature_matrix();
    let predictions = model.predict(&x);
    let probabilities = model.predict_proba(&x);

    let correct = predictions
        .iter()
        .zip(y.iter())
        .filter(|(p, t)| p == t)
        .count();
    let accuracy = correct as f64 / y.len() as f64;

    let (roc_points, roc_auc) = roc_curve(&y, &probabilities);

    Ok(EvaluationResult {
        n_examples: y.len(),
        n_positive,
        accuracy,
        roc_auc,
        roc_points,
    })
}

/// Sweep all probability thresholds and return the `[fpr, tpr]` curve plus
/// its trapezoid area. Rows sharing a score move together (tie grouping),
/// so a constant score collapses to the diagonal and AUC 0.5.
///
/// Caller guarantees both classes are present.
fn roc_curve(y: &[u8], scores: &[f64]) -> (Vec<[f64; 2]>, f64) {
    let n_pos = y.iter().filter(|&&l| l == 1).count() as f64;
    let n_neg = y.len() as f64 - n_pos;

    let mut order: Vec<usize> = (0..y.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![[0.0, 0.0]];
    let mut auc = 0.0;
    let (mut tp, mut fp) = (0.0f64, 0.0f64);
    let (mut fpr_prev, mut tpr_prev) = (0.0f64, 0.0f64);

    let mut i = 0;
    while i < order.len() {
        let score = scores[order[i]];
        let mut j = i;
        while j < order.len() && scores[order[j]].total_cmp(&score).is_eq() {
            if y[order[j]] == 1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            j += 1;
        }

        let tpr = tp / n_pos;
        let fpr = fp / n_neg;
        auc += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;
        points.push([fpr, tpr]);

        fpr_prev = fpr;
        tpr_prev = tpr;
        i = j;
    }

    (points, auc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{Dataset, Region, SchemaVariant, Sex, Smoker};

    /// Test double: fixed probability per row, independent of the input.
    struct ConstantModel {
        proba: f64,
    }

    impl BinaryClassifier for ConstantModel {
        fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
            vec![self.proba; x.len()]
        }
    }

    /// Test double that reads the smoker feature column directly.
    struct SmokerOracle;

    impl BinaryClassifier for SmokerOracle {
        fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
            // encoded feature order: age, bmi, children, sex, smoker, …
            x.iter().map(|row| if row[4] > 0.5 { 0.95 } else { 0.05 }).collect()
        }
    }

    fn dataset(labels: &[(Smoker, f64)]) -> Dataset {
        let records = labels
            .iter()
            .map(|(smoker, charges)| {
                record(30, Sex::Female, *smoker, Region::Northeast, *charges)
            })
            .collect();
        Dataset::from_records(records, SchemaVariant::Encoded)
    }

    #[test]
    fn constant_model_gets_majority_accuracy_and_diagonal_auc() {
        // 3 negatives, 1 positive; constant p=0.7 predicts all positive
        let ds = dataset(&[
            (Smoker::No, 2_000.0),
            (Smoker::No, 3_000.0),
            (Smoker::No, 4_000.0),
            (Smoker::Yes, 30_000.0),
        ]);
        let result = evaluate(&ds, &ConstantModel { proba: 0.7 }).unwrap();
        assert!((result.accuracy - 0.25).abs() < 1e-12);
        assert!((result.roc_auc - 0.5).abs() < 1e-12);
        assert_eq!(result.roc_points, vec![[0.0, 0.0], [1.0, 1.0]]);

        // constant p=0.2 predicts all negative: accuracy flips to 0.75
        let result = evaluate(&ds, &ConstantModel { proba: 0.2 }).unwrap();
        assert!((result.accuracy - 0.75).abs() < 1e-12);
        assert!((result.roc_auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn perfect_separation_scores_auc_one() {
        let ds = dataset(&[
            (Smoker::No, 2_000.0),
            (Smoker::Yes, 30_000.0),
            (Smoker::No, 5_000.0),
            (Smoker::Yes, 25_000.0),
        ]);
        let result = evaluate(&ds, &SmokerOracle).unwrap();
        assert!((result.accuracy - 1.0).abs() < 1e-12);
        assert!((result.roc_auc - 1.0).abs() < 1e-12);
        assert_eq!(result.n_examples, 4);
        assert_eq!(result.n_positive, 2);
    }

    #[test]
    fn roc_points_are_monotone_from_origin_to_one_one() {
        let ds = dataset(&[
            (Smoker::No, 2_000.0),
            (Smoker::Yes, 30_000.0),
            (Smoker::Yes, 12_000.0),
            (Smoker::No, 9_000.0),
            (Smoker::Yes, 11_000.0),
        ]);
        let result = evaluate(&ds, &SmokerOracle).unwrap();

        assert_eq!(result.roc_points.first(), Some(&[0.0, 0.0]));
        assert_eq!(result.roc_points.last(), Some(&[1.0, 1.0]));
        for pair in result.roc_points.windows(2) {
            assert!(pair[1][0] >= pair[0][0]);
            assert!(pair[1][1] >= pair[0][1]);
        }
    }

    #[test]
    fn single_class_subset_is_insufficient() {
        let ds = dataset(&[(Smoker::No, 2_000.0), (Smoker::No, 3_000.0)]);
        let err = evaluate(&ds, &ConstantModel { proba: 0.5 }).unwrap_err();
        assert_eq!(err, EvalError::SingleClass { n: 2, label: 0 });
    }

    #[test]
    fn empty_subset_is_insufficient() {
        let ds = Dataset::from_records(Vec::new(), SchemaVariant::Encoded);
        assert_eq!(
            evaluate(&ds, &ConstantModel { proba: 0.5 }).unwrap_err(),
            EvalError::Empty
        );
    }

    #[test]
    fn feature_order_mismatch_is_rejected() {
        struct NamedStub;
        impl BinaryClassifier for NamedStub {
            fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<f64> {
                vec![0.5; x.len()]
            }
            fn feature_names(&self) -> Option<&[String]> {
                static NAMES: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
                Some(NAMES.get_or_init(|| vec!["bmi".into(), "age".into()]))
            }
        }

        let ds = dataset(&[(Smoker::No, 2_000.0), (Smoker::Yes, 30_000.0)]);
        let err = evaluate(&ds, &NamedStub).unwrap_err();
        assert!(matches!(err, EvalError::FeatureMismatch { .. }));
    }
}
