use linfa::prelude::*;
use linfa_logistic::{
    FittedLogisticRegression, LogisticRegression, MultiFittedLogisticRegression,
    MultiLogisticRegression,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use predict_helpers::DataPoint;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur when fitting or querying the logistic classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogisticError {
    /// Cannot fit on an empty training set
    #[error("Found array with 0 sample(s) while a minimum of 1 is required")]
    EmptyTrainingSet,
    /// Points (or a query) carry a different number of features
    #[error("X has {found} features, but the classifier is expecting {expected} features as input")]
    MismatchedDimensions { expected: usize, found: usize },
    /// All training labels are the same
    #[error(
        "This solver needs samples of at least 2 classes in the data, but the data contains only one class: {0}"
    )]
    SingleClass(String),
    /// The underlying solver rejected the problem
    #[error("{0}")]
    Fit(String),
}

/// Hyper-parameters handed to the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// L2 penalty strength on the weights.
    pub alpha: f64,
    pub max_iterations: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 100,
        }
    }
}

enum FittedModel {
    Binary(FittedLogisticRegression<f64, String>),
    Multi(MultiFittedLogisticRegression<f64, String>),
}

/// A logistic regression classifier over string labels.
///
/// Two classes are fitted with the binary solver, three or more with the
/// multinomial one. Callers only ever see labels, never the encoded targets.
pub struct LogisticClassifier {
    model: FittedModel,
    classes: Vec<String>,
    n_features: usize,
}

impl LogisticClassifier {
    /// Fits a classifier on `data`.
    ///
    /// # Errors
    ///
    /// Returns `LogisticError::EmptyTrainingSet` if `data` is empty.
    /// Returns `LogisticError::MismatchedDimensions` if points differ in length.
    /// Returns `LogisticError::SingleClass` if every label is identical.
    /// Returns `LogisticError::Fit` if the solver fails.
    pub fn fit(params: &LogisticParams, data: &[DataPoint<String>]) -> Result<Self, LogisticError> {
        let first = data.first().ok_or(LogisticError::EmptyTrainingSet)?;
        let n_features = first.dim();
        if let Some(bad) = data.iter().find(|dp| dp.dim() != n_features) {
            return Err(LogisticError::MismatchedDimensions {
                expected: n_features,
                found: bad.dim(),
            });
        }

        let classes: Vec<String> = data
            .iter()
            .map(|dp| dp.label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(LogisticError::SingleClass(first.label.clone()));
        }

        let records = Array2::from_shape_fn((data.len(), n_features), |(row, col)| {
            data[row].features[col]
        });
        let targets: Array1<String> = data.iter().map(|dp| dp.label.clone()).collect();
        let dataset = Dataset::new(records, targets);

        let model = if classes.len() == 2 {
            let fitted: FittedLogisticRegression<f64, String> = LogisticRegression::default()
                .alpha(params.alpha)
                .max_iterations(params.max_iterations)
                .fit(&dataset)
                .map_err(|e| LogisticError::Fit(e.to_string()))?;
            FittedModel::Binary(fitted)
        } else {
            let fitted: MultiFittedLogisticRegression<f64, String> =
                MultiLogisticRegression::default()
                    .alpha(params.alpha)
                    .max_iterations(params.max_iterations)
                    .fit(&dataset)
                    .map_err(|e| LogisticError::Fit(e.to_string()))?;
            FittedModel::Multi(fitted)
        };

        tracing::debug!(
            samples = data.len(),
            classes = classes.len(),
            "fitted logistic regression"
        );

        Ok(Self {
            model,
            classes,
            n_features,
        })
    }

    /// The distinct labels seen during fitting, sorted.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn as_record(&self, features: ArrayView1<f64>) -> Result<Array2<f64>, LogisticError> {
        if features.len() != self.n_features {
            return Err(LogisticError::MismatchedDimensions {
                expected: self.n_features,
                found: features.len(),
            });
        }
        Ok(features.to_owned().insert_axis(Axis(0)))
    }

    /// Predicts the label for a single point.
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<String, LogisticError> {
        let record = self.as_record(features)?;
        let predicted = match &self.model {
            FittedModel::Binary(model) => model.predict(&record),
            FittedModel::Multi(model) => model.predict(&record),
        };
        predicted
            .into_iter()
            .next()
            .ok_or_else(|| LogisticError::Fit("solver returned no prediction".to_string()))
    }

    /// Per-class probabilities for a single point, in `classes()` order.
    pub fn probabilities(&self, features: ArrayView1<f64>) -> Result<Vec<(String, f64)>, LogisticError> {
        let record = self.as_record(features)?;
        match &self.model {
            FittedModel::Binary(model) => {
                // The binary solver reports P(positive); the predicted label is
                // the positive one exactly when that probability reaches 0.5.
                let p_pos = model.predict_probabilities(&record)[0];
                let predicted = self.predict(features)?;
                let p_predicted = if p_pos >= 0.5 { p_pos } else { 1.0 - p_pos };
                Ok(self
                    .classes
                    .iter()
                    .map(|c| {
                        let p = if *c == predicted { p_predicted } else { 1.0 - p_predicted };
                        (c.clone(), p)
                    })
                    .collect())
            }
            FittedModel::Multi(model) => {
                let probs = model.predict_probabilities(&record);
                Ok(self
                    .classes
                    .iter()
                    .cloned()
                    .zip(probs.row(0).iter().copied())
                    .collect())
            }
        }
    }
}
