//! Probabilistic classifier trait and fitted implementations

use crate::sparse::SparseMatrix;
use cherry_core::{Error, Probabilities, Result};
use serde::{Deserialize, Serialize};

/// Trait for all probabilistic classifiers
pub trait ProbabilisticClassifier: Send + Sync {
    /// Per-class probabilities, one row per matrix row
    fn predict_proba(&self, features: &SparseMatrix) -> Result<Probabilities>;

    /// Class labels, aligned to probability columns
    fn classes(&self) -> &[String];

    /// Number of input features expected
    fn n_features(&self) -> usize;

    /// Most probable class label per matrix row
    fn predict(&self, features: &SparseMatrix) -> Result<Vec<String>> {
        let probabilities = self.predict_proba(features)?;
        (0..probabilities.n_rows())
            .map(|row| {
                probabilities
                    .argmax(row)
                    .and_then(|i| self.classes().get(i).cloned())
                    .ok_or_else(|| Error::classifier(format!("no class for row {}", row)))
            })
            .collect()
    }
}

/// Reject malformed parameters and mismatched input before any arithmetic
fn check_input(
    validation: Result<()>,
    features: &SparseMatrix,
    expected: usize,
) -> Result<()> {
    validation.map_err(|e| Error::classifier(e.to_string()))?;
    if features.n_cols() != expected {
        return Err(Error::classifier(format!(
            "expected {} features, got {}",
            expected,
            features.n_cols()
        )));
    }
    Ok(())
}

fn row_dot(features: &SparseMatrix, row: usize, weights: &[f64]) -> Result<f64> {
    features
        .row_dot(row, weights)
        .ok_or_else(|| Error::classifier("weight vector narrower than feature matrix"))
}

/// Normalize log-scores into probabilities (log-sum-exp)
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Fitted multinomial naive Bayes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Class labels
    pub classes: Vec<String>,

    /// Log prior per class
    pub class_log_prior: Vec<f64>,

    /// Log P(feature | class), `classes x features`
    pub feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Check that all shapes agree
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(Error::artifact("naive Bayes needs at least two classes"));
        }
        if self.class_log_prior.len() != n_classes || self.feature_log_prob.len() != n_classes {
            return Err(Error::artifact(format!(
                "naive Bayes has {} classes but {} priors and {} likelihood rows",
                n_classes,
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        let width = self.n_features();
        if width == 0 || self.feature_log_prob.iter().any(|row| row.len() != width) {
            return Err(Error::artifact("naive Bayes likelihood rows are ragged or empty"));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, features: &SparseMatrix, row: usize) -> Result<Vec<f64>> {
        self.feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(log_prob, prior)| Ok(row_dot(features, row, log_prob)? + prior))
            .collect()
    }
}

impl ProbabilisticClassifier for MultinomialNb {
    fn predict_proba(&self, features: &SparseMatrix) -> Result<Probabilities> {
        check_input(self.validate(), features, self.n_features())?;
        let rows = (0..features.n_rows())
            .map(|row| Ok(softmax(&self.joint_log_likelihood(features, row)?)))
            .collect::<Result<_>>()?;
        Ok(Probabilities::new(rows))
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }
}

/// Fitted logistic regression (binary or multinomial)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Class labels
    pub classes: Vec<String>,

    /// Coefficients: one row for binary problems, one row per class otherwise
    pub coef: Vec<Vec<f64>>,

    /// Intercepts, aligned to `coef` rows
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coef.len() == 1
    }

    /// Check that all shapes agree
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(Error::artifact("logistic regression needs at least two classes"));
        }
        if !self.is_binary() && self.coef.len() != n_classes {
            return Err(Error::artifact(format!(
                "logistic regression has {} classes but {} coefficient rows",
                n_classes,
                self.coef.len()
            )));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(Error::artifact("intercept length does not match coefficient rows"));
        }
        let width = self.n_features();
        if width == 0 || self.coef.iter().any(|row| row.len() != width) {
            return Err(Error::artifact("coefficient rows are ragged or empty"));
        }
        Ok(())
    }

    fn decision(&self, features: &SparseMatrix, row: usize) -> Result<Vec<f64>> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| Ok(row_dot(features, row, weights)? + bias))
            .collect()
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn predict_proba(&self, features: &SparseMatrix) -> Result<Probabilities> {
        check_input(self.validate(), features, self.n_features())?;
        let rows = (0..features.n_rows())
            .map(|row| {
                let scores = self.decision(features, row)?;
                match scores.as_slice() {
                    [score] if self.is_binary() => {
                        let p = sigmoid(*score);
                        Ok(vec![1.0 - p, p])
                    }
                    _ => Ok(softmax(&scores)),
                }
            })
            .collect::<Result<_>>()?;
        Ok(Probabilities::new(rows))
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }
}

/// Any supported fitted classifier, as stored in a cache artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    MultinomialNb(MultinomialNb),
    LogisticRegression(LogisticRegression),
}

impl ClassifierArtifact {
    /// Check that all shapes agree
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::MultinomialNb(nb) => nb.validate(),
            Self::LogisticRegression(lr) => lr.validate(),
        }
    }

    /// Short name of the model family
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MultinomialNb(_) => "multinomial_nb",
            Self::LogisticRegression(_) => "logistic_regression",
        }
    }

    fn inner(&self) -> &dyn ProbabilisticClassifier {
        match self {
            Self::MultinomialNb(nb) => nb,
            Self::LogisticRegression(lr) => lr,
        }
    }
}

impl ProbabilisticClassifier for ClassifierArtifact {
    fn predict_proba(&self, features: &SparseMatrix) -> Result<Probabilities> {
        self.inner().predict_proba(features)
    }

    fn classes(&self) -> &[String] {
        self.inner().classes()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }
}

impl From<MultinomialNb> for ClassifierArtifact {
    fn from(nb: MultinomialNb) -> Self {
        Self::MultinomialNb(nb)
    }
}

impl From<LogisticRegression> for ClassifierArtifact {
    fn from(lr: LogisticRegression) -> Self {
        Self::LogisticRegression(lr)
    }
}
