//! Logistic regression backend; coefficients live in the manifest.

use super::Classifier;
use crate::error::{ConfigurationError, FeatureShapeError, InferenceError};

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ConfigurationError> {
        if coefficients.is_empty() {
            return Err(ConfigurationError::Backend(
                "logistic model has no coefficients".to_string(),
            ));
        }
        if let Some(i) = coefficients.iter().position(|w| !w.is_finite()) {
            return Err(ConfigurationError::Backend(format!(
                "logistic coefficient {} is not finite",
                i
            )));
        }
        if !intercept.is_finite() {
            return Err(ConfigurationError::Backend(
                "logistic intercept is not finite".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticClassifier {
    fn predict_probability(&self, features: &[f32]) -> Result<f64, InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(FeatureShapeError::Length {
                expected: self.coefficients.len(),
                actual: features.len(),
            }
            .into());
        }
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * f64::from(*x))
                .sum::<f64>();
        Ok(sigmoid(z))
    }

    fn backend(&self) -> &'static str {
        "logistic"
    }
}
