//! Probability → label, confidence band and class-balance context.

use crate::config::{BandConfig, DecisionConfig};
use crate::error::{ConfigurationError, ValidationError};
use serde::{Deserialize, Serialize};

/// Decision threshold known to be finite and within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Threshold(value))
        } else {
            Err(ValidationError::InvalidThreshold {
                value: value.to_string(),
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    /// Band from the distance between probability and threshold.
    pub fn from_margin(margin: f64, config: &BandConfig) -> Self {
        if margin >= config.high_margin {
            ConfidenceBand::High
        } else if margin >= config.medium_margin {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Population context for reading a probability. Never feeds back into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassBalanceContext {
    pub population_churn_rate: f64,
    /// `probability / population_churn_rate`.
    pub relative_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    /// 1 = churn, 0 = retained.
    pub label: u8,
    #[serde(rename = "threshold")]
    pub decision_threshold: f64,
    pub band: ConfidenceBand,
    pub class_balance_context: ClassBalanceContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

impl PredictionResult {
    pub fn with_customer_id(mut self, customer_id: Option<String>) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn is_churn(&self) -> bool {
        self.label == 1
    }
}

#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    default_threshold: Threshold,
    population_churn_rate: f64,
    band: BandConfig,
}

impl DecisionPolicy {
    pub fn new(default_threshold: Threshold, population_churn_rate: f64, band: BandConfig) -> Self {
        Self {
            default_threshold,
            population_churn_rate,
            band,
        }
    }

    /// Policy from configuration, with the churn rate optionally taken from
    /// the trained artifact.
    pub fn from_config(
        config: &DecisionConfig,
        artifact_rate: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        let threshold = Threshold::new(config.threshold)
            .map_err(|_| ConfigurationError::InvalidThreshold(config.threshold))?;
        Ok(Self::new(
            threshold,
            artifact_rate.unwrap_or(config.population_churn_rate),
            config.band.clone(),
        ))
    }

    pub fn default_threshold(&self) -> Threshold {
        self.default_threshold
    }

    pub fn population_churn_rate(&self) -> f64 {
        self.population_churn_rate
    }

    /// Caller-supplied threshold, or the configured default.
    pub fn resolve(&self, requested: Option<f64>) -> Result<Threshold, ValidationError> {
        requested.map_or(Ok(self.default_threshold), Threshold::new)
    }

    pub fn decide(&self, probability: f64, threshold: Threshold) -> PredictionResult {
        let t = threshold.value();
        let label = u8::from(probability >= t);
        PredictionResult {
            probability,
            label,
            decision_threshold: t,
            band: ConfidenceBand::from_margin((probability - t).abs(), &self.band),
            class_balance_context: ClassBalanceContext {
                population_churn_rate: self.population_churn_rate,
                relative_risk: probability / self.population_churn_rate,
            },
            customer_id: None,
        }
    }
}
