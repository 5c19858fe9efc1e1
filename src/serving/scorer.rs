//! End-to-end scoring: validate → derive → predict → decide.

use crate::config::ServiceConfig;
use crate::decision::{DecisionPolicy, PredictionResult, Threshold};
use crate::error::{ConfigurationError, ScoringError, ValidationError};
use crate::features::{FeatureDeriver, FeatureLayout};
use crate::model::{InferenceService, ModelArtifact};
use crate::schema::{validate, RawRecord};
use rayon::prelude::*;
use tracing::{debug, error, info};

/// One slot of a batch: a result, or the validation error for that record.
pub type BatchOutcome = Result<PredictionResult, ValidationError>;

pub struct ChurnScorer {
    deriver: FeatureDeriver,
    inference: InferenceService,
    policy: DecisionPolicy,
    parallel_batches: bool,
}

impl ChurnScorer {
    pub fn new(artifact: ModelArtifact, config: &ServiceConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let ModelArtifact {
            manifest,
            classifier,
        } = artifact;

        let deriver = match &manifest.numeric_scaling {
            Some(scaling) => FeatureDeriver::with_scaling(scaling)?,
            None => FeatureDeriver::new(),
        };
        let policy = DecisionPolicy::from_config(&config.decision, manifest.positive_class_rate)?;
        let inference = InferenceService::new(classifier, deriver.layout().len(), &manifest.model_id);

        info!(
            model_id = %manifest.model_id,
            backend = inference.backend(),
            default_threshold = policy.default_threshold().value(),
            population_churn_rate = policy.population_churn_rate(),
            "churn scorer ready"
        );

        Ok(Self {
            deriver,
            inference,
            policy,
            parallel_batches: config.batch.parallel,
        })
    }

    /// Load the artifact named by the configuration and build a scorer.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigurationError> {
        let artifact = ModelArtifact::load(&config.model_dir)?;
        Self::new(artifact, config)
    }

    pub fn model_id(&self) -> &str {
        self.inference.model_id()
    }

    pub fn layout(&self) -> &FeatureLayout {
        self.deriver.layout()
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Score one record. `threshold` overrides the configured default.
    pub fn score(
        &self,
        record: &RawRecord,
        threshold: Option<f64>,
    ) -> Result<PredictionResult, ScoringError> {
        let threshold = self.policy.resolve(threshold)?;
        self.score_with(record, threshold)
    }

    fn score_with(
        &self,
        record: &RawRecord,
        threshold: Threshold,
    ) -> Result<PredictionResult, ScoringError> {
        let validated = validate(record)?;
        let vector = self.deriver.derive(&validated)?;
        let probability = self.inference.predict(&vector)?;
        let result = self
            .policy
            .decide(probability, threshold)
            .with_customer_id(validated.customer.customer_id);
        debug!(
            customer_id = result.customer_id.as_deref().unwrap_or("-"),
            probability,
            label = result.label,
            "scored"
        );
        Ok(result)
    }

    /// Score records in order. The output has one slot per input record, in
    /// input order. Validation failures stay in their slot; an internal
    /// failure aborts the batch.
    pub fn score_batch(
        &self,
        records: &[RawRecord],
        threshold: Option<f64>,
    ) -> Result<Vec<BatchOutcome>, ScoringError> {
        let threshold = self.policy.resolve(threshold)?;
        let scored: Vec<Result<PredictionResult, ScoringError>> = if self.parallel_batches {
            records
                .par_iter()
                .map(|r| self.score_with(r, threshold))
                .collect()
        } else {
            records.iter().map(|r| self.score_with(r, threshold)).collect()
        };

        let mut outcomes = Vec::with_capacity(scored.len());
        for (index, outcome) in scored.into_iter().enumerate() {
            match outcome {
                Ok(result) => outcomes.push(Ok(result)),
                Err(ScoringError::Validation(e)) => outcomes.push(Err(e)),
                Err(e) => {
                    error!(index, error = %e, "internal failure, aborting batch");
                    return Err(e);
                }
            }
        }
        info!(
            records = outcomes.len(),
            rejected = outcomes.iter().filter(|o| o.is_err()).count(),
            "batch scored"
        );
        Ok(outcomes)
    }
}
