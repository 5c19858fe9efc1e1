//! Churn Scorer: bank customer churn prediction from a trained classifier.
//!
//! Modular structure:
//! - [`schema`]: Raw record validation into a typed record
//! - [`features`]: Derived features, versioned one-hot encoding, vector layout
//! - [`model`]: Artifact manifest, classifier backends, inference service
//! - [`decision`]: Thresholded decision and confidence band
//! - [`serving`]: End-to-end scoring, batch scoring, request/response envelope
//! - [`logging`]: Structured JSON logging

pub mod config;
pub mod decision;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod schema;
pub mod serving;

pub use config::ServiceConfig;
pub use decision::{DecisionPolicy, PredictionResult, Threshold};
pub use error::{ConfigurationError, ScoringError, ValidationError};
pub use features::{EncodedFeatureVector, FeatureDeriver, FeatureLayout};
pub use logging::StructuredLogger;
pub use model::{Classifier, InferenceService, ModelArtifact};
pub use schema::{validate, RawRecord, ValidatedRecord};
pub use serving::{ChurnScorer, ScoreRequest, ScoreResponse};
