//! Trained classifier artifact and the inference service around it.
//!
//! - [`manifest`]: `manifest.json` stored with every artifact
//! - [`artifact`]: loads and checks an artifact directory once at startup
//! - [`onnx`] / [`logistic`]: classifier backends
//! - [`service`]: shape-checked, thread-safe `predict`

pub mod artifact;
pub mod logistic;
pub mod manifest;
pub mod onnx;
pub mod service;

pub use artifact::ModelArtifact;
pub use logistic::LogisticClassifier;
pub use manifest::{ClassifierSpec, ModelManifest, MANIFEST_FILE};
pub use onnx::OnnxClassifier;
pub use service::InferenceService;

use crate::error::InferenceError;

/// Opaque trained model: feature vector in, churn probability out.
///
/// Implementations are read-only after construction and shared across
/// threads behind an `Arc`.
pub trait Classifier: Send + Sync {
    fn predict_probability(&self, features: &[f32]) -> Result<f64, InferenceError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
