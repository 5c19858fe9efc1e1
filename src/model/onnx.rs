//! ONNX Runtime backend. Input: [1, n_features] f32. Output: class
//! probabilities, either [1, 2] (positive class in column 1) or [1, 1].
//! Classifiers exported from scikit-learn need `zipmap=False` so the
//! probabilities come back as a plain tensor.

use super::Classifier;
use crate::error::{ConfigurationError, InferenceError};
use ndarray::{Array2, CowArray};
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn init_env() -> Result<&'static Arc<Environment>, ConfigurationError> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env);
    }
    let env = Environment::builder()
        .with_name("churn-scorer")
        .build()
        .map_err(|e| ConfigurationError::Backend(format!("ONNX Runtime environment: {}", e)))?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env))
}

pub struct OnnxClassifier {
    session: Session,
    output_index: usize,
    path: PathBuf,
}

impl OnnxClassifier {
    /// Open a session on the model file. The session is released on drop.
    pub fn load(path: &Path, intra_threads: i16) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            return Err(ConfigurationError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let env = init_env()?;
        let session = SessionBuilder::new(env)
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(intra_threads))
            .and_then(|b| b.with_model_from_file(path))
            .map_err(|e| {
                ConfigurationError::Backend(format!("failed to load {}: {}", path.display(), e))
            })?;

        if session.inputs.len() != 1 {
            return Err(ConfigurationError::Backend(format!(
                "{} has {} inputs, expected a single feature tensor",
                path.display(),
                session.inputs.len()
            )));
        }
        let output_index = session
            .outputs
            .iter()
            .position(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.len().checked_sub(1))
            .ok_or_else(|| {
                ConfigurationError::Backend(format!("{} declares no outputs", path.display()))
            })?;

        tracing::info!(
            path = %path.display(),
            input = %session.inputs[0].name,
            output = %session.outputs[output_index].name,
            intra_threads,
            "ONNX session opened"
        );

        Ok(Self {
            session,
            output_index,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn backend_err(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Backend(e.to_string())
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, features: &[f32]) -> Result<f64, InferenceError> {
        let arr = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(backend_err)?;
        let input = CowArray::from(arr.into_dyn());
        let value = Value::from_array(self.session.allocator(), &input).map_err(backend_err)?;
        let outputs = self.session.run(vec![value]).map_err(backend_err)?;
        let out = outputs
            .get(self.output_index)
            .ok_or_else(|| backend_err("probability output missing"))?;
        let tensor = out.try_extract::<f32>().map_err(backend_err)?;
        let view = tensor.view();
        let probs: Vec<f32> = view.iter().copied().collect();
        let p = match probs.as_slice() {
            [_, positive] => *positive,
            [single] => *single,
            other => {
                return Err(backend_err(format!(
                    "expected 1 or 2 probabilities, got {}",
                    other.len()
                )))
            }
        };
        Ok(f64::from(p))
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}

impl Drop for OnnxClassifier {
    fn drop(&mut self) {
        tracing::info!(path = %self.path.display(), "ONNX session released");
    }
}
