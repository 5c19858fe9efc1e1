//! `manifest.json`: what the classifier was trained against.
//!
//! ```json
//! {
//!   "model_id": "churn-logreg-2024-06",
//!   "encoder_version": "onehot-v1",
//!   "feature_names": ["credit_score", "age", "..."],
//!   "numeric_scaling": [{ "mean": 650.5, "scale": 96.6 }, "..."],
//!   "positive_class_rate": 0.2037,
//!   "classifier": { "kind": "onnx", "path": "model.onnx", "sha256": "..." }
//! }
//! ```

use crate::error::ConfigurationError;
use crate::features::{FeatureLayout, Standardization};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub model_id: String,
    pub encoder_version: String,
    /// Ordered column names the classifier was fitted on.
    pub feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_scaling: Option<Vec<Standardization>>,
    /// Share of churners in the training population.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_class_rate: Option<f64>,
    pub classifier: ClassifierSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Onnx {
        /// Relative to the artifact directory.
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
        #[serde(default = "default_intra_threads")]
        intra_threads: i16,
    },
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

fn default_intra_threads() -> i16 {
    1
}

impl ModelManifest {
    pub fn read(dir: &Path) -> Result<Self, ConfigurationError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(ConfigurationError::MissingArtifact { path });
        }
        let data = std::fs::read_to_string(&path).map_err(|source| ConfigurationError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigurationError::Parse { path, source })
    }

    /// Encoder version, feature order and class rate must agree with this
    /// build before the artifact may serve traffic.
    pub fn check_compatibility(&self, layout: &FeatureLayout) -> Result<(), ConfigurationError> {
        if self.encoder_version != layout.version() {
            return Err(ConfigurationError::EncoderVersionMismatch {
                expected: layout.version(),
                found: self.encoder_version.clone(),
            });
        }
        layout.verify(&self.feature_names)?;
        if let Some(rate) = self.positive_class_rate {
            if !(rate > 0.0 && rate < 1.0) {
                return Err(ConfigurationError::InvalidConfig(format!(
                    "positive_class_rate {} must be within (0, 1)",
                    rate
                )));
            }
        }
        if let ClassifierSpec::Logistic { coefficients, .. } = &self.classifier {
            if coefficients.len() != layout.len() {
                return Err(ConfigurationError::LayoutLength {
                    expected: layout.len(),
                    found: coefficients.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_json() -> serde_json::Value {
        json!({
            "model_id": "test",
            "encoder_version": "onehot-v1",
            "feature_names": FeatureLayout::current().names(),
            "classifier": { "kind": "logistic", "coefficients": vec![0.0; 17], "intercept": 0.0 }
        })
    }

    #[test]
    fn parses_and_checks_logistic_manifest() {
        let m: ModelManifest = serde_json::from_value(manifest_json()).unwrap();
        assert!(m.numeric_scaling.is_none());
        m.check_compatibility(&FeatureLayout::current()).unwrap();
    }

    #[test]
    fn onnx_spec_defaults_threads() {
        let spec: ClassifierSpec =
            serde_json::from_value(json!({ "kind": "onnx", "path": "model.onnx" })).unwrap();
        assert_eq!(
            spec,
            ClassifierSpec::Onnx {
                path: PathBuf::from("model.onnx"),
                sha256: None,
                intra_threads: 1
            }
        );
    }

    #[test]
    fn encoder_version_mismatch_is_fatal() {
        let mut v = manifest_json();
        v["encoder_version"] = json!("ordinal-v1");
        let m: ModelManifest = serde_json::from_value(v).unwrap();
        assert!(matches!(
            m.check_compatibility(&FeatureLayout::current()),
            Err(ConfigurationError::EncoderVersionMismatch { .. })
        ));
    }

    #[test]
    fn coefficient_count_must_match_layout() {
        let mut v = manifest_json();
        v["classifier"]["coefficients"] = json!(vec![0.0; 16]);
        let m: ModelManifest = serde_json::from_value(v).unwrap();
        assert!(matches!(
            m.check_compatibility(&FeatureLayout::current()),
            Err(ConfigurationError::LayoutLength { expected: 17, found: 16 })
        ));
    }

    #[test]
    fn class_rate_must_be_a_proportion() {
        let mut v = manifest_json();
        v["positive_class_rate"] = json!(20.4);
        let m: ModelManifest = serde_json::from_value(v).unwrap();
        assert!(m.check_compatibility(&FeatureLayout::current()).is_err());
    }

    #[test]
    fn missing_manifest_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelManifest::read(dir.path()),
            Err(ConfigurationError::MissingArtifact { .. })
        ));
    }
}
