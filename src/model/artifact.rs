//! Artifact directory → checked manifest + shared classifier.

use super::manifest::{ClassifierSpec, ModelManifest};
use super::{Classifier, LogisticClassifier, OnnxClassifier};
use crate::error::ConfigurationError;
use crate::features::FeatureLayout;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loaded once at startup; immutable afterwards.
pub struct ModelArtifact {
    pub manifest: ModelManifest,
    pub classifier: Arc<dyn Classifier>,
}

impl ModelArtifact {
    pub fn load(dir: &Path) -> Result<Self, ConfigurationError> {
        if !dir.is_dir() {
            return Err(ConfigurationError::MissingArtifact {
                path: dir.to_path_buf(),
            });
        }
        let manifest = ModelManifest::read(dir)?;
        manifest.check_compatibility(&FeatureLayout::current())?;

        let classifier: Arc<dyn Classifier> = match &manifest.classifier {
            ClassifierSpec::Onnx {
                path,
                sha256,
                intra_threads,
            } => {
                let model_path = dir.join(path);
                if !model_path.exists() {
                    return Err(ConfigurationError::MissingArtifact { path: model_path });
                }
                if let Some(expected) = sha256 {
                    verify_checksum(&model_path, expected)?;
                }
                Arc::new(OnnxClassifier::load(&model_path, *intra_threads)?)
            }
            ClassifierSpec::Logistic {
                coefficients,
                intercept,
            } => Arc::new(LogisticClassifier::new(coefficients.clone(), *intercept)?),
        };

        info!(
            model_id = %manifest.model_id,
            backend = classifier.backend(),
            encoder_version = %manifest.encoder_version,
            features = manifest.feature_names.len(),
            scaled = manifest.numeric_scaling.is_some(),
            "model artifact loaded"
        );
        Ok(Self {
            manifest,
            classifier,
        })
    }

    /// Pair a manifest with an already constructed classifier. The manifest
    /// goes through the same compatibility checks as [`ModelArtifact::load`].
    pub fn from_parts(
        manifest: ModelManifest,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ConfigurationError> {
        manifest.check_compatibility(&FeatureLayout::current())?;
        Ok(Self {
            manifest,
            classifier,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.manifest.model_id
    }
}

pub fn sha256_file(path: &Path) -> Result<String, ConfigurationError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

fn verify_checksum(path: &Path, expected: &str) -> Result<(), ConfigurationError> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ConfigurationError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_manifest(dir: &Path, value: serde_json::Value) {
        fs::write(dir.join("manifest.json"), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn loads_logistic_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            json!({
                "model_id": "lr-test",
                "encoder_version": "onehot-v1",
                "feature_names": FeatureLayout::current().names(),
                "classifier": { "kind": "logistic", "coefficients": vec![0.0; 17], "intercept": 0.0 }
            }),
        );
        let artifact = ModelArtifact::load(dir.path()).unwrap();
        assert_eq!(artifact.model_id(), "lr-test");
        assert_eq!(artifact.classifier.backend(), "logistic");
        assert_eq!(
            artifact.classifier.predict_probability(&[0.0; 17]).unwrap(),
            0.5
        );
    }

    #[test]
    fn missing_directory_is_fatal() {
        assert!(matches!(
            ModelArtifact::load(Path::new("does/not/exist")),
            Err(ConfigurationError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn missing_onnx_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            json!({
                "model_id": "onnx-test",
                "encoder_version": "onehot-v1",
                "feature_names": FeatureLayout::current().names(),
                "classifier": { "kind": "onnx", "path": "model.onnx" }
            }),
        );
        match ModelArtifact::load(dir.path()) {
            Err(ConfigurationError::MissingArtifact { path }) => {
                assert!(path.ends_with("model.onnx"))
            }
            other => panic!("expected missing artifact, got {:?}", other.err()),
        }
    }

    #[test]
    fn checksum_mismatch_stops_before_session_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"not really onnx").unwrap();
        write_manifest(
            dir.path(),
            json!({
                "model_id": "onnx-test",
                "encoder_version": "onehot-v1",
                "feature_names": FeatureLayout::current().names(),
                "classifier": { "kind": "onnx", "path": "model.onnx", "sha256": "00" }
            }),
        );
        assert!(matches!(
            ModelArtifact::load(dir.path()),
            Err(ConfigurationError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn sha256_of_known_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
