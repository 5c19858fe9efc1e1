//! Service configuration. Loaded from a JSON file; every section has defaults.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Artifact directory holding `manifest.json` and the model file
    pub model_dir: PathBuf,
    /// Decision policy
    pub decision: DecisionConfig,
    /// Batch scoring
    pub batch: BatchConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Default probability cutoff when a request does not supply one
    pub threshold: f64,
    /// Churn rate of the training population, used when the artifact does not
    /// record one
    pub population_churn_rate: f64,
    pub band: BandConfig,
}

/// Margins `|probability - threshold|` separating confidence bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub medium_margin: f64,
    pub high_margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Fan records out over the rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            decision: DecisionConfig::default(),
            batch: BatchConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            population_churn_rate: 0.2037,
            band: BandConfig::default(),
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            medium_margin: 0.1,
            high_margin: 0.25,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file if present; otherwise defaults. A file that
    /// exists but does not parse or validate is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let d = &self.decision;
        if !(d.threshold.is_finite() && (0.0..=1.0).contains(&d.threshold)) {
            return Err(ConfigurationError::InvalidThreshold(d.threshold));
        }
        if !(d.population_churn_rate > 0.0 && d.population_churn_rate < 1.0) {
            return Err(ConfigurationError::InvalidConfig(format!(
                "decision.population_churn_rate {} must be within (0, 1)",
                d.population_churn_rate
            )));
        }
        let b = &d.band;
        if !(b.medium_margin >= 0.0 && b.medium_margin <= b.high_margin && b.high_margin <= 1.0) {
            return Err(ConfigurationError::InvalidConfig(format!(
                "decision.band margins must satisfy 0 <= medium ({}) <= high ({}) <= 1",
                b.medium_margin, b.high_margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let c = ServiceConfig::load(Path::new("nonexistent.json")).unwrap();
        assert_eq!(c.decision.threshold, 0.5);
        assert_eq!(c.model_dir, PathBuf::from("model"));
        assert!(c.batch.parallel);
        assert!(c.log.json);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "decision": { "threshold": 0.35 }, "log": { "json": false } }"#).unwrap();
        let c = ServiceConfig::load(&path).unwrap();
        assert_eq!(c.decision.threshold, 0.35);
        assert_eq!(c.decision.population_churn_rate, 0.2037);
        assert_eq!(c.log.level, "info");
        assert!(!c.log.json);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(ConfigurationError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "decision": { "threshold": 1.5 } }"#).unwrap();
        assert!(matches!(
            ServiceConfig::load(&path),
            Err(ConfigurationError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn inverted_band_margins_are_rejected() {
        let mut c = ServiceConfig::default();
        c.decision.band = BandConfig {
            medium_margin: 0.3,
            high_margin: 0.2,
        };
        assert!(c.validate().is_err());
    }
}
