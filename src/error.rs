//! Error taxonomy. Validation errors are the caller's fault (400), shape and
//! inference errors are internal defects (500), configuration errors stop the
//! service before it accepts traffic.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Inclusive range a numeric field must fall in. An infinite `max` leaves the
/// range open above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedRange {
    pub min: f64,
    pub max: f64,
    /// Field only takes whole numbers.
    pub integer: bool,
}

impl fmt::Display for ExpectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max.is_infinite() {
            write!(f, "[{}, ∞)", self.min)?;
        } else {
            write!(f, "[{}, {}]", self.min, self.max)?;
        }
        if self.integer {
            write!(f, " (integer)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown category {value:?} for {field}; allowed: {}", .allowed.join(", "))]
pub struct UnknownCategoryError {
    pub field: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field {field}")]
    MissingField { field: &'static str },

    #[error("{field} = {value} is outside {expected_range}")]
    Range {
        field: &'static str,
        value: String,
        expected_range: ExpectedRange,
    },

    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategoryError),

    #[error("customer record must be a JSON object")]
    NotAnObject,

    #[error("decision threshold {value} must be a number within [0, 1]")]
    InvalidThreshold { value: String },

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl ValidationError {
    /// Field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField { field } | ValidationError::Range { field, .. } => {
                Some(*field)
            }
            ValidationError::UnknownCategory(e) => Some(e.field),
            ValidationError::InvalidThreshold { .. } => Some("threshold"),
            ValidationError::NotAnObject | ValidationError::MalformedRequest(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("model artifact not found at {}", .path.display())]
    MissingArtifact { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("encoder version mismatch: serving {expected}, artifact trained with {found}")]
    EncoderVersionMismatch { expected: &'static str, found: String },

    #[error("feature layout has {expected} positions, artifact manifest lists {found}")]
    LayoutLength { expected: usize, found: usize },

    #[error("feature layout mismatch at position {position}: serving {expected:?}, artifact {found:?}")]
    LayoutMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("invalid numeric scaling for {feature}: {reason}")]
    InvalidScaling { feature: String, reason: String },

    #[error("checksum mismatch for {}: manifest {expected}, file {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("classifier backend failed to load: {0}")]
    Backend(String),

    #[error("configured decision threshold {0} must be within [0, 1]")]
    InvalidThreshold(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Vector handed to the classifier does not match the layout. Always a
/// deriver or encoder defect, never bad user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureShapeError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    Length { expected: usize, actual: usize },

    #[error("feature vector value at position {position} is not finite")]
    NonFinite { position: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Shape(#[from] FeatureShapeError),

    #[error("classifier failed: {0}")]
    Backend(String),

    #[error("classifier returned {0}, expected a probability in [0, 1]")]
    InvalidProbability(f64),
}

/// Anything that can go wrong scoring one record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl From<UnknownCategoryError> for ScoringError {
    fn from(e: UnknownCategoryError) -> Self {
        ScoringError::Validation(ValidationError::UnknownCategory(e))
    }
}

impl From<FeatureShapeError> for ScoringError {
    fn from(e: FeatureShapeError) -> Self {
        ScoringError::Inference(InferenceError::Shape(e))
    }
}

impl ScoringError {
    /// HTTP-style status category for the serving boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ScoringError::Validation(_) => 400,
            ScoringError::Inference(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Validation(v) => match v {
                ValidationError::MissingField { .. } => "missing_field",
                ValidationError::Range { .. } => "range",
                ValidationError::UnknownCategory(_) => "unknown_category",
                ValidationError::NotAnObject => "not_an_object",
                ValidationError::InvalidThreshold { .. } => "invalid_threshold",
                ValidationError::MalformedRequest(_) => "malformed_request",
            },
            ScoringError::Inference(i) => match i {
                InferenceError::Shape(_) => "feature_shape",
                InferenceError::Backend(_) => "backend",
                InferenceError::InvalidProbability(_) => "invalid_probability",
            },
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ScoringError::Validation(v) => v.field(),
            ScoringError::Inference(_) => None,
        }
    }
}
