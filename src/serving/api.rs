//! Request/response envelope for the serving boundary.

use super::scorer::{BatchOutcome, ChurnScorer};
use crate::decision::PredictionResult;
use crate::error::{ScoringError, ValidationError};
use crate::schema::RawRecord;
use serde::Serialize;
use serde_json::Value;

/// Single inference request: the customer fields plus optional `threshold`
/// and `request_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    pub record: RawRecord,
    pub threshold: Option<f64>,
    pub request_id: Option<String>,
}

impl ScoreRequest {
    pub fn from_value(mut value: Value) -> Result<Self, ValidationError> {
        let obj = value.as_object_mut().ok_or(ValidationError::NotAnObject)?;
        let threshold = match obj.remove("threshold") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(ValidationError::InvalidThreshold {
                    value: other.to_string(),
                })
            }
        };
        let request_id = match obj.remove("request_id") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Ok(Self {
            record: RawRecord(value),
            threshold,
            request_id,
        })
    }

    pub fn parse(line: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| ValidationError::MalformedRequest(e.to_string()))?;
        Self::from_value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub result: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ScoreResponse {
    pub fn ok(result: PredictionResult) -> Self {
        Self {
            status: 200,
            request_id: None,
            result: Some(result),
            error: None,
        }
    }

    pub fn from_error(err: &ScoringError) -> Self {
        Self {
            status: err.status_code(),
            request_id: None,
            result: None,
            error: Some(ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
                field: err.field(),
            }),
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn from_outcome(outcome: BatchOutcome) -> Self {
        match outcome {
            Ok(result) => Self::ok(result),
            Err(e) => Self::from_error(&ScoringError::Validation(e)),
        }
    }
}

/// Handle one request end to end. Never fails; failures become error
/// responses carrying their status.
pub fn respond(scorer: &ChurnScorer, request: ScoreRequest) -> ScoreResponse {
    let response = match scorer.score(&request.record, request.threshold) {
        Ok(result) => ScoreResponse::ok(result),
        Err(e) => ScoreResponse::from_error(&e),
    };
    response.with_request_id(request.request_id)
}

/// Handle one NDJSON request line.
pub fn respond_line(scorer: &ChurnScorer, line: &str) -> ScoreResponse {
    match ScoreRequest::parse(line) {
        Ok(request) => respond(scorer, request),
        Err(e) => ScoreResponse::from_error(&ScoringError::Validation(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_splits_threshold_and_id_from_record() {
        let req = ScoreRequest::from_value(json!({
            "age": 40, "threshold": 0.3, "request_id": "r-1"
        }))
        .unwrap();
        assert_eq!(req.threshold, Some(0.3));
        assert_eq!(req.request_id.as_deref(), Some("r-1"));
        assert_eq!(req.record, RawRecord(json!({ "age": 40 })));
    }

    #[test]
    fn non_numeric_threshold_is_rejected() {
        assert!(matches!(
            ScoreRequest::from_value(json!({ "threshold": "high" })),
            Err(ValidationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn malformed_line_is_a_bad_request() {
        assert!(matches!(
            ScoreRequest::parse("{ nope"),
            Err(ValidationError::MalformedRequest(_))
        ));
        assert_eq!(ScoreRequest::parse("[1]"), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn error_response_shape() {
        let err = ScoringError::Validation(ValidationError::MissingField { field: "age" });
        let v = serde_json::to_value(ScoreResponse::from_error(&err)).unwrap();
        assert_eq!(v["status"], 400);
        assert_eq!(v["error"]["kind"], "missing_field");
        assert_eq!(v["error"]["field"], "age");
        assert!(v.get("probability").is_none());
    }
}
