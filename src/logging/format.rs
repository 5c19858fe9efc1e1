//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::decision::{ConfidenceBand, PredictionResult};
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Audit record for one scored customer.
#[derive(Debug, Serialize)]
pub struct PredictionLog<'a> {
    pub ts: String,
    pub model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<&'a str>,
    pub probability: f64,
    pub label: u8,
    pub threshold: f64,
    pub band: ConfidenceBand,
}

impl<'a> PredictionLog<'a> {
    pub fn new(model_id: &'a str, result: &'a PredictionResult) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            model_id,
            customer_id: result.customer_id.as_deref(),
            probability: result.probability,
            label: result.label,
            threshold: result.decision_threshold,
            band: result.band,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr (stdout carries responses).
    /// RUST_LOG overrides `default_level`.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let json_layer = json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr)
        });
        let plain_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(plain_layer)
            .init();
    }

    /// Emit a single structured line without going through tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ClassBalanceContext;

    #[test]
    fn prediction_log_is_one_json_line() {
        let result = PredictionResult {
            probability: 0.7,
            label: 1,
            decision_threshold: 0.5,
            band: ConfidenceBand::Medium,
            class_balance_context: ClassBalanceContext {
                population_churn_rate: 0.2037,
                relative_risk: 0.7 / 0.2037,
            },
            customer_id: Some("15634602".to_string()),
        };
        let mut out = Vec::new();
        StructuredLogger::emit_json(&PredictionLog::new("lr-v1", &result), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(v["model_id"], "lr-v1");
        assert_eq!(v["customer_id"], "15634602");
        assert_eq!(v["band"], "medium");
    }
}
