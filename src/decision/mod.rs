//! Thresholded churn decision.

mod policy;

pub use policy::{ClassBalanceContext, ConfidenceBand, DecisionPolicy, PredictionResult, Threshold};
