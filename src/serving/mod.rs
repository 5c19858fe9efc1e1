//! Scoring pipeline and serving boundary.

pub mod api;
pub mod batch;
mod scorer;

pub use api::{respond, respond_line, ErrorBody, ScoreRequest, ScoreResponse};
pub use scorer::{BatchOutcome, ChurnScorer};
