//! Outer training loop and match statistics.

pub mod metrics;
pub mod run;

pub use metrics::{MatchResult, TrainingMetrics};
