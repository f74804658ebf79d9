use std::path::PathBuf;

use crate::ai::frame::NUM_ACTIONS;

/// Errors surfaced by the function approximator behind the [`crate::ai::Approximator`] seam.
#[derive(Debug, thiserror::Error)]
pub enum ApproximatorError {
    #[error("tensor shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("failed to read weights from {path}: {source}")]
    WeightsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write weights to {path}: {source}")]
    WeightsWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("weights serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised by the training core. All of these indicate numeric
/// divergence or approximator corruption and abort the run; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("invalid reward {0} in pending experience (must be finite, in [-1, 1])")]
    InvalidReward(f32),

    #[error("action {0} out of range (num actions: {NUM_ACTIONS})")]
    InvalidAction(usize),

    #[error("approximator returned non-finite q-value {value} for action {action}")]
    NonFiniteQ { action: usize, value: f32 },

    #[error("non-finite training target {0}")]
    NonFiniteTarget(f32),

    #[error("approximator failure: {0}")]
    Approximator(#[from] ApproximatorError),
}

/// Errors raised by the simulation layer.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("no vacant spawn point for team {team} after {trials} trials")]
    NoVacantSpawn { team: usize, trials: usize },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Top-level error for a training run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Approximator(#[from] ApproximatorError),
}
