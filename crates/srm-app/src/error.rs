//! Error types for the srm-app scenario layer.

use srm_core::CoreError;
use srm_model::ModelError;
use srm_solver::SolverError;
use std::path::PathBuf;

/// Errors surfaced to scenario callers.
///
/// Model and solver failures pass through unchanged; only file handling and
/// post-solve validation add variants of their own.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("Invalid value for '{name}': {source}")]
    Value { name: String, source: CoreError },

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scenario validation failed: {0}")]
    Validation(String),
}

pub type AppResult<T> = Result<T, AppError>;
