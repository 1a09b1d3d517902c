//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised while building or configuring a simulation.
///
/// Nothing in the tick loop itself returns an error: placement exhaustion and
/// empty candidate sets have documented fallbacks.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown video category `{0}`")]
    UnknownCategory(String),

    #[error("unknown duration class `{0}`")]
    UnknownDuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
