use std::io;

use thiserror::Error;

/// Result type used across the valuation core crate.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Canonical error representation shared by the workspace crates.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid rule definition: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for ValuationError {
    fn from(err: serde_json::Error) -> Self {
        ValuationError::Deserialization(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for environment variable {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

impl From<ConfigError> for ValuationError {
    fn from(value: ConfigError) -> Self {
        ValuationError::Config(value.to_string())
    }
}
