//! Core shared library for the valuation workspace.
//!
//! This crate exposes the ambient primitives the engine and its tooling
//! depend on: the canonical error type, configuration loading, logging
//! setup and JSON helpers.

pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use config::ValuationConfig;
pub use errors::{ConfigError, Result as CoreResult, ValuationError};
pub use logging::init_tracing;
