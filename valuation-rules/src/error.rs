use std::path::PathBuf;

use thiserror::Error;
use valuation_core::ValuationError;

/// Errors raised while loading or validating rule definitions.
///
/// Evaluation itself never fails; these are authoring and loading errors
/// surfaced before any listing is priced.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rules path does not exist: {0}")]
    MissingPath(String),
    #[error("failed to read rules from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rules from {path}: {message}")]
    Parse { path: String, message: String },
    #[error("duplicate ruleset identifier detected: {id}")]
    DuplicateRuleset { id: String },
    #[error("duplicate rule identifier {rule_id} in ruleset {ruleset_id}")]
    DuplicateRule { ruleset_id: String, rule_id: String },
    #[error("{kind} identifier must not be empty")]
    EmptyId { kind: &'static str },
    #[error("per-unit action requires a unit field")]
    MissingUnitField,
    #[error("multiplier factor must not be negative, got {0}")]
    NegativeMultiplier(String),
    #[error("rule {rule_id} has no actions")]
    EmptyActions { rule_id: String },
    #[error("condition group has no children")]
    EmptyGroup,
    #[error("condition field name must not be empty")]
    EmptyFieldName,
    #[error("condition tree exceeds maximum depth of {max}")]
    ConditionTooDeep { max: usize },
    #[error("baseline ruleset {ruleset_id} has priority {priority}, above the baseline maximum {max}")]
    BaselinePriority {
        ruleset_id: String,
        priority: i32,
        max: i32,
    },
    #[error("{kind} {id} declares owner {declared} but is nested under {parent}")]
    OwnerMismatch {
        kind: &'static str,
        id: String,
        declared: String,
        parent: String,
    },
    #[error("rule {rule_id}: {source}")]
    InvalidRule {
        rule_id: String,
        #[source]
        source: Box<RuleError>,
    },
    #[error("ruleset {ruleset_id}: {source}")]
    InvalidRuleset {
        ruleset_id: String,
        #[source]
        source: Box<RuleError>,
    },
}

impl RuleError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RuleError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RuleError::Parse {
            path: path.into().display().to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn in_rule(self, rule_id: &str) -> Self {
        RuleError::InvalidRule {
            rule_id: rule_id.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_ruleset(self, ruleset_id: &str) -> Self {
        RuleError::InvalidRuleset {
            ruleset_id: ruleset_id.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<RuleError> for ValuationError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Io { source, .. } => ValuationError::Io(source),
            parse @ RuleError::Parse { .. } => ValuationError::Deserialization(parse.to_string()),
            other => ValuationError::Validation(other.to_string()),
        }
    }
}
