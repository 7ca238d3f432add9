//! Valuation: layered pricing rules for catalog listings.
//!
//! The workspace is split into a few crates:
//!
//! * [`valuation_core`]: shared errors, configuration, logging and JSON helpers
//! * [`valuation_rules`]: the rule evaluation engine (conditions, actions,
//!   rulesets, layering and the attribution breakdown)
//!
//! The `valuation` binary lives in the `valuation-cli` crate.

pub use valuation_core;
pub use valuation_rules;

pub use valuation_core::{ValuationConfig, ValuationError};
pub use valuation_rules::{
    evaluate_listing, load_snapshot, Action, ConditionNode, EvaluationResult, Layer,
    LayerPolicy, ListingContext, Operator, Rule, RuleError, RuleGroup, Ruleset,
    RulesetSnapshot, Scalar, ValidationLimits, ValuationEngine,
};
