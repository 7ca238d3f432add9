//! Pricing rule evaluation engine for catalog listings.
//!
//! Rulesets are layered, independently prioritised collections of rules.
//! Each rule pairs a nested AND/OR condition tree with typed actions that
//! turn a match into a signed USD adjustment. The engine evaluates every
//! applicable ruleset against a [`ListingContext`] and returns an
//! [`EvaluationResult`] with per-rule, per-layer attribution.
//!
//! Evaluation is synchronous and pure: rule definitions arrive as a
//! validated [`RulesetSnapshot`], nothing is read from or written to a store.

mod action;
mod condition;
mod context;
mod engine;
mod error;
mod field;
mod layer;
mod loader;
mod outcome;
mod rule;
mod scalar;
mod selector;
mod snapshot;

pub use action::{resolve_actions, Action, ActionOutcome, ActionResolution};
pub use condition::{ConditionNode, LogicalOperator, Operator};
pub use context::{Attributes, ListingContext, ListingContextBuilder};
pub use engine::{evaluate_listing, ValuationEngine};
pub use error::RuleError;
pub use field::{resolve as resolve_field, FieldPath};
pub use layer::{Layer, LayerPolicy};
pub use loader::{load_rulesets, load_snapshot, parse_rulesets};
pub use outcome::{
    EvaluationResult, LayerBreakdown, MatchedRule, MatchedRuleEntry, RulesetSummary,
};
pub use rule::{Rule, RuleGroup, Ruleset, ValidationLimits};
pub use scalar::Scalar;
pub use selector::select_rules;
pub use snapshot::RulesetSnapshot;
