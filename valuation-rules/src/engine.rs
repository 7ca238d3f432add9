use tracing::debug;
use valuation_core::ValuationConfig;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::context::ListingContext;
use crate::layer::LayerPolicy;
use crate::outcome::{EvaluationResult, ResultBuilder, RulesetSummary};
use crate::rule::Ruleset;
use crate::selector::select_rules;
use crate::snapshot::RulesetSnapshot;

/// Why a ruleset did not take part in an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Inactive,
    Restricted,
    Excluded,
    NotApplicable,
}

/// Orchestrates ruleset selection, rule evaluation and layering.
///
/// The engine holds only policy; every call is a pure function of the
/// listing, the snapshot and the optional ruleset restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationEngine {
    policy: LayerPolicy,
    parallel: bool,
}

impl ValuationEngine {
    pub fn new(policy: LayerPolicy) -> Self {
        Self {
            policy,
            parallel: false,
        }
    }

    pub fn from_config(config: &ValuationConfig) -> Self {
        Self {
            policy: LayerPolicy::from(config),
            parallel: config.parallel,
        }
    }

    /// Fan batch evaluations out over the rayon pool (`parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn policy(&self) -> &LayerPolicy {
        &self.policy
    }

    /// Whether batches run on the rayon pool. Always false without the
    /// `parallel` feature.
    pub fn is_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }

    /// Prices one listing against the snapshot.
    ///
    /// An unknown `restrict_to` or an empty snapshot yields an unchanged
    /// price with no rulesets evaluated.
    pub fn evaluate_listing(
        &self,
        context: &ListingContext,
        snapshot: &RulesetSnapshot,
        restrict_to: Option<&str>,
    ) -> EvaluationResult {
        let mut applicable: Vec<&Ruleset> = snapshot
            .iter()
            .filter(|ruleset| match skip_reason(context, ruleset, restrict_to) {
                Some(reason) => {
                    debug!(
                        listing = context.label(),
                        ruleset_id = %ruleset.id,
                        reason = ?reason,
                        "ruleset skipped"
                    );
                    false
                }
                None => true,
            })
            .collect();
        applicable.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

        let mut builder = ResultBuilder::new(context.listing_id.clone(), context.base_price_usd);
        for ruleset in applicable {
            let layer = self.policy.layer_for(ruleset);
            let matched = select_rules(context, ruleset);
            debug!(
                listing = context.label(),
                ruleset_id = %ruleset.id,
                layer = %layer,
                matched = matched.len(),
                "ruleset evaluated"
            );
            builder.record(
                RulesetSummary {
                    id: ruleset.id.clone(),
                    name: ruleset.name.clone(),
                    priority: ruleset.priority,
                    layer,
                },
                matched,
            );
        }

        builder.finish()
    }

    /// Prices many listings independently; output order matches input order.
    pub fn evaluate_batch(
        &self,
        listings: &[ListingContext],
        snapshot: &RulesetSnapshot,
        restrict_to: Option<&str>,
    ) -> Vec<EvaluationResult> {
        #[cfg(feature = "parallel")]
        if self.is_parallel() {
            return listings
                .par_iter()
                .map(|context| self.evaluate_listing(context, snapshot, restrict_to))
                .collect();
        }

        listings
            .iter()
            .map(|context| self.evaluate_listing(context, snapshot, restrict_to))
            .collect()
    }
}

fn skip_reason(
    context: &ListingContext,
    ruleset: &Ruleset,
    restrict_to: Option<&str>,
) -> Option<SkipReason> {
    if !ruleset.is_active {
        return Some(SkipReason::Inactive);
    }
    if restrict_to.is_some_and(|id| id != ruleset.id) {
        return Some(SkipReason::Restricted);
    }
    if context.is_excluded(&ruleset.id) {
        return Some(SkipReason::Excluded);
    }
    match &ruleset.applicability_condition {
        Some(condition) if !condition.evaluate(context) => Some(SkipReason::NotApplicable),
        _ => None,
    }
}

/// Prices a listing with the default layer policy.
pub fn evaluate_listing(
    context: &ListingContext,
    snapshot: &RulesetSnapshot,
    restrict_to: Option<&str>,
) -> EvaluationResult {
    ValuationEngine::default().evaluate_listing(context, snapshot, restrict_to)
}
