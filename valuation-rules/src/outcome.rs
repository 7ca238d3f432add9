use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use valuation_core::serde_utils;
use valuation_core::CoreResult;

use crate::action::ActionOutcome;
use crate::layer::Layer;

/// A rule that matched within one ruleset, with its resolved adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub rule_id: String,
    pub rule_name: String,
    pub group_id: String,
    pub adjustment_usd: Decimal,
    pub actions: Vec<ActionOutcome>,
}

impl MatchedRule {
    pub fn action_descriptions(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|action| action.description.clone())
            .collect()
    }
}

/// Identity of a ruleset that took part in an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetSummary {
    pub id: String,
    pub name: String,
    pub priority: i32,
    pub layer: Layer,
}

/// Everything contributed to one layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerBreakdown {
    /// Rulesets assigned to the layer, in evaluation order.
    pub ruleset_ids: Vec<String>,
    pub adjustment_usd: Decimal,
    pub matched_rules: Vec<MatchedRule>,
}

/// Flattened attribution entry for consumers that ignore layering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRuleEntry {
    pub rule_id: String,
    pub rule_name: String,
    pub ruleset_id: String,
    pub ruleset_name: String,
    pub layer: Layer,
    pub adjustment_usd: Decimal,
    pub action_descriptions: Vec<String>,
}

/// Final, auditable outcome of pricing a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub base_price_usd: Decimal,
    pub total_adjustment_usd: Decimal,
    pub adjusted_price_usd: Decimal,
    pub rulesets_evaluated: Vec<RulesetSummary>,
    pub layers: BTreeMap<Layer, LayerBreakdown>,
    pub matched_rules: Vec<MatchedRuleEntry>,
}

impl EvaluationResult {
    /// Result for a listing no ruleset applied to: price unchanged.
    pub fn empty(listing_id: Option<String>, base_price_usd: Decimal) -> Self {
        Self {
            listing_id,
            base_price_usd,
            total_adjustment_usd: Decimal::ZERO,
            adjusted_price_usd: base_price_usd,
            rulesets_evaluated: Vec::new(),
            layers: BTreeMap::new(),
            matched_rules: Vec::new(),
        }
    }

    pub fn layer(&self, layer: Layer) -> Option<&LayerBreakdown> {
        self.layers.get(&layer)
    }

    pub fn is_unchanged(&self) -> bool {
        self.total_adjustment_usd.is_zero()
    }

    /// Serializes the breakdown blob stored alongside the listing.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_utils::to_pretty_json(self)
    }
}

/// Accumulates per-ruleset results into an [`EvaluationResult`].
#[derive(Debug)]
pub(crate) struct ResultBuilder {
    result: EvaluationResult,
}

impl ResultBuilder {
    pub(crate) fn new(listing_id: Option<String>, base_price_usd: Decimal) -> Self {
        Self {
            result: EvaluationResult::empty(listing_id, base_price_usd),
        }
    }

    /// Adds one evaluated ruleset. A matched rule whose adjustment would
    /// overflow a running total is left out of the result entirely.
    pub(crate) fn record(&mut self, summary: RulesetSummary, matched: Vec<MatchedRule>) {
        let layer = summary.layer;
        let breakdown = self.result.layers.entry(layer).or_default();
        breakdown.ruleset_ids.push(summary.id.clone());

        for rule in matched {
            let totals = self
                .result
                .total_adjustment_usd
                .checked_add(rule.adjustment_usd)
                .and_then(|total| {
                    let adjusted = self.result.base_price_usd.checked_add(total)?;
                    let layer_total = breakdown.adjustment_usd.checked_add(rule.adjustment_usd)?;
                    Some((total, adjusted, layer_total))
                });
            let Some((total, adjusted, layer_total)) = totals else {
                warn!(
                    listing = self.result.listing_id.as_deref().unwrap_or("<unnamed>"),
                    ruleset_id = %summary.id,
                    rule_id = %rule.rule_id,
                    adjustment_usd = %rule.adjustment_usd,
                    "rule adjustment overflows listing total; rule skipped"
                );
                continue;
            };

            self.result.total_adjustment_usd = total;
            self.result.adjusted_price_usd = adjusted;
            breakdown.adjustment_usd = layer_total;
            self.result.matched_rules.push(MatchedRuleEntry {
                rule_id: rule.rule_id.clone(),
                rule_name: rule.rule_name.clone(),
                ruleset_id: summary.id.clone(),
                ruleset_name: summary.name.clone(),
                layer,
                adjustment_usd: rule.adjustment_usd,
                action_descriptions: rule.action_descriptions(),
            });
            breakdown.matched_rules.push(rule);
        }

        self.result.rulesets_evaluated.push(summary);
    }

    pub(crate) fn finish(self) -> EvaluationResult {
        self.result
    }
}
