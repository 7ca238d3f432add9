use tracing::{debug, trace};

use crate::action::resolve_actions;
use crate::context::ListingContext;
use crate::outcome::MatchedRule;
use crate::rule::{Rule, Ruleset};

/// Evaluates every active rule of a ruleset against the listing.
///
/// Rules run by `evaluation_order` descending (ties by ascending id) and are
/// additive: every matching rule contributes, evaluation never stops early.
pub fn select_rules(context: &ListingContext, ruleset: &Ruleset) -> Vec<MatchedRule> {
    let mut candidates: Vec<(&str, &Rule)> = ruleset
        .groups
        .iter()
        .flat_map(|group| group.rules.iter().map(move |rule| (group.id.as_str(), rule)))
        .filter(|(_, rule)| rule.is_active)
        .collect();
    candidates.sort_by(|(_, a), (_, b)| {
        b.evaluation_order
            .cmp(&a.evaluation_order)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut matched = Vec::new();
    for (group_id, rule) in candidates {
        if !rule.condition.evaluate(context) {
            trace!(ruleset_id = %ruleset.id, rule_id = %rule.id, "rule did not match");
            continue;
        }

        let resolution = resolve_actions(context, &rule.actions);
        debug!(
            listing = context.label(),
            ruleset_id = %ruleset.id,
            rule_id = %rule.id,
            adjustment_usd = %resolution.total_usd,
            "rule matched listing"
        );
        matched.push(MatchedRule {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            group_id: group_id.to_string(),
            adjustment_usd: resolution.total_usd,
            actions: resolution.per_action,
        });
    }

    matched
}
