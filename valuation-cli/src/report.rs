use colored::*;
use rust_decimal::{Decimal, RoundingStrategy};
use valuation_rules::{EvaluationResult, LayerPolicy, RulesetSnapshot};

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders a signed USD amount rounded to cents, e.g. `+$50.00`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = cents(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        "+"
    };
    format!("{}${:.2}", sign, rounded.abs())
}

pub fn print_validation_summary(snapshot: &RulesetSnapshot, policy: &LayerPolicy) {
    println!(
        "{} {} ruleset(s)",
        "✔ Rulesets valid:".green().bold(),
        snapshot.len()
    );
    for ruleset in snapshot.iter() {
        let state = if ruleset.is_active {
            "active".normal()
        } else {
            "inactive".dimmed()
        };
        println!(
            "  {} ({}) priority {} → {} [{}], {} rule(s)",
            ruleset.name.bold(),
            ruleset.id,
            ruleset.priority,
            policy.layer_for(ruleset),
            state,
            ruleset.rules().count()
        );
    }
}

pub fn print_breakdown(result: &EvaluationResult) {
    if let Some(listing_id) = &result.listing_id {
        println!("{} {}", "Listing".bold(), listing_id);
    }
    println!("  Base price:     ${:.2}", cents(result.base_price_usd));

    if result.rulesets_evaluated.is_empty() {
        println!("  {}", "No rulesets applied; price unchanged".yellow());
    }

    for (layer, breakdown) in &result.layers {
        println!(
            "  {} [{}] {}",
            layer.to_string().cyan().bold(),
            breakdown.ruleset_ids.join(", "),
            format_usd(breakdown.adjustment_usd)
        );
        for rule in &breakdown.matched_rules {
            println!("    {} {}", format_usd(rule.adjustment_usd), rule.rule_name);
            for action in &rule.actions {
                println!(
                    "      {} {}",
                    format_usd(action.amount_usd).dimmed(),
                    action.description.dimmed()
                );
            }
        }
    }

    println!("  Adjustment:     {}", format_usd(result.total_adjustment_usd));
    println!(
        "  {} ${:.2}",
        "Adjusted price:".green().bold(),
        cents(result.adjusted_price_usd)
    );
}
