// Loads the sample rule files from disk and values the sample listing.
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use valuation::valuation_core::serde_utils;
use valuation::{
    load_snapshot, Layer, LayerPolicy, ListingContext, RuleError, ValidationLimits,
    ValuationConfig, ValuationEngine,
};

fn samples() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples")
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

fn sample_listing() -> ListingContext {
    let raw = std::fs::read_to_string(samples().join("listing.json")).expect("listing file");
    serde_utils::from_json_str(&raw).expect("listing json")
}

#[test]
fn sample_rules_load_in_file_order() {
    let snapshot =
        load_snapshot(samples().join("rulesets"), &ValidationLimits::default()).expect("load");
    let ids: Vec<_> = snapshot.iter().map(|ruleset| ruleset.id.as_str()).collect();
    assert_eq!(ids, vec!["baseline", "standard", "gpu-premium"]);
}

#[test]
fn sample_listing_gets_full_breakdown() {
    let snapshot =
        load_snapshot(samples().join("rulesets"), &ValidationLimits::default()).expect("load");
    let result = ValuationEngine::default().evaluate_listing(&sample_listing(), &snapshot, None);

    assert_eq!(result.listing_id.as_deref(), Some("desktop-4471"));
    assert_eq!(result.layer(Layer::Baseline).unwrap().adjustment_usd, dec("-180.00"));
    assert_eq!(result.layer(Layer::Basic).unwrap().adjustment_usd, dec("171.00"));
    assert_eq!(result.layer(Layer::Advanced).unwrap().adjustment_usd, dec("10.00"));
    assert_eq!(result.total_adjustment_usd, dec("1.00"));
    assert_eq!(result.adjusted_price_usd, dec("1201.00"));

    let standard: Vec<_> = result
        .matched_rules
        .iter()
        .filter(|entry| entry.ruleset_id == "standard")
        .map(|entry| entry.rule_id.as_str())
        .collect();
    assert_eq!(standard, vec!["ram-32-bonus", "many-cores", "ram-per-gb"]);
}

#[test]
fn breakdown_blob_round_trips_through_json() {
    let snapshot =
        load_snapshot(samples().join("rulesets"), &ValidationLimits::default()).expect("load");
    let result = ValuationEngine::default().evaluate_listing(&sample_listing(), &snapshot, None);

    let blob = result.to_json().expect("json");
    let stored: valuation::EvaluationResult = serde_utils::from_json_str(&blob).expect("decode");
    assert_eq!(stored, result);
}

#[test]
fn applicability_condition_skips_laptops() {
    let snapshot =
        load_snapshot(samples().join("rulesets"), &ValidationLimits::default()).expect("load");
    let mut listing = sample_listing();
    listing
        .fields
        .insert("category".into(), valuation::Scalar::from("laptop"));

    let result = ValuationEngine::default().evaluate_listing(&listing, &snapshot, None);
    assert!(result.layer(Layer::Advanced).is_none());
    assert!(result
        .rulesets_evaluated
        .iter()
        .all(|ruleset| ruleset.id != "gpu-premium"));
}

#[test]
fn config_driven_engine_uses_configured_thresholds() {
    let config = ValuationConfig {
        advanced_min_priority: 10,
        ..ValuationConfig::default()
    };
    let snapshot = load_snapshot(samples().join("rulesets"), &ValidationLimits::from(&config))
        .expect("load");
    let engine = ValuationEngine::from_config(&config);
    assert_eq!(
        *engine.policy(),
        LayerPolicy {
            baseline_max_priority: 5,
            advanced_min_priority: 10
        }
    );

    let result = engine.evaluate_listing(&sample_listing(), &snapshot, None);
    assert!(result.layer(Layer::Basic).is_none());
    assert_eq!(result.layer(Layer::Advanced).unwrap().ruleset_ids.len(), 2);
}

#[test]
fn shallow_depth_limit_rejects_sample_rules() {
    let limits = ValidationLimits {
        max_condition_depth: 1,
        ..ValidationLimits::default()
    };
    let err = load_snapshot(samples().join("rulesets"), &limits).unwrap_err();
    assert!(matches!(err, RuleError::InvalidRuleset { .. }));
}
