// Property tests for evaluation invariants: child order, additivity, determinism.
use proptest::prelude::*;
use rust_decimal::Decimal;
use valuation::{
    evaluate_listing, Action, ConditionNode, ListingContext, Operator, Rule, RuleGroup, Ruleset,
    RulesetSnapshot, Scalar, ValidationLimits,
};

fn listing() -> ListingContext {
    ListingContext::builder(Decimal::from(900))
        .field("ram_gb", 32)
        .field("condition", "refurb")
        .field("tags", vec!["rgb", "wifi"])
        .related("cpu", "cores", 12)
        .build()
}

fn arb_operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Equals),
        Just(Operator::NotEquals),
        Just(Operator::GreaterThan),
        Just(Operator::GreaterThanOrEqual),
        Just(Operator::LessThan),
        Just(Operator::LessThanOrEqual),
        Just(Operator::Contains),
        Just(Operator::In),
        Just(Operator::NotIn),
    ]
}

fn arb_value() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        (0i64..64).prop_map(Scalar::from),
        prop::sample::select(vec!["refurb", "new", "wifi", "rgb"]).prop_map(Scalar::from),
        prop::collection::vec(0i64..40, 0..4).prop_map(Scalar::from),
    ]
}

fn arb_leaf() -> impl Strategy<Value = ConditionNode> {
    (
        prop::sample::select(vec!["ram_gb", "cpu.cores", "condition", "tags", "gpu.vram_gb"]),
        arb_operator(),
        arb_value(),
    )
        .prop_map(|(field, operator, value)| ConditionNode::leaf(field, operator, value))
}

fn arb_condition() -> impl Strategy<Value = ConditionNode> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(ConditionNode::all),
            prop::collection::vec(inner, 1..4).prop_map(ConditionNode::any),
        ]
    })
}

fn permuted(node: &ConditionNode) -> ConditionNode {
    match node {
        ConditionNode::Leaf { .. } => node.clone(),
        ConditionNode::Group {
            logical_operator,
            children,
        } => {
            let mut children: Vec<_> = children.iter().map(permuted).collect();
            children.reverse();
            if children.len() > 2 {
                children.rotate_left(1);
            }
            ConditionNode::Group {
                logical_operator: *logical_operator,
                children,
            }
        }
    }
}

fn arb_rulesets() -> impl Strategy<Value = Vec<Ruleset>> {
    let rule = (arb_condition(), -50i64..200, 0i32..5);
    prop::collection::vec((0i32..30, prop::collection::vec(rule, 1..5)), 0..5).prop_map(|sets| {
        sets.into_iter()
            .enumerate()
            .map(|(set_idx, (priority, rules))| {
                let rules = rules
                    .into_iter()
                    .enumerate()
                    .map(|(rule_idx, (condition, amount, order))| {
                        Rule::new(
                            format!("r{set_idx}-{rule_idx}"),
                            condition,
                            vec![Action::fixed(Decimal::from(amount))],
                        )
                        .with_order(order)
                    })
                    .collect();
                Ruleset::new(format!("set-{set_idx}"), priority, vec![RuleGroup::new("g", "c", rules)])
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn permuting_group_children_keeps_result(node in arb_condition()) {
        let context = listing();
        prop_assert_eq!(node.evaluate(&context), permuted(&node).evaluate(&context));
    }

    #[test]
    fn total_is_sum_of_matched_rules(rulesets in arb_rulesets()) {
        let snapshot = RulesetSnapshot::new(rulesets, &ValidationLimits::default()).unwrap();
        let result = evaluate_listing(&listing(), &snapshot, None);

        let flat: Decimal = result.matched_rules.iter().map(|m| m.adjustment_usd).sum();
        let layered: Decimal = result.layers.values().map(|l| l.adjustment_usd).sum();
        prop_assert_eq!(result.total_adjustment_usd, flat);
        prop_assert_eq!(result.total_adjustment_usd, layered);
        prop_assert_eq!(result.adjusted_price_usd, result.base_price_usd + flat);
    }

    #[test]
    fn evaluation_is_deterministic(rulesets in arb_rulesets()) {
        let snapshot = RulesetSnapshot::new(rulesets, &ValidationLimits::default()).unwrap();
        let first = evaluate_listing(&listing(), &snapshot, None);
        let second = evaluate_listing(&listing(), &snapshot, None);
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn rulesets_are_reported_in_priority_order(rulesets in arb_rulesets()) {
        let snapshot = RulesetSnapshot::new(rulesets, &ValidationLimits::default()).unwrap();
        let result = evaluate_listing(&listing(), &snapshot, None);
        let priorities: Vec<_> = result.rulesets_evaluated.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        prop_assert_eq!(priorities, sorted);
    }
}
