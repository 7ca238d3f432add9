use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use valuation_core::config::{
    ValuationConfig, DEFAULT_BASELINE_MAX_PRIORITY, DEFAULT_MAX_CONDITION_DEPTH,
};

use crate::action::Action;
use crate::condition::ConditionNode;
use crate::error::RuleError;

/// Bounds enforced when rule definitions are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_condition_depth: usize,
    pub baseline_max_priority: i32,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
            baseline_max_priority: DEFAULT_BASELINE_MAX_PRIORITY,
        }
    }
}

impl From<&ValuationConfig> for ValidationLimits {
    fn from(config: &ValuationConfig) -> Self {
        Self {
            max_condition_depth: config.max_condition_depth,
            baseline_max_priority: config.baseline_max_priority,
        }
    }
}

/// A condition tree plus the actions applied when it matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: String,
    /// Owning group; filled from the enclosing group when left out.
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
    /// Higher values are evaluated earlier within the ruleset.
    #[serde(default)]
    pub evaluation_order: i32,
    #[serde(default = "Rule::default_active")]
    pub is_active: bool,
    pub condition: ConditionNode,
    pub actions: Vec<Action>,
}

impl Rule {
    pub fn new(id: impl Into<String>, condition: ConditionNode, actions: Vec<Action>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            group_id: String::new(),
            evaluation_order: 0,
            is_active: true,
            condition,
            actions,
        }
    }

    pub fn default_active() -> bool {
        true
    }

    pub fn with_order(mut self, evaluation_order: i32) -> Self {
        self.evaluation_order = evaluation_order;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn validate(&self, limits: &ValidationLimits) -> Result<(), RuleError> {
        let check = || {
            if self.actions.is_empty() {
                return Err(RuleError::EmptyActions {
                    rule_id: self.id.clone(),
                });
            }
            self.condition.validate(limits.max_condition_depth)?;
            self.actions.iter().try_for_each(Action::validate)
        };
        if self.id.trim().is_empty() {
            return Err(RuleError::EmptyId { kind: "rule" });
        }
        check().map_err(|err| err.in_rule(&self.id))
    }
}

/// Category bucket of rules inside a ruleset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleGroup {
    pub id: String,
    /// Owning ruleset; filled from the enclosing ruleset when left out.
    #[serde(default)]
    pub ruleset_id: String,
    #[serde(default)]
    pub category: String,
    /// Display weight only; it never changes evaluation order.
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(id: impl Into<String>, category: impl Into<String>, mut rules: Vec<Rule>) -> Self {
        let id = id.into();
        for rule in &mut rules {
            rule.group_id = id.clone();
        }
        Self {
            id,
            ruleset_id: String::new(),
            category: category.into(),
            weight: 0,
            rules,
        }
    }
}

/// Prioritised collection of rule groups; the unit of activation and layering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ruleset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Lower values are evaluated earlier and land in lower layers.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "Rule::default_active")]
    pub is_active: bool,
    /// When present and false for a listing, the whole ruleset is skipped.
    #[serde(default)]
    pub applicability_condition: Option<ConditionNode>,
    #[serde(default)]
    pub is_baseline: bool,
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

impl Ruleset {
    pub fn new(id: impl Into<String>, priority: i32, mut groups: Vec<RuleGroup>) -> Self {
        let id = id.into();
        for group in &mut groups {
            group.ruleset_id = id.clone();
        }
        Self {
            name: id.clone(),
            id,
            priority,
            is_active: true,
            applicability_condition: None,
            is_baseline: false,
            groups,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn baseline(mut self) -> Self {
        self.is_baseline = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn applicable_when(mut self, condition: ConditionNode) -> Self {
        self.applicability_condition = Some(condition);
        self
    }

    /// Fills empty owner ids from the nesting they were loaded in.
    pub fn link_owners(&mut self) {
        for group in &mut self.groups {
            if group.ruleset_id.is_empty() {
                group.ruleset_id = self.id.clone();
            }
            for rule in &mut group.rules {
                if rule.group_id.is_empty() {
                    rule.group_id = group.id.clone();
                }
            }
        }
    }

    /// Every rule across every group, in authored order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|group| group.rules.iter())
    }

    pub fn validate(&self, limits: &ValidationLimits) -> Result<(), RuleError> {
        if self.id.trim().is_empty() {
            return Err(RuleError::EmptyId { kind: "ruleset" });
        }
        self.validate_contents(limits)
            .map_err(|err| err.in_ruleset(&self.id))
    }

    fn validate_contents(&self, limits: &ValidationLimits) -> Result<(), RuleError> {
        if self.is_baseline && self.priority > limits.baseline_max_priority {
            return Err(RuleError::BaselinePriority {
                ruleset_id: self.id.clone(),
                priority: self.priority,
                max: limits.baseline_max_priority,
            });
        }
        if let Some(condition) = &self.applicability_condition {
            condition.validate(limits.max_condition_depth)?;
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if !group.ruleset_id.is_empty() && group.ruleset_id != self.id {
                return Err(RuleError::OwnerMismatch {
                    kind: "group",
                    id: group.id.clone(),
                    declared: group.ruleset_id.clone(),
                    parent: self.id.clone(),
                });
            }
            for rule in &group.rules {
                if !rule.group_id.is_empty() && rule.group_id != group.id {
                    return Err(RuleError::OwnerMismatch {
                        kind: "rule",
                        id: rule.id.clone(),
                        declared: rule.group_id.clone(),
                        parent: group.id.clone(),
                    });
                }
                rule.validate(limits)?;
                if !seen.insert(rule.id.as_str()) {
                    return Err(RuleError::DuplicateRule {
                        ruleset_id: self.id.clone(),
                        rule_id: rule.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;
    use rust_decimal::Decimal;

    fn rule(id: &str) -> Rule {
        Rule::new(
            id,
            ConditionNode::leaf("ram_gb", Operator::GreaterThanOrEqual, 32),
            vec![Action::fixed(Decimal::from(50))],
        )
    }

    #[test]
    fn valid_ruleset_passes() {
        let ruleset = Ruleset::new("standard", 10, vec![RuleGroup::new("g", "memory", vec![rule("r1"), rule("r2")])]);
        assert!(ruleset.validate(&ValidationLimits::default()).is_ok());
    }

    #[test]
    fn rule_without_actions_is_rejected() {
        let mut bad = rule("r1");
        bad.actions.clear();
        let err = bad.validate(&ValidationLimits::default()).unwrap_err();
        assert!(err.to_string().contains("has no actions"));
    }

    #[test]
    fn baseline_marker_bounds_priority() {
        let limits = ValidationLimits::default();
        assert!(Ruleset::new("base", 5, vec![]).baseline().validate(&limits).is_ok());

        let err = Ruleset::new("base", 6, vec![])
            .baseline()
            .validate(&limits)
            .unwrap_err();
        match err {
            RuleError::InvalidRuleset { source, .. } => {
                assert!(matches!(*source, RuleError::BaselinePriority { priority: 6, .. }))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn duplicate_rule_ids_across_groups_are_rejected() {
        let ruleset = Ruleset::new(
            "standard",
            10,
            vec![
                RuleGroup::new("g1", "cpu", vec![rule("r1")]),
                RuleGroup::new("g2", "ram", vec![rule("r1")]),
            ],
        );
        let err = ruleset.validate(&ValidationLimits::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate rule identifier r1"));
    }

    #[test]
    fn invalid_applicability_condition_is_rejected() {
        let ruleset = Ruleset::new("standard", 10, vec![])
            .applicable_when(ConditionNode::all(vec![]));
        assert!(ruleset.validate(&ValidationLimits::default()).is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let ruleset: Ruleset = serde_yaml::from_str(
            r#"
id: standard
priority: 10
groups:
  - id: memory
    rules:
      - id: ram-32
        evaluation_order: 100
        condition: {type: leaf, field_name: ram_gb, operator: ">=", value: 32}
        actions:
          - {type: fixed_value, amount_usd: 50.00}
"#,
        )
        .expect("ruleset");

        assert!(ruleset.is_active);
        assert!(!ruleset.is_baseline);
        assert_eq!(ruleset.rules().count(), 1);
        assert_eq!(ruleset.rules().next().map(|r| r.evaluation_order), Some(100));
        assert!(ruleset.groups[0].ruleset_id.is_empty());
    }

    #[test]
    fn constructors_record_owners() {
        let ruleset = Ruleset::new("standard", 10, vec![RuleGroup::new("memory", "ram", vec![rule("r1")])]);
        assert_eq!(ruleset.groups[0].ruleset_id, "standard");
        assert_eq!(ruleset.groups[0].rules[0].group_id, "memory");
    }

    #[test]
    fn link_owners_fills_only_missing_ids() {
        let mut ruleset: Ruleset = serde_yaml::from_str(
            r#"
id: standard
groups:
  - id: memory
    rules:
      - id: ram-32
        condition: {type: leaf, field_name: ram_gb, operator: ">=", value: 32}
        actions: [{type: fixed_value, amount_usd: 50}]
      - id: ram-64
        group_id: memory
        condition: {type: leaf, field_name: ram_gb, operator: ">=", value: 64}
        actions: [{type: fixed_value, amount_usd: 80}]
"#,
        )
        .expect("ruleset");
        ruleset.link_owners();

        assert_eq!(ruleset.groups[0].ruleset_id, "standard");
        let owners: Vec<_> = ruleset.rules().map(|r| r.group_id.as_str()).collect();
        assert_eq!(owners, vec!["memory", "memory"]);
        assert!(ruleset.validate(&ValidationLimits::default()).is_ok());
    }

    #[test]
    fn conflicting_owner_ids_are_rejected() {
        let mut stray = rule("r1");
        stray.group_id = "cpu".into();
        let mut group = RuleGroup::new("memory", "ram", vec![]);
        group.rules.push(stray);
        let ruleset = Ruleset::new("standard", 10, vec![group]);

        let err = ruleset.validate(&ValidationLimits::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ruleset standard: rule r1 declares owner cpu but is nested under memory"
        );

        let mut group = RuleGroup::new("memory", "ram", vec![rule("r2")]);
        group.ruleset_id = "premium".into();
        let mut ruleset = Ruleset::new("standard", 10, vec![]);
        ruleset.groups.push(group);
        assert!(matches!(
            ruleset.validate(&ValidationLimits::default()),
            Err(RuleError::InvalidRuleset { .. })
        ));
    }
}
