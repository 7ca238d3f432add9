use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::ListingContext;
use crate::error::RuleError;
use crate::field::FieldPath;
use crate::scalar::Scalar;

/// Comparison applied by a leaf condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(alias = "==", alias = "EQUALS")]
    Equals,
    #[serde(alias = "!=", alias = "NOT_EQUALS")]
    NotEquals,
    #[serde(alias = ">", alias = "GREATER_THAN")]
    GreaterThan,
    #[serde(alias = ">=", alias = "GREATER_THAN_OR_EQUAL")]
    GreaterThanOrEqual,
    #[serde(alias = "<", alias = "LESS_THAN")]
    LessThan,
    #[serde(alias = "<=", alias = "LESS_THAN_OR_EQUAL")]
    LessThanOrEqual,
    #[serde(alias = "CONTAINS")]
    Contains,
    #[serde(alias = "IN")]
    In,
    #[serde(alias = "NOT_IN")]
    NotIn,
}

impl Operator {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
        )
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }
}

/// Boolean connective of a condition group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

/// Condition tree deciding whether a rule (or a whole ruleset) applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionNode {
    /// Compare one listing field against a literal.
    Leaf {
        field_name: FieldPath,
        operator: Operator,
        value: Scalar,
    },
    /// Combine child conditions with AND / OR.
    Group {
        logical_operator: LogicalOperator,
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    pub fn leaf(
        field_name: impl Into<FieldPath>,
        operator: Operator,
        value: impl Into<Scalar>,
    ) -> Self {
        ConditionNode::Leaf {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            logical_operator: LogicalOperator::And,
            children,
        }
    }

    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            logical_operator: LogicalOperator::Or,
            children,
        }
    }

    /// Number of levels in the tree; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            ConditionNode::Leaf { .. } => 1,
            ConditionNode::Group { children, .. } => {
                1 + children.iter().map(ConditionNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Rejects empty groups, blank field names and trees deeper than `max_depth`.
    pub fn validate(&self, max_depth: usize) -> Result<(), RuleError> {
        self.validate_at(1, max_depth)
    }

    fn validate_at(&self, level: usize, max_depth: usize) -> Result<(), RuleError> {
        if level > max_depth {
            return Err(RuleError::ConditionTooDeep { max: max_depth });
        }
        match self {
            ConditionNode::Leaf { field_name, .. } => {
                if field_name.is_empty() {
                    return Err(RuleError::EmptyFieldName);
                }
                Ok(())
            }
            ConditionNode::Group { children, .. } => {
                if children.is_empty() {
                    return Err(RuleError::EmptyGroup);
                }
                children
                    .iter()
                    .try_for_each(|child| child.validate_at(level + 1, max_depth))
            }
        }
    }

    /// Evaluates the tree against the listing. Pure; never fails.
    pub fn evaluate(&self, context: &ListingContext) -> bool {
        match self {
            ConditionNode::Leaf {
                field_name,
                operator,
                value,
            } => match field_name.resolve(context) {
                Some(actual) => compare(*operator, actual, value, field_name),
                None => {
                    trace!(field = %field_name, "field not set; condition is false");
                    false
                }
            },
            ConditionNode::Group {
                logical_operator: LogicalOperator::And,
                children,
            } => children.iter().all(|child| child.evaluate(context)),
            ConditionNode::Group {
                logical_operator: LogicalOperator::Or,
                children,
            } => children.iter().any(|child| child.evaluate(context)),
        }
    }
}

fn compare(operator: Operator, actual: &Scalar, expected: &Scalar, field: &FieldPath) -> bool {
    match operator {
        Operator::Equals => actual.loosely_equals(expected),
        Operator::NotEquals => !actual.loosely_equals(expected),
        Operator::GreaterThan
        | Operator::GreaterThanOrEqual
        | Operator::LessThan
        | Operator::LessThanOrEqual => match (actual.as_decimal(), expected.as_decimal()) {
            (Some(left), Some(right)) => operator.accepts(left.cmp(&right)),
            _ => {
                debug!(
                    field = %field,
                    actual = %actual,
                    expected = %expected,
                    "non-numeric operand for numeric comparison"
                );
                false
            }
        },
        Operator::Contains => contains(actual, expected),
        Operator::In => match expected.as_list() {
            Some(candidates) => is_member(actual, candidates),
            None => {
                debug!(field = %field, "`in` expects a list value");
                false
            }
        },
        Operator::NotIn => match expected.as_list() {
            Some(candidates) => !is_member(actual, candidates),
            None => {
                debug!(field = %field, "`not_in` expects a list value");
                false
            }
        },
    }
}

fn contains(actual: &Scalar, expected: &Scalar) -> bool {
    match actual {
        Scalar::List(items) => items.iter().any(|item| item.loosely_equals(expected)),
        Scalar::Text(text) => text.contains(&expected.to_string()),
        _ => false,
    }
}

/// A list-valued field is a member when any of its items is.
fn is_member(actual: &Scalar, candidates: &[Scalar]) -> bool {
    match actual {
        Scalar::List(items) => items
            .iter()
            .any(|item| candidates.iter().any(|candidate| item.loosely_equals(candidate))),
        _ => candidates
            .iter()
            .any(|candidate| actual.loosely_equals(candidate)),
    }
}
