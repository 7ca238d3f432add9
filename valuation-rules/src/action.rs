use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::ListingContext;
use crate::error::RuleError;
use crate::field::FieldPath;

/// Price effect produced when a rule matches a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Flat adjustment in USD.
    FixedValue {
        amount_usd: Decimal,
        #[serde(default)]
        description: Option<String>,
    },
    /// Adjustment scaled by a numeric listing field, e.g. `$3.00 * ram_gb`.
    PerUnit {
        amount_per_unit_usd: Decimal,
        unit_field: FieldPath,
        #[serde(default)]
        description: Option<String>,
    },
    /// Marginal effect of scaling the base price by `factor`.
    Multiplier {
        factor: Decimal,
        #[serde(default)]
        description: Option<String>,
    },
}

impl Action {
    pub fn fixed(amount_usd: Decimal) -> Self {
        Action::FixedValue {
            amount_usd,
            description: None,
        }
    }

    pub fn per_unit(
        amount_per_unit_usd: Decimal,
        unit_field: impl Into<FieldPath>,
    ) -> Result<Self, RuleError> {
        let action = Action::PerUnit {
            amount_per_unit_usd,
            unit_field: unit_field.into(),
            description: None,
        };
        action.validate()?;
        Ok(action)
    }

    pub fn multiplier(factor: Decimal) -> Self {
        Action::Multiplier {
            factor,
            description: None,
        }
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Action::FixedValue { description, .. }
            | Action::PerUnit { description, .. }
            | Action::Multiplier { description, .. } => *description = Some(text.into()),
        }
        self
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        match self {
            Action::PerUnit { unit_field, .. } if unit_field.is_empty() => {
                Err(RuleError::MissingUnitField)
            }
            Action::Multiplier { factor, .. } if factor.is_sign_negative() => {
                Err(RuleError::NegativeMultiplier(factor.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Authored description, or a generated one when none was given.
    pub fn description(&self) -> String {
        match self {
            Action::FixedValue {
                description: Some(text),
                ..
            }
            | Action::PerUnit {
                description: Some(text),
                ..
            }
            | Action::Multiplier {
                description: Some(text),
                ..
            } => text.clone(),
            Action::FixedValue { amount_usd, .. } => format!("fixed {} USD", amount_usd),
            Action::PerUnit {
                amount_per_unit_usd,
                unit_field,
                ..
            } => format!("{} USD per {}", amount_per_unit_usd, unit_field),
            Action::Multiplier { factor, .. } => format!("x{} base price", factor),
        }
    }

    /// Signed USD amount this action contributes for the listing.
    pub fn amount_for(&self, context: &ListingContext) -> Decimal {
        match self {
            Action::FixedValue { amount_usd, .. } => *amount_usd,
            Action::PerUnit {
                amount_per_unit_usd,
                unit_field,
                ..
            } => match unit_field.resolve(context).and_then(|value| value.as_decimal()) {
                Some(units) => amount_per_unit_usd.checked_mul(units).unwrap_or_else(|| {
                    warn!(
                        listing = context.label(),
                        field = %unit_field,
                        units = %units,
                        "per-unit amount overflows; action contributes 0"
                    );
                    Decimal::ZERO
                }),
                None => {
                    warn!(
                        listing = context.label(),
                        field = %unit_field,
                        "unit field missing or non-numeric; per-unit action contributes 0"
                    );
                    Decimal::ZERO
                }
            },
            Action::Multiplier { factor, .. } => factor
                .checked_sub(Decimal::ONE)
                .and_then(|marginal| context.base_price_usd.checked_mul(marginal))
                .unwrap_or_else(|| {
                    warn!(
                        listing = context.label(),
                        factor = %factor,
                        "multiplier adjustment overflows; action contributes 0"
                    );
                    Decimal::ZERO
                }),
        }
    }
}

/// Contribution of a single action inside a matched rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub description: String,
    pub amount_usd: Decimal,
}

/// Summed effect of an ordered action list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionResolution {
    pub total_usd: Decimal,
    pub per_action: Vec<ActionOutcome>,
}

/// Resolves every action in order and sums their amounts exactly.
///
/// An action whose amount would overflow the running total is recorded with
/// a zero amount so `total_usd` always equals the sum of `per_action`.
pub fn resolve_actions(context: &ListingContext, actions: &[Action]) -> ActionResolution {
    let mut resolution = ActionResolution::default();
    for action in actions {
        let description = action.description();
        let mut amount_usd = action.amount_for(context);
        match resolution.total_usd.checked_add(amount_usd) {
            Some(total) => resolution.total_usd = total,
            None => {
                warn!(
                    listing = context.label(),
                    action = %description,
                    "action amount overflows rule total; action contributes 0"
                );
                amount_usd = Decimal::ZERO;
            }
        }
        resolution.per_action.push(ActionOutcome {
            description,
            amount_usd,
        });
    }
    resolution
}
