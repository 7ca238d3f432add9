use std::collections::HashSet;
use std::sync::Arc;

use crate::error::RuleError;
use crate::rule::{Ruleset, ValidationLimits};

/// Validated, immutable set of rulesets shared by every evaluation in a batch.
///
/// Cloning is cheap; the rulesets themselves are never mutated after
/// construction, so a snapshot can be handed to any number of workers.
#[derive(Debug, Clone)]
pub struct RulesetSnapshot {
    rulesets: Arc<[Ruleset]>,
}

impl RulesetSnapshot {
    /// Links owner ids, validates every ruleset and rejects duplicate ruleset ids.
    pub fn new(mut rulesets: Vec<Ruleset>, limits: &ValidationLimits) -> Result<Self, RuleError> {
        rulesets.iter_mut().for_each(Ruleset::link_owners);
        {
            let mut seen = HashSet::new();
            for ruleset in &rulesets {
                ruleset.validate(limits)?;
                if !seen.insert(ruleset.id.as_str()) {
                    return Err(RuleError::DuplicateRuleset {
                        id: ruleset.id.clone(),
                    });
                }
            }
        }
        Ok(Self {
            rulesets: rulesets.into(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterates rulesets in their loaded order.
    pub fn iter(&self) -> std::slice::Iter<'_, Ruleset> {
        self.rulesets.iter()
    }

    pub fn rulesets(&self) -> &[Ruleset] {
        &self.rulesets
    }

    pub fn get(&self, id: &str) -> Option<&Ruleset> {
        self.rulesets.iter().find(|ruleset| ruleset.id == id)
    }

    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }
}

impl Default for RulesetSnapshot {
    fn default() -> Self {
        Self {
            rulesets: Arc::from(Vec::new()),
        }
    }
}
