use std::fmt;

use serde::{Deserialize, Serialize};
use valuation_core::config::{
    ValuationConfig, DEFAULT_ADVANCED_MIN_PRIORITY, DEFAULT_BASELINE_MAX_PRIORITY,
};

use crate::rule::Ruleset;

/// Precedence bucket a ruleset is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Baseline,
    Basic,
    Advanced,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Baseline => "baseline",
            Layer::Basic => "basic",
            Layer::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority thresholds used to assign rulesets to layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPolicy {
    /// Rulesets at or below this priority are baseline.
    pub baseline_max_priority: i32,
    /// Rulesets at or above this priority are advanced.
    pub advanced_min_priority: i32,
}

impl Default for LayerPolicy {
    fn default() -> Self {
        Self {
            baseline_max_priority: DEFAULT_BASELINE_MAX_PRIORITY,
            advanced_min_priority: DEFAULT_ADVANCED_MIN_PRIORITY,
        }
    }
}

impl From<&ValuationConfig> for LayerPolicy {
    fn from(config: &ValuationConfig) -> Self {
        Self {
            baseline_max_priority: config.baseline_max_priority,
            advanced_min_priority: config.advanced_min_priority,
        }
    }
}

impl LayerPolicy {
    pub fn layer_for(&self, ruleset: &Ruleset) -> Layer {
        if ruleset.is_baseline || ruleset.priority <= self.baseline_max_priority {
            Layer::Baseline
        } else if ruleset.priority >= self.advanced_min_priority {
            Layer::Advanced
        } else {
            Layer::Basic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, Layer::Baseline ; "zero")]
    #[test_case(5, Layer::Baseline ; "baseline boundary")]
    #[test_case(6, Layer::Basic ; "first basic")]
    #[test_case(10, Layer::Basic ; "basic")]
    #[test_case(15, Layer::Basic ; "last basic")]
    #[test_case(16, Layer::Advanced ; "advanced boundary")]
    #[test_case(20, Layer::Advanced ; "advanced")]
    fn assigns_layers_by_priority(priority: i32, expected: Layer) {
        let ruleset = Ruleset::new("r", priority, vec![]);
        assert_eq!(LayerPolicy::default().layer_for(&ruleset), expected);
    }

    #[test]
    fn baseline_marker_wins_over_priority() {
        let mut ruleset = Ruleset::new("r", 30, vec![]);
        ruleset.is_baseline = true;
        assert_eq!(LayerPolicy::default().layer_for(&ruleset), Layer::Baseline);
    }

    #[test]
    fn layers_order_from_baseline_to_advanced() {
        assert!(Layer::Baseline < Layer::Basic);
        assert!(Layer::Basic < Layer::Advanced);
        assert_eq!(Layer::Advanced.to_string(), "advanced");
    }
}
