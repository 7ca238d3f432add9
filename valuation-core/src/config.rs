use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Default maximum nesting depth accepted for a condition tree.
pub const DEFAULT_MAX_CONDITION_DEPTH: usize = 32;
/// Highest priority that still lands a ruleset in the baseline layer.
pub const DEFAULT_BASELINE_MAX_PRIORITY: i32 = 5;
/// Lowest priority that lands a ruleset in the advanced layer.
pub const DEFAULT_ADVANCED_MIN_PRIORITY: i32 = 16;

/// Engine and tooling configuration shared across the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationConfig {
    pub max_condition_depth: usize,
    pub baseline_max_priority: i32,
    pub advanced_min_priority: i32,
    pub rules_path: Option<PathBuf>,
    pub log_level: String,
    pub parallel: bool,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
            baseline_max_priority: DEFAULT_BASELINE_MAX_PRIORITY,
            advanced_min_priority: DEFAULT_ADVANCED_MIN_PRIORITY,
            rules_path: None,
            log_level: "info".to_string(),
            parallel: false,
        }
    }
}

impl ValuationConfig {
    /// Loads configuration from the process environment (`VALUATION_` prefix).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("VALUATION_")
    }

    /// Loads configuration from env vars prefixed with the provided value.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);
        let defaults = Self::default();

        let max_condition_depth =
            parse_var(&key("MAX_CONDITION_DEPTH"))?.unwrap_or(defaults.max_condition_depth);
        let baseline_max_priority =
            parse_var(&key("BASELINE_MAX_PRIORITY"))?.unwrap_or(defaults.baseline_max_priority);
        let advanced_min_priority =
            parse_var(&key("ADVANCED_MIN_PRIORITY"))?.unwrap_or(defaults.advanced_min_priority);
        let parallel = parse_var(&key("PARALLEL"))?.unwrap_or(defaults.parallel);

        let rules_path = env::var(key("RULES_PATH")).ok().map(PathBuf::from);
        let log_level = env::var(key("LOG_LEVEL")).unwrap_or(defaults.log_level);

        let config = Self {
            max_condition_depth,
            baseline_max_priority,
            advanced_min_priority,
            rules_path,
            log_level,
            parallel,
        };
        config.check()?;
        Ok(config)
    }

    /// Verifies that the layer thresholds and depth guard are usable together.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_condition_depth == 0 {
            return Err(ConfigError::Inconsistent(
                "max condition depth must be at least 1".into(),
            ));
        }
        if self.baseline_max_priority >= self.advanced_min_priority {
            return Err(ConfigError::Inconsistent(format!(
                "baseline max priority {} must be below advanced min priority {}",
                self.baseline_max_priority, self.advanced_min_priority
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
