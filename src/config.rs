//! Rally policy knobs: joiner counts, joiner skill rule, top-N cap, tier thresholds.
//!
//! Loaded from the YAML file named by `BEARHUNT_CONFIG`; every field falls back
//! to its default when omitted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "BEARHUNT_CONFIG";
pub const BIND_ENV_VAR: &str = "BEARHUNT_BIND";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Upper bound for `max_joiners` and `captain_heroes`.
pub const MAX_SLOTS: usize = 50;

/// Which skills a joiner may bring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinerSkillRule {
    /// Joiners always use their hero's first joiner-eligible skill.
    #[default]
    FirstSkill,
    /// Joiners pick among all joiner-eligible skills, like the captain.
    AnySkill,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Totals below this are Below Optimal.
    pub low: f64,
    /// Totals above this are Excellent.
    pub high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RallyConfig {
    pub captain_heroes: usize,
    pub min_joiners: usize,
    pub max_joiners: usize,
    pub joiner_skill_rule: JoinerSkillRule,
    /// Keep only the strongest N joiners; `None` keeps all of them.
    pub joiner_cap: Option<usize>,
    pub thresholds: TierThresholds,
    pub session_timeout_secs: u64,
}

impl Default for RallyConfig {
    fn default() -> Self {
        Self {
            captain_heroes: 1,
            min_joiners: 1,
            max_joiners: 4,
            joiner_skill_rule: JoinerSkillRule::FirstSkill,
            joiner_cap: None,
            thresholds: TierThresholds::default(),
            session_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl RallyConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Config named by `BEARHUNT_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("loading rally config from {path}");
                Self::load(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.captain_heroes == 0 {
            return Err(ConfigError::Invalid(
                "captain_heroes must be at least 1".to_string(),
            ));
        }
        if self.captain_heroes > MAX_SLOTS || self.max_joiners > MAX_SLOTS {
            return Err(ConfigError::Invalid(format!(
                "captain_heroes ({}) and max_joiners ({}) must not exceed {MAX_SLOTS}",
                self.captain_heroes, self.max_joiners
            )));
        }
        if self.min_joiners > self.max_joiners {
            return Err(ConfigError::Invalid(format!(
                "min_joiners ({}) exceeds max_joiners ({})",
                self.min_joiners, self.max_joiners
            )));
        }
        if self.joiner_cap == Some(0) {
            return Err(ConfigError::Invalid(
                "joiner_cap must be at least 1 when set".to_string(),
            ));
        }
        let TierThresholds { low, high } = self.thresholds;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ConfigError::Invalid(format!(
                "thresholds must satisfy low <= high (low={low}, high={high})"
            )));
        }
        Ok(())
    }
}

pub fn bind_addr_from_env() -> String {
    std::env::var(BIND_ENV_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = RallyConfig::from_yaml("{}").expect("empty mapping should parse");
        assert_eq!(config, RallyConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let raw = "joiner_skill_rule: any_skill\njoiner_cap: 4\nthresholds:\n  low: 100\n  high: 110\n";
        let config = RallyConfig::from_yaml(raw).expect("config should parse");
        assert_eq!(config.joiner_skill_rule, JoinerSkillRule::AnySkill);
        assert_eq!(config.joiner_cap, Some(4));
        assert_eq!(config.thresholds.low, 100.0);
        assert_eq!(config.thresholds.high, 110.0);
        assert_eq!(config.max_joiners, 4);
    }

    #[test]
    fn rejects_inverted_ranges() {
        assert!(matches!(
            RallyConfig::from_yaml("min_joiners: 5\nmax_joiners: 2\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RallyConfig::from_yaml("thresholds: {low: 150, high: 125}\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RallyConfig::from_yaml("joiner_cap: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RallyConfig::from_yaml("captain_heroes: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn slot_counts_are_bounded() {
        assert!(RallyConfig::from_yaml("max_joiners: 50\n").is_ok());
        assert!(matches!(
            RallyConfig::from_yaml("max_joiners: 1000000\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RallyConfig::from_yaml("captain_heroes: 51\n"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
