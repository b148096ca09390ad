//! Interpreter configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on consecutive always-transitions in one cycle.
pub const DEFAULT_MAX_ALWAYS_STEPS: usize = 1000;

/// Default number of transitions kept in an instance's history.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Errors loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_always_steps must be at least 1")]
    ZeroAlwaysSteps,
}

/// Tunables for a machine instance.
///
/// Missing fields take their defaults when deserialized.
///
/// # Example
///
/// ```rust
/// use statewise::InterpreterConfig;
///
/// let config = InterpreterConfig::from_json(r#"{ "max_always_steps": 50 }"#).unwrap();
///
/// assert_eq!(config.max_always_steps, 50);
/// assert_eq!(config.history_limit, statewise::config::DEFAULT_HISTORY_LIMIT);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Always-transitions allowed in one cycle before the instance is frozen
    pub max_always_steps: usize,
    /// Transitions kept in history; older entries are dropped
    pub history_limit: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_always_steps: DEFAULT_MAX_ALWAYS_STEPS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl InterpreterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the always-transition bound. Values below 1 are raised to 1.
    pub fn max_always_steps(mut self, steps: usize) -> Self {
        self.max_always_steps = steps.max(1);
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_always_steps == 0 {
            return Err(ConfigError::ZeroAlwaysSteps);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let config = InterpreterConfig::default();
        assert_eq!(config.max_always_steps, 1000);
        assert_eq!(config.history_limit, 256);
    }

    #[test]
    fn setters_chain() {
        let config = InterpreterConfig::new()
            .max_always_steps(10)
            .history_limit(0);

        assert_eq!(config.max_always_steps, 10);
        assert_eq!(config.history_limit, 0);
    }

    #[test]
    fn zero_steps_clamped_by_setter() {
        let config = InterpreterConfig::new().max_always_steps(0);

        assert_eq!(config.max_always_steps, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = InterpreterConfig::from_json("{}").unwrap();
        assert_eq!(config, InterpreterConfig::default());
    }

    #[test]
    fn zero_steps_rejected() {
        let result = InterpreterConfig::from_json(r#"{ "max_always_steps": 0 }"#);
        assert!(matches!(result, Err(ConfigError::ZeroAlwaysSteps)));
    }

    #[test]
    fn malformed_json_rejected() {
        let result = InterpreterConfig::from_json(r#"{ "history_limit": "lots" }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
