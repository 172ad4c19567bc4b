//! Engine configuration.

use crate::{MAX_DEPTH, MAX_EXPANSIONS};
use thiserror::Error;

/// Environment variable overriding `max_depth`.
pub const ENV_MAX_DEPTH: &str = "CADRE_MAX_DEPTH";
/// Environment variable overriding `max_expansions`.
pub const ENV_MAX_EXPANSIONS: &str = "CADRE_MAX_EXPANSIONS";
/// Environment variable overriding `parallel`.
pub const ENV_PARALLEL: &str = "CADRE_PARALLEL";

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: String, value: String },
}

/// Configuration for an expansion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest allowed derivation chain (seeds have depth 0)
    pub max_depth: usize,
    /// Rule invocations allowed per seed; the run's budget scales with its input
    pub max_expansions: usize,
    /// Invoke the rules of one wave on the rayon pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_expansions: MAX_EXPANSIONS,
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_expansions(mut self, count: usize) -> Self {
        self.max_expansions = count;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Defaults, overridden by `CADRE_MAX_DEPTH`, `CADRE_MAX_EXPANSIONS`
    /// and `CADRE_PARALLEL` where set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MAX_DEPTH) {
            config.max_depth = parse_count(ENV_MAX_DEPTH, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_EXPANSIONS) {
            config.max_expansions = parse_count(ENV_MAX_EXPANSIONS, &value)?;
        }
        if let Some(value) = lookup(ENV_PARALLEL) {
            config.parallel = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(ENV_PARALLEL, &value)),
            };
        }

        Ok(config)
    }
}

fn parse_count(var: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(var, value)),
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
    }
}
