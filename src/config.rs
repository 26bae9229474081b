//! Orchestrator configuration, grounded on `pipeline/config.rs`'s
//! `PipelineConfig`/`ConfigError` shape: a `Default`, builder-style
//! `with_*` setters, and a `from_env()` constructor reading
//! `CASCADE_*`-prefixed environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::promotion::{DEFAULT_S1_TO_S0_THRESHOLD, DEFAULT_S2_TO_S1_THRESHOLD};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Top-level configuration for a `SolverOrchestrator` instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Successes required before S2→S1 promotion (default 3).
    pub s2_to_s1_threshold: u32,
    /// Consecutive successes required before S1→S0 promotion (default 10).
    pub s1_to_s0_threshold: u32,
    /// Number of S2 synthesis attempts per task (default 3).
    pub synthesis_retry_budget: u32,
    /// Per-program sandbox timeout.
    pub sandbox_timeout: Duration,
    /// Sandbox stdout byte cap (default 5 KiB).
    pub sandbox_stdout_cap: usize,
    /// Sandbox stderr byte cap (default 2 KiB).
    pub sandbox_stderr_cap: usize,
    /// Interpreter used to run IO-task source candidates.
    pub interpreter: PathBuf,
    /// Path to the persisted PromotionState document.
    pub state_path: PathBuf,
    /// Path to the append-only promotions log.
    pub promotions_log_path: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            s2_to_s1_threshold: DEFAULT_S2_TO_S1_THRESHOLD,
            s1_to_s0_threshold: DEFAULT_S1_TO_S0_THRESHOLD,
            synthesis_retry_budget: 3,
            sandbox_timeout: Duration::from_secs(5),
            sandbox_stdout_cap: 5 * 1024,
            sandbox_stderr_cap: 2 * 1024,
            interpreter: PathBuf::from("python3"),
            state_path: PathBuf::from("./cascade-data/promotion_state.json"),
            promotions_log_path: PathBuf::from("./cascade-data/promotions.log"),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, s2_to_s1: u32, s1_to_s0: u32) -> Self {
        self.s2_to_s1_threshold = s2_to_s1;
        self.s1_to_s0_threshold = s1_to_s0;
        self
    }

    pub fn with_synthesis_retry_budget(mut self, retries: u32) -> Self {
        self.synthesis_retry_budget = retries;
        self
    }

    pub fn with_sandbox_timeout(mut self, timeout: Duration) -> Self {
        self.sandbox_timeout = timeout;
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    pub fn with_promotions_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.promotions_log_path = path.into();
        self
    }

    /// Reads overrides from `CASCADE_*`-prefixed environment variables,
    /// starting from [`OrchestratorConfig::default`].
    ///
    /// - `CASCADE_S2_TO_S1_THRESHOLD`
    /// - `CASCADE_S1_TO_S0_THRESHOLD`
    /// - `CASCADE_SYNTHESIS_RETRY_BUDGET`
    /// - `CASCADE_SANDBOX_TIMEOUT_SECS`
    /// - `CASCADE_SANDBOX_STDOUT_CAP`
    /// - `CASCADE_SANDBOX_STDERR_CAP`
    /// - `CASCADE_INTERPRETER`
    /// - `CASCADE_STATE_PATH`
    /// - `CASCADE_PROMOTIONS_LOG_PATH`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CASCADE_S2_TO_S1_THRESHOLD") {
            config.s2_to_s1_threshold = parse_env_value(&val, "CASCADE_S2_TO_S1_THRESHOLD")?;
        }
        if let Ok(val) = std::env::var("CASCADE_S1_TO_S0_THRESHOLD") {
            config.s1_to_s0_threshold = parse_env_value(&val, "CASCADE_S1_TO_S0_THRESHOLD")?;
        }
        if let Ok(val) = std::env::var("CASCADE_SYNTHESIS_RETRY_BUDGET") {
            config.synthesis_retry_budget = parse_env_value(&val, "CASCADE_SYNTHESIS_RETRY_BUDGET")?;
        }
        if let Ok(val) = std::env::var("CASCADE_SANDBOX_TIMEOUT_SECS") {
            let secs: u64 = parse_env_value(&val, "CASCADE_SANDBOX_TIMEOUT_SECS")?;
            config.sandbox_timeout = Duration::from_secs(secs);
        }
        if let Ok(val) = std::env::var("CASCADE_SANDBOX_STDOUT_CAP") {
            config.sandbox_stdout_cap = parse_env_value(&val, "CASCADE_SANDBOX_STDOUT_CAP")?;
        }
        if let Ok(val) = std::env::var("CASCADE_SANDBOX_STDERR_CAP") {
            config.sandbox_stderr_cap = parse_env_value(&val, "CASCADE_SANDBOX_STDERR_CAP")?;
        }
        if let Ok(val) = std::env::var("CASCADE_INTERPRETER") {
            config.interpreter = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CASCADE_STATE_PATH") {
            config.state_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CASCADE_PROMOTIONS_LOG_PATH") {
            config.promotions_log_path = PathBuf::from(val);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.s2_to_s1_threshold == 0 {
            return Err(ConfigError::ValidationFailed("s2_to_s1_threshold must be greater than 0".to_string()));
        }
        if self.s1_to_s0_threshold == 0 {
            return Err(ConfigError::ValidationFailed("s1_to_s0_threshold must be greater than 0".to_string()));
        }
        if self.synthesis_retry_budget == 0 {
            return Err(ConfigError::ValidationFailed("synthesis_retry_budget must be greater than 0".to_string()));
        }
        if self.sandbox_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed("sandbox_timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn parse_env_value<T: FromStr>(val: &str, key: &str) -> Result<T, ConfigError> {
    val.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", val),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(OrchestratorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_threshold_fails_validation() {
        let config = OrchestratorConfig::default().with_thresholds(0, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_setters_compose() {
        let config = OrchestratorConfig::default()
            .with_thresholds(5, 20)
            .with_synthesis_retry_budget(2);
        assert_eq!(config.s2_to_s1_threshold, 5);
        assert_eq!(config.s1_to_s0_threshold, 20);
        assert_eq!(config.synthesis_retry_budget, 2);
    }
}
