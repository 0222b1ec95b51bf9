//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `PROPMATCH_*` environment variables.
//! Model paths live in [`crate::model::ModelConfig`].

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_MODEL_ID, DEFAULT_N_BEST};
use crate::pipeline::{NoAnswerStrategy, ProcessOptions};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PROPMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Identifier of the scoring model (reported by `GET /`).
    pub model_id: String,

    /// Top start/end positions combined into span candidates. Default: `20`.
    pub n_best: usize,

    /// Max cached query results. `0` disables caching. Default: `100`.
    pub cache_capacity: usize,

    /// No-answer strategy used when a request does not name one.
    pub no_answer_strategy: NoAnswerStrategy,

    /// Suppress duplicate properties unless the request says otherwise.
    pub suppress_duplicates: bool,

    /// Default answer limit per list; `None` keeps every answer.
    pub top: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_id: DEFAULT_MODEL_ID.to_string(),
            n_best: DEFAULT_N_BEST,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            no_answer_strategy: NoAnswerStrategy::default(),
            suppress_duplicates: false,
            top: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "PROPMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "PROPMATCH_BIND_ADDR";
    const ENV_MODEL: &'static str = "PROPMATCH_MODEL";
    const ENV_BEST_SIZE: &'static str = "PROPMATCH_BEST_SIZE";
    const ENV_CACHE_CAPACITY: &'static str = "PROPMATCH_CACHE_CAPACITY";
    const ENV_NO_ANSWER_STRATEGY: &'static str = "PROPMATCH_NO_ANSWER_STRATEGY";
    const ENV_SUPPRESS_DUPLICATES: &'static str = "PROPMATCH_SUPPRESS_DUPLICATES";
    const ENV_TOP: &'static str = "PROPMATCH_TOP";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_id = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model_id);
        let n_best = Self::parse_usize_from_env(Self::ENV_BEST_SIZE, defaults.n_best);
        let cache_capacity =
            Self::parse_usize_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let no_answer_strategy = Self::parse_strategy_from_env(defaults.no_answer_strategy)?;
        let suppress_duplicates =
            Self::parse_bool_from_env(Self::ENV_SUPPRESS_DUPLICATES, defaults.suppress_duplicates);
        let top = env::var(Self::ENV_TOP)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|top| *top > 0);

        Ok(Self {
            port,
            bind_addr,
            model_id,
            n_best,
            cache_capacity,
            no_answer_strategy,
            suppress_duplicates,
            top,
        })
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_best == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BEST_SIZE,
                value: self.n_best.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.model_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MODEL,
                value: self.model_id.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Returns `true` if results should be cached.
    pub fn cache_enabled(&self) -> bool {
        self.cache_capacity > 0
    }

    /// Request options used when the caller does not override them.
    pub fn default_options(&self) -> ProcessOptions {
        ProcessOptions {
            top: self.top,
            suppress_duplicates: self.suppress_duplicates,
            no_answer_strategy: self.no_answer_strategy,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_strategy_from_env(default: NoAnswerStrategy) -> Result<NoAnswerStrategy, ConfigError> {
        match env::var(Self::ENV_NO_ANSWER_STRATEGY) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: Self::ENV_NO_ANSWER_STRATEGY,
                    value,
                    reason: "allowed values are 'ignore' and 'threshold'".to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(v) => matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "suppress"
            ),
            Err(_) => default,
        }
    }
}
