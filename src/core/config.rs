//! Logger configuration and validation
//!
//! Configuration arrives either as an environment bag (string key/values, as
//! read from the process environment) or as a typed [`RawLoggerConfig`].
//! Both go through the same validation, which never fails: out-of-range or
//! unparsable values are replaced with the environment's default and a
//! [`ConfigWarning`] is recorded for each correction.

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Primary environment selector
pub const APP_ENV_VAR: &str = "APP_ENV";
/// Consulted when `APP_ENV` is absent
pub const NODE_ENV_VAR: &str = "NODE_ENV";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_BUFFER_SIZE_VAR: &str = "LOG_BUFFER_SIZE";
/// Milliseconds
pub const LOG_FLUSH_INTERVAL_VAR: &str = "LOG_FLUSH_INTERVAL";
pub const APP_VERSION_VAR: &str = "APP_VERSION";
pub const SERVICE_NAME_VAR: &str = "SERVICE_NAME";

pub const MIN_BUFFER_SIZE: usize = 1;
pub const MAX_BUFFER_SIZE: usize = 1000;
pub const MIN_FLUSH_INTERVAL_MS: u64 = 100;
pub const MAX_FLUSH_INTERVAL_MS: u64 = 60_000;

pub const DEFAULT_SERVICE_NAME: &str = "household-budget";
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Deployment environment; selects the output strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Immediate, human-formatted output
    #[default]
    Development,
    /// Buffered, structured output with a periodic flush
    Production,
}

impl Environment {
    /// `production` and `prod` (any case) select production; everything
    /// else is development.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn default_level(&self) -> LogLevel {
        match self {
            Environment::Development => LogLevel::Debug,
            Environment::Production => LogLevel::Info,
        }
    }

    pub fn default_buffer_size(&self) -> usize {
        match self {
            Environment::Development => 10,
            Environment::Production => 50,
        }
    }

    pub fn default_flush_interval(&self) -> Duration {
        match self {
            Environment::Development => Duration::from_millis(1000),
            Environment::Production => Duration::from_millis(5000),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated logger configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerConfig {
    pub environment: Environment,
    /// Minimum severity that is emitted
    pub level: LogLevel,
    pub buffer_size: usize,
    pub flush_interval: Duration,
    pub version: String,
    pub service: String,
}

impl LoggerConfig {
    /// Defaults for the given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            level: environment.default_level(),
            buffer_size: environment.default_buffer_size(),
            flush_interval: environment.default_flush_interval(),
            version: DEFAULT_VERSION.to_string(),
            service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    pub fn development() -> Self {
        Self::for_environment(Environment::Development)
    }

    pub fn production() -> Self {
        Self::for_environment(Environment::Production)
    }

    /// Hard-coded configuration used when the real logger cannot be built
    pub fn fallback() -> Self {
        Self {
            level: LogLevel::Info,
            ..Self::development()
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Re-check the ranges of a programmatically built configuration
    pub fn validate(self) -> ValidatedConfig {
        RawLoggerConfig::from(self).validate()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// A correction applied during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub supplied: String,
    pub applied: String,
}

impl ConfigWarning {
    fn new(field: &'static str, supplied: impl fmt::Display, applied: impl fmt::Display) -> Self {
        Self {
            field,
            supplied: supplied.to_string(),
            applied: applied.to_string(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', using {}",
            self.field, self.supplied, self.applied
        )
    }
}

/// Result of validation: the usable config plus any corrections made
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub config: LoggerConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Unvalidated configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLoggerConfig {
    pub environment: Option<String>,
    pub level: Option<String>,
    pub buffer_size: Option<i64>,
    #[serde(alias = "flushInterval")]
    pub flush_interval_ms: Option<i64>,
    pub version: Option<String>,
    pub service: Option<String>,
}

impl RawLoggerConfig {
    pub fn validate(self) -> ValidatedConfig {
        self.validate_with(Vec::new())
    }

    fn validate_with(self, mut warnings: Vec<ConfigWarning>) -> ValidatedConfig {
        let environment = self
            .environment
            .as_deref()
            .map(Environment::parse)
            .unwrap_or_default();
        let mut config = LoggerConfig::for_environment(environment);

        if let Some(level) = self.level.as_deref().filter(|s| !s.trim().is_empty()) {
            match level.parse::<LogLevel>() {
                Ok(level) => config.level = level,
                Err(_) => warnings.push(ConfigWarning::new(
                    "level",
                    level,
                    config.level.as_name(),
                )),
            }
        }

        if let Some(size) = self.buffer_size {
            let in_range = usize::try_from(size)
                .ok()
                .filter(|size| (MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(size));
            match in_range {
                Some(size) => config.buffer_size = size,
                None => warnings.push(ConfigWarning::new(
                    "bufferSize",
                    size,
                    config.buffer_size,
                )),
            }
        }

        if let Some(interval) = self.flush_interval_ms {
            let in_range = u64::try_from(interval)
                .ok()
                .filter(|ms| (MIN_FLUSH_INTERVAL_MS..=MAX_FLUSH_INTERVAL_MS).contains(ms));
            match in_range {
                Some(ms) => config.flush_interval = Duration::from_millis(ms),
                None => warnings.push(ConfigWarning::new(
                    "flushInterval",
                    interval,
                    format!("{}ms", config.flush_interval.as_millis()),
                )),
            }
        }

        if let Some(version) = self.version.filter(|s| !s.trim().is_empty()) {
            config.version = version;
        }
        if let Some(service) = self.service.filter(|s| !s.trim().is_empty()) {
            config.service = service;
        }

        ValidatedConfig { config, warnings }
    }
}

impl From<LoggerConfig> for RawLoggerConfig {
    fn from(config: LoggerConfig) -> Self {
        Self {
            environment: Some(config.environment.as_str().to_string()),
            level: Some(config.level.as_name().to_string()),
            buffer_size: Some(i64::try_from(config.buffer_size).unwrap_or(i64::MAX)),
            flush_interval_ms: Some(
                i64::try_from(config.flush_interval.as_millis()).unwrap_or(i64::MAX),
            ),
            version: Some(config.version),
            service: Some(config.service),
        }
    }
}

/// String key/value configuration, usually a snapshot of the process
/// environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvBag {
    vars: HashMap<String, String>,
}

impl EnvBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn validate(&self) -> ValidatedConfig {
        let mut warnings = Vec::new();
        let raw = RawLoggerConfig {
            environment: self
                .get(APP_ENV_VAR)
                .or_else(|| self.get(NODE_ENV_VAR))
                .map(str::to_string),
            level: self.get(LOG_LEVEL_VAR).map(str::to_string),
            buffer_size: self.parse_number(LOG_BUFFER_SIZE_VAR, &mut warnings),
            flush_interval_ms: self.parse_number(LOG_FLUSH_INTERVAL_VAR, &mut warnings),
            version: self.get(APP_VERSION_VAR).map(str::to_string),
            service: self.get(SERVICE_NAME_VAR).map(str::to_string),
        };
        raw.validate_with(warnings)
    }

    fn parse_number(&self, key: &'static str, warnings: &mut Vec<ConfigWarning>) -> Option<i64> {
        let value = self.get(key)?.trim();
        if value.is_empty() {
            return None;
        }
        match value.parse::<i64>() {
            Ok(number) => Some(number),
            Err(_) => {
                warnings.push(ConfigWarning::new(key, value, "default"));
                None
            }
        }
    }
}

impl FromIterator<(String, String)> for EnvBag {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Anything the factory accepts as configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Env(EnvBag),
    Raw(RawLoggerConfig),
    Config(LoggerConfig),
}

impl ConfigSource {
    pub fn validate(&self) -> ValidatedConfig {
        match self {
            ConfigSource::Env(bag) => bag.validate(),
            ConfigSource::Raw(raw) => raw.clone().validate(),
            ConfigSource::Config(config) => config.clone().validate(),
        }
    }
}

impl From<EnvBag> for ConfigSource {
    fn from(bag: EnvBag) -> Self {
        ConfigSource::Env(bag)
    }
}

impl From<RawLoggerConfig> for ConfigSource {
    fn from(raw: RawLoggerConfig) -> Self {
        ConfigSource::Raw(raw)
    }
}

impl From<LoggerConfig> for ConfigSource {
    fn from(config: LoggerConfig) -> Self {
        ConfigSource::Config(config)
    }
}
