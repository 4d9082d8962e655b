//! Logger lifecycle management
//!
//! A [`LoggerFactory`] owns at most one live [`Logger`]. Applications build
//! one factory at start-up and pass it (or the logger it hands out) to request
//! handlers; [`LoggerFactory::global`] offers a process-wide instance for code
//! that cannot thread a handle through.
//!
//! State moves `uninitialized -> initialized -> (reset) -> uninitialized`.
//! A single mutex guards the state, so a `reset` is complete before any
//! following `get_instance` observes it.

use super::{
    config::{ConfigSource, LoggerConfig, ValidatedConfig},
    error::{LoggerError, Result},
    logger::Logger,
    meta::Meta,
    transport::Transport,
};
use crate::transports::ConsoleTransport;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Builds the transport for a validated configuration
pub type TransportBuilder = Box<dyn Fn(&LoggerConfig) -> Result<Box<dyn Transport>> + Send + Sync>;

/// Builds the transport used by the fallback logger
pub type FallbackTransportBuilder = Box<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

enum FactoryState {
    Uninitialized,
    Initialized {
        logger: Arc<Logger>,
        config: LoggerConfig,
    },
}

pub struct LoggerFactory {
    state: Mutex<FactoryState>,
    transport_builder: TransportBuilder,
    fallback_transport: FallbackTransportBuilder,
}

impl LoggerFactory {
    /// Factory writing to the console
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FactoryState::Uninitialized),
            transport_builder: Box::new(|_: &LoggerConfig| -> Result<Box<dyn Transport>> {
                Ok(Box::new(ConsoleTransport::new()))
            }),
            fallback_transport: Box::new(|| -> Box<dyn Transport> {
                Box::new(ConsoleTransport::new())
            }),
        }
    }

    /// Process-wide factory
    pub fn global() -> &'static LoggerFactory {
        static GLOBAL: OnceLock<LoggerFactory> = OnceLock::new();
        GLOBAL.get_or_init(LoggerFactory::new)
    }

    /// Replace how the logger's transport is built. A builder error is
    /// treated as a construction failure and triggers the fallback logger.
    #[must_use = "builder methods return a new value"]
    pub fn with_transport_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&LoggerConfig) -> Result<Box<dyn Transport>> + Send + Sync + 'static,
    {
        self.transport_builder = Box::new(builder);
        self
    }

    /// Replace the transport used by the fallback logger
    #[must_use = "builder methods return a new value"]
    pub fn with_fallback_transport<F>(mut self, builder: F) -> Self
    where
        F: Fn() -> Box<dyn Transport> + Send + Sync + 'static,
    {
        self.fallback_transport = Box::new(builder);
        self
    }

    /// Return the live logger, creating it from `config` if there is none.
    ///
    /// `config` is ignored when a logger already exists. Without a logger
    /// and without `config` this fails with
    /// [`LoggerError::ConfigurationRequired`]; that is the only error this
    /// method returns; construction failures yield the fallback logger.
    pub fn get_instance<C>(&self, config: Option<C>) -> Result<Arc<Logger>>
    where
        C: Into<ConfigSource>,
    {
        let mut state = self.state.lock();
        if let FactoryState::Initialized { logger, .. } = &*state {
            return Ok(Arc::clone(logger));
        }

        let source = config
            .map(Into::into)
            .ok_or(LoggerError::ConfigurationRequired)?;
        let ValidatedConfig { config, warnings } = source.validate();

        let logger = self
            .build(&config)
            .unwrap_or_else(|err| self.build_fallback(&err));
        logger.report_config_warnings(&warnings);

        let logger = Arc::new(logger);
        let active_config = logger.config().clone();
        *state = FactoryState::Initialized {
            logger: Arc::clone(&logger),
            config: active_config,
        };
        Ok(logger)
    }

    fn build(&self, config: &LoggerConfig) -> Result<Logger> {
        let transport = (self.transport_builder)(config)
            .map_err(|e| LoggerError::construction(format!("transport unavailable: {}", e)))?;
        Logger::from_validated(config.clone(), transport)
    }

    fn build_fallback(&self, cause: &LoggerError) -> Logger {
        let logger = Logger::fallback((self.fallback_transport)());
        logger.error(
            "Logger construction failed, using fallback logger",
            Meta::new()
                .with_field("operationType", "logger.init")
                .with_field("error", cause.to_string()),
        );
        logger
    }

    /// Destroy the live logger (flushing it) and forget the configuration.
    /// Does nothing when uninitialized.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        // Destroyed under the lock: the next get_instance cannot overlap it
        if let FactoryState::Initialized { logger, .. } =
            std::mem::replace(&mut *state, FactoryState::Uninitialized)
        {
            logger.destroy();
        }
    }

    /// Process-exit hook; same as [`reset`](Self::reset)
    pub fn shutdown(&self) {
        self.reset();
    }

    /// Active configuration, `None` when uninitialized
    pub fn get_config(&self) -> Option<LoggerConfig> {
        match &*self.state.lock() {
            FactoryState::Initialized { config, .. } => Some(config.clone()),
            FactoryState::Uninitialized => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(&*self.state.lock(), FactoryState::Initialized { .. })
    }

    /// Replace the live logger with one built from `config`
    pub fn update_config<C>(&self, config: C) -> Result<Arc<Logger>>
    where
        C: Into<ConfigSource>,
    {
        self.reset();
        self.get_instance(Some(config))
    }
}

impl Default for LoggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoggerFactory {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RawLoggerConfig;
    use crate::core::{Environment, LogLevel};
    use crate::transports::MemoryTransport;

    fn memory_factory(capture: &MemoryTransport) -> LoggerFactory {
        let for_logger = capture.clone();
        let for_fallback = capture.clone();
        LoggerFactory::new()
            .with_transport_builder(move |_| Ok(Box::new(for_logger.clone())))
            .with_fallback_transport(move || Box::new(for_fallback.clone()))
    }

    #[test]
    fn test_requires_configuration() {
        let factory = LoggerFactory::new();
        let result = factory.get_instance(None::<LoggerConfig>);
        assert!(matches!(result, Err(LoggerError::ConfigurationRequired)));
        assert!(!factory.is_initialized());
        assert!(factory.get_config().is_none());
    }

    #[test]
    fn test_existing_instance_ignores_new_config() {
        let capture = MemoryTransport::new();
        let factory = memory_factory(&capture);

        let first = factory
            .get_instance(Some(LoggerConfig::development()))
            .unwrap();
        let second = factory
            .get_instance(Some(LoggerConfig::production()))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            factory.get_config().map(|c| c.environment),
            Some(Environment::Development)
        );
        // Once initialized, no config is needed
        assert!(factory.get_instance(None::<LoggerConfig>).is_ok());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let factory = memory_factory(&MemoryTransport::new());
        factory.reset();
        factory.get_instance(Some(LoggerConfig::development())).unwrap();
        factory.reset();
        factory.reset();
        assert!(!factory.is_initialized());
    }

    #[test]
    fn test_transport_failure_uses_fallback() {
        let capture = MemoryTransport::new();
        let for_fallback = capture.clone();
        let factory = LoggerFactory::new()
            .with_transport_builder(|_| Err(LoggerError::other("collector unreachable")))
            .with_fallback_transport(move || Box::new(for_fallback.clone()));

        let logger = factory
            .get_instance(Some(LoggerConfig::production()))
            .unwrap();

        assert_eq!(logger.config().environment, Environment::Development);
        assert_eq!(logger.config().level, LogLevel::Info);
        let lines = capture.texts();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Logger construction failed"));
        assert!(lines[0].contains("collector unreachable"));
        assert_eq!(factory.get_config().map(|c| c.environment), Some(Environment::Development));
    }

    #[test]
    fn test_update_config_replaces_logger() {
        let capture = MemoryTransport::new();
        let factory = memory_factory(&capture);

        let old = factory
            .get_instance(Some(LoggerConfig::development()))
            .unwrap();
        let new = factory
            .update_config(LoggerConfig::production().with_level(LogLevel::Warn))
            .unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert!(old.is_destroyed());
        assert_eq!(new.config().level, LogLevel::Warn);
        factory.shutdown();
        assert!(new.is_destroyed());
    }

    #[test]
    fn test_config_corrections_reported_once() {
        let capture = MemoryTransport::new();
        let factory = memory_factory(&capture);

        let raw = RawLoggerConfig {
            environment: Some("development".into()),
            buffer_size: Some(0),
            ..Default::default()
        };
        let logger = factory.get_instance(Some(raw)).unwrap();

        let corrections: Vec<String> = capture
            .texts()
            .into_iter()
            .filter(|line| line.contains("Logger configuration corrected"))
            .collect();
        assert_eq!(corrections.len(), 1);
        assert!(corrections[0].contains("invalid bufferSize '0'"));
        assert_eq!(logger.config().buffer_size, LoggerConfig::development().buffer_size);
    }
}
