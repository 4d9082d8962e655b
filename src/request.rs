//! Request-scoped logging
//!
//! A [`RequestLogger`] pairs the shared [`Logger`] with the correlation id of
//! one inbound HTTP request and stamps that id on every call. It is cheap to
//! create: one per request, dropped when the response is sent.

use crate::core::{
    generate_request_id, LogLevel, Logger, LoggerConfig, LoggerFactory, Meta, MetaValue, Result,
    REQUEST_ID_KEY,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RequestLogger {
    logger: Arc<Logger>,
    request_id: String,
    base: Meta,
}

impl RequestLogger {
    pub fn new(logger: Arc<Logger>, request_id: impl Into<String>) -> Self {
        Self {
            logger,
            request_id: request_id.into(),
            base: Meta::new(),
        }
    }

    /// Start a request: fetch the live logger and generate a correlation id.
    ///
    /// Fails only if the factory was never configured.
    pub fn begin(factory: &LoggerFactory) -> Result<Self> {
        Self::begin_with_id(factory, generate_request_id())
    }

    /// Start a request with an id supplied by upstream middleware
    pub fn begin_with_id(factory: &LoggerFactory, request_id: impl Into<String>) -> Result<Self> {
        let logger = factory.get_instance(None::<LoggerConfig>)?;
        Ok(Self::new(logger, request_id))
    }

    /// Attach a field to every entry logged through this handle
    #[must_use = "builder methods return a new value"]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<MetaValue>,
    {
        self.base.add_field(key, value);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Caller fields win over base fields; the request id always wins
    fn tagged(&self, meta: Option<Meta>) -> Meta {
        let mut meta = meta.unwrap_or_default();
        meta.merge_missing(&self.base);
        meta.add_field(REQUEST_ID_KEY, self.request_id.as_str());
        meta
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.logger.log(level, message, self.tagged(meta.into()));
    }

    pub fn debug(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Debug, message, meta);
    }

    pub fn info(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn warn(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn error(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn fatal(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Fatal, message, meta);
    }

    /// Log the outcome of the request. 5xx logs at `error`, 4xx at `warn`,
    /// everything else at `info`.
    pub fn request_completed(&self, method: &str, path: &str, status_code: u16, duration: Duration) {
        let level = match status_code {
            500.. => LogLevel::Error,
            400..=499 => LogLevel::Warn,
            _ => LogLevel::Info,
        };
        self.log(
            level,
            format!("{} {} {}", method, path, status_code),
            Meta::new()
                .with_field("method", method)
                .with_field("path", path)
                .with_field("statusCode", status_code)
                .with_field("duration", duration),
        );
    }

    /// Run `operation`, logging its duration at `debug` on success or the
    /// error at `error` on failure. The result is returned unchanged.
    pub fn time_operation<T, E, F>(&self, operation_type: &str, operation: F) -> std::result::Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let started = Instant::now();
        let result = operation();
        let meta = Meta::new()
            .with_field("operationType", operation_type)
            .with_field("duration", started.elapsed());

        match &result {
            Ok(_) => self.debug(format!("{} completed", operation_type), meta),
            Err(e) => self.error(
                format!("{} failed", operation_type),
                meta.with_field("error", e.to_string()),
            ),
        }
        result
    }
}
