//! Logger core: level filtering, buffering and flushing
//!
//! In development every entry is rendered immediately in formatted style.
//! In production entries are appended to a buffer that is flushed in
//! structured style when it reaches `buffer_size`, on every `fatal`, on each
//! tick of a background timer, and once more on [`Logger::destroy`].
//!
//! No method on [`Logger`] returns an error or lets a panic escape. Transport
//! failures degrade to the minimal fallback line; if that fails too the entry
//! is counted as dropped.

use super::{
    config::{ConfigWarning, LoggerConfig, ValidatedConfig},
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::{should_emit, LogLevel},
    meta::Meta,
    metrics::LoggerMetrics,
    render::RenderStyle,
    sanitizer::sanitize,
    transport::Transport,
};
use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

/// Name of the background flush thread
pub const FLUSH_TIMER_THREAD_NAME: &str = "log-flush-timer";

/// Write a diagnostic about the pipeline itself to stderr, ignoring failure
pub(crate) fn internal_diagnostic(args: fmt::Arguments<'_>) {
    let _ = writeln!(std::io::stderr().lock(), "{}", args);
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

struct LoggerInner {
    config: LoggerConfig,
    transport: Mutex<Box<dyn Transport>>,
    buffer: Mutex<Vec<LogEntry>>,
    destroyed: AtomicBool,
    metrics: LoggerMetrics,
}

impl LoggerInner {
    fn dispatch(&self, level: LogLevel, message: &str, meta: &Meta) {
        let entry = LogEntry::new(
            level,
            message,
            sanitize(meta),
            self.config.environment,
            &self.config.service,
            &self.config.version,
        );

        if !self.config.environment.is_buffered() {
            let mut transport = self.transport.lock();
            // Checked under the transport lock so nothing is written after close
            if self.destroyed.load(Ordering::Acquire) {
                return;
            }
            self.write_with_fallback(&mut **transport, &entry, RenderStyle::Formatted);
            return;
        }

        let should_flush = {
            let mut buffer = self.buffer.lock();
            if self.destroyed.load(Ordering::Acquire) {
                return;
            }
            buffer.push(entry);
            self.metrics.record_buffered();
            buffer.len() >= self.config.buffer_size || level == LogLevel::Fatal
        };

        if should_flush {
            self.flush();
        }
    }

    /// Swap the buffer out and render it. The transport lock is taken first
    /// so that concurrent flushes write their batches in append order.
    fn flush(&self) {
        self.metrics.record_flush_attempt();

        let mut transport = self.transport.lock();
        let batch = std::mem::take(&mut *self.buffer.lock());
        if batch.is_empty() {
            return;
        }

        for entry in &batch {
            self.write_with_fallback(&mut **transport, entry, RenderStyle::Structured);
        }
        self.metrics.record_flush();

        let name = transport.name().to_string();
        match catch_unwind(AssertUnwindSafe(|| transport.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                internal_diagnostic(format_args!(
                    "[LOGGER ERROR] Transport '{}' flush failed: {}",
                    name, e
                ));
            }
            Err(panic_info) => {
                internal_diagnostic(format_args!(
                    "[LOGGER CRITICAL] Transport '{}' panicked during flush: {}",
                    name,
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }

    /// One full-render attempt, then one minimal-line attempt
    fn write_with_fallback(&self, transport: &mut dyn Transport, entry: &LogEntry, style: RenderStyle) {
        let primary = catch_unwind(AssertUnwindSafe(|| transport.write(entry, style)));
        match primary {
            Ok(Ok(())) => {
                self.metrics.record_emitted();
                return;
            }
            Ok(Err(e)) => {
                internal_diagnostic(format_args!(
                    "[LOGGER ERROR] Transport '{}' failed ({}): {}",
                    transport.name(),
                    style.as_str(),
                    e
                ));
            }
            Err(panic_info) => {
                internal_diagnostic(format_args!(
                    "[LOGGER CRITICAL] Transport '{}' panicked ({}): {}",
                    transport.name(),
                    style.as_str(),
                    panic_message(panic_info.as_ref())
                ));
            }
        }

        match catch_unwind(AssertUnwindSafe(|| transport.write_minimal(entry))) {
            Ok(Ok(())) => {
                self.metrics.record_fallback();
            }
            _ => {
                self.metrics.record_dropped();
            }
        }
    }

    fn close_transport(&self) {
        let mut transport = self.transport.lock();
        let name = transport.name().to_string();
        match catch_unwind(AssertUnwindSafe(|| transport.close())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                internal_diagnostic(format_args!(
                    "[LOGGER ERROR] Transport '{}' close failed: {}",
                    name, e
                ));
            }
            Err(panic_info) => {
                internal_diagnostic(format_args!(
                    "[LOGGER CRITICAL] Transport '{}' panicked during close: {}",
                    name,
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }
}

/// Background thread that flushes on every tick until told to stop
struct FlushTimer {
    shutdown: Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl FlushTimer {
    fn spawn(inner: &Arc<LoggerInner>, interval: Duration) -> Result<Self> {
        let (shutdown, shutdown_rx) = bounded::<()>(1);
        let inner: Weak<LoggerInner> = Arc::downgrade(inner);

        let handle = thread::Builder::new()
            .name(FLUSH_TIMER_THREAD_NAME.to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => match inner.upgrade() {
                            Some(inner) => inner.flush(),
                            None => break,
                        },
                        recv(shutdown_rx) -> _ => break,
                    }
                }
            })
            .map_err(|e| LoggerError::construction(format!("failed to start flush timer: {}", e)))?;

        Ok(Self { shutdown, handle })
    }

    /// Signal the thread and wait for it; no tick runs after this returns
    fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.join() {
            internal_diagnostic(format_args!(
                "[LOGGER ERROR] Flush timer thread panicked: {}",
                panic_message(e.as_ref())
            ));
        }
    }
}

/// The buffering/flushing logger shared by all in-flight requests
pub struct Logger {
    inner: Arc<LoggerInner>,
    timer: Mutex<Option<FlushTimer>>,
}

impl Logger {
    /// Build a logger from `config`, validating its ranges.
    ///
    /// Fails only when the production flush timer cannot be started.
    /// Corrections made during validation are logged at `warn` through the
    /// new logger.
    pub fn new(config: LoggerConfig, transport: Box<dyn Transport>) -> Result<Self> {
        let ValidatedConfig { config, warnings } = config.validate();
        let logger = Self::from_validated(config, transport)?;
        logger.report_config_warnings(&warnings);
        Ok(logger)
    }

    /// Build from a config that has already been through validation.
    /// Reports nothing; the caller owns the warnings.
    pub(crate) fn from_validated(
        config: LoggerConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let buffered = config.environment.is_buffered();
        let interval = config.flush_interval;

        let inner = Arc::new(LoggerInner {
            buffer: Mutex::new(Vec::with_capacity(if buffered { config.buffer_size } else { 0 })),
            config,
            transport: Mutex::new(transport),
            destroyed: AtomicBool::new(false),
            metrics: LoggerMetrics::new(),
        });

        let timer = if buffered {
            Some(FlushTimer::spawn(&inner, interval)?)
        } else {
            None
        };

        Ok(Self {
            inner,
            timer: Mutex::new(timer),
        })
    }

    /// Degraded logger with hard-coded defaults (development, info).
    /// Cannot fail: it needs no timer.
    pub fn fallback(transport: Box<dyn Transport>) -> Self {
        let inner = Arc::new(LoggerInner {
            config: LoggerConfig::fallback(),
            transport: Mutex::new(transport),
            buffer: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
            metrics: LoggerMetrics::new(),
        });
        Self {
            inner,
            timer: Mutex::new(None),
        }
    }

    pub(crate) fn report_config_warnings(&self, warnings: &[ConfigWarning]) {
        for warning in warnings {
            self.warn(
                format!("Logger configuration corrected: {}", warning),
                Meta::new()
                    .with_field("operationType", "logger.config")
                    .with_field("field", warning.field)
                    .with_field("supplied", warning.supplied.as_str())
                    .with_field("applied", warning.applied.as_str()),
            );
        }
    }

    /// Log at `level`. Never fails and never panics.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        let inner = &self.inner;
        if inner.destroyed.load(Ordering::Acquire) {
            return;
        }
        if !should_emit(inner.config.level, level) {
            inner.metrics.record_filtered();
            return;
        }

        let message = message.into();
        let meta = meta.into().unwrap_or_default();
        if let Err(panic_info) =
            catch_unwind(AssertUnwindSafe(|| inner.dispatch(level, &message, &meta)))
        {
            inner.metrics.record_dropped();
            internal_diagnostic(format_args!(
                "[LOGGER CRITICAL] Log call panicked: {}",
                panic_message(panic_info.as_ref())
            ));
        }
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Debug, message, meta);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Info, message, meta);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Warn, message, meta);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Error, message, meta);
    }

    /// Fatal entries are flushed before this returns, whatever the buffer size
    #[inline]
    pub fn fatal(&self, message: impl Into<String>, meta: impl Into<Option<Meta>>) {
        self.log(LogLevel::Fatal, message, meta);
    }

    /// Drain the buffer now. Useful at the end of a serverless invocation.
    pub fn flush(&self) {
        if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| self.inner.flush())) {
            internal_diagnostic(format_args!(
                "[LOGGER CRITICAL] Flush panicked: {}",
                panic_message(panic_info.as_ref())
            ));
        }
    }

    /// Stop the timer, flush what is buffered, close the transport and make
    /// every later call a no-op. Safe to call more than once.
    pub fn destroy(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.stop();
        }

        {
            // Taking the buffer lock orders this against in-flight appends
            let _buffer = self.inner.buffer.lock();
            if self.inner.destroyed.swap(true, Ordering::AcqRel) {
                return;
            }
        }

        self.flush();
        self.inner.close_transport();
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Entries waiting for the next flush
    pub fn buffered_len(&self) -> usize {
        self.inner.buffer.lock().len()
    }

    pub fn has_flush_timer(&self) -> bool {
        self.timer.lock().is_some()
    }

    /// # Example
    ///
    /// ```
    /// use budget_logger::{Logger, LoggerConfig, MemoryTransport};
    ///
    /// let logger = Logger::new(LoggerConfig::development(), Box::new(MemoryTransport::new())).unwrap();
    /// logger.info("Dashboard loaded", None);
    ///
    /// assert_eq!(logger.metrics().emitted_count(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.inner.config)
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
/// ```
/// use budget_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .config(LoggerConfig::production().with_buffer_size(20))
///     .transport(MemoryTransport::new())
///     .build()
///     .unwrap();
/// assert!(logger.has_flush_timer());
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    transport: Option<Box<dyn Transport>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            transport: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Defaults to [`ConsoleTransport`](crate::transports::ConsoleTransport)
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn build(self) -> Result<Logger> {
        let transport = self
            .transport
            .unwrap_or_else(|| Box::new(crate::transports::ConsoleTransport::new()));
        Logger::new(self.config, transport)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Environment;
    use crate::transports::MemoryTransport;

    fn production(buffer_size: usize) -> LoggerConfig {
        LoggerConfig::production()
            .with_buffer_size(buffer_size)
            .with_flush_interval(Duration::from_secs(60))
    }

    #[test]
    fn test_builder_development_has_no_timer() {
        let logger = Logger::builder()
            .transport(MemoryTransport::new())
            .build()
            .unwrap();
        assert!(!logger.has_flush_timer());
        assert_eq!(logger.config().environment, Environment::Development);
    }

    #[test]
    fn test_builder_production_has_timer() {
        let logger = Logger::builder()
            .config(production(10))
            .transport(MemoryTransport::new())
            .build()
            .unwrap();
        assert!(logger.has_flush_timer());
        logger.destroy();
        assert!(!logger.has_flush_timer());
    }

    #[test]
    fn test_filtered_calls_are_counted() {
        let capture = MemoryTransport::new();
        let logger = Logger::new(
            LoggerConfig::development().with_level(LogLevel::Error),
            Box::new(capture.clone()),
        )
        .unwrap();

        logger.debug("hidden", None);
        logger.warn("hidden", None);
        logger.error("shown", None);

        assert_eq!(logger.metrics().filtered_count(), 2);
        assert_eq!(capture.len(), 1);
    }

    #[test]
    fn test_buffer_holds_until_threshold() {
        let capture = MemoryTransport::new();
        let logger = Logger::new(production(3), Box::new(capture.clone())).unwrap();

        logger.info("one", None);
        logger.info("two", None);
        assert_eq!(logger.buffered_len(), 2);
        assert!(capture.is_empty());

        logger.info("three", None);
        assert_eq!(logger.buffered_len(), 0);
        assert_eq!(capture.len(), 3);
    }

    #[test]
    fn test_explicit_flush() {
        let capture = MemoryTransport::new();
        let logger = Logger::new(production(50), Box::new(capture.clone())).unwrap();

        logger.warn("budget exceeded", None);
        logger.flush();

        assert_eq!(capture.len(), 1);
        assert_eq!(logger.metrics().flush_count(), 1);
        assert_eq!(capture.flush_count(), 1);
    }

    #[test]
    fn test_failed_write_falls_back_to_minimal_line() {
        let capture = MemoryTransport::new();
        capture.set_fail_writes(true);
        let logger = Logger::new(LoggerConfig::development(), Box::new(capture.clone())).unwrap();

        logger.error("could not load categories", None);

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].style, None);
        assert!(lines[0].line.ends_with("ERROR could not load categories"));
        assert_eq!(logger.metrics().fallback_count(), 1);
    }

    #[test]
    fn test_panicking_transport_is_contained() {
        let capture = MemoryTransport::new();
        capture.set_panic_on_write(true);
        let logger = Logger::new(production(1), Box::new(capture.clone())).unwrap();

        logger.info("still fine", None);

        assert_eq!(capture.len(), 1);
        assert_eq!(logger.metrics().fallback_count(), 1);
    }

    #[test]
    fn test_double_failure_drops_silently() {
        let capture = MemoryTransport::new();
        capture.set_fail_writes(true);
        capture.set_fail_minimal(true);
        let logger = Logger::new(LoggerConfig::development(), Box::new(capture.clone())).unwrap();

        logger.info("lost", None);

        assert!(capture.is_empty());
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_destroy_closes_transport_and_goes_inert() {
        let capture = MemoryTransport::new();
        let logger = Logger::new(production(50), Box::new(capture.clone())).unwrap();

        logger.info("pending", None);
        logger.destroy();
        logger.destroy();
        logger.info("ignored", None);

        assert!(capture.is_closed());
        assert!(logger.is_destroyed());
        assert_eq!(capture.len(), 1);
        assert_eq!(logger.buffered_len(), 0);
    }

    #[test]
    fn test_config_warnings_are_logged() {
        let capture = MemoryTransport::new();
        let _logger = Logger::new(
            LoggerConfig::development().with_buffer_size(0),
            Box::new(capture.clone()),
        )
        .unwrap();

        let lines = capture.texts();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Logger configuration corrected"));
        assert!(lines[0].contains("bufferSize"));
    }

    #[test]
    fn test_fallback_logger_defaults() {
        let logger = Logger::fallback(Box::new(MemoryTransport::new()));
        assert_eq!(logger.config().environment, Environment::Development);
        assert_eq!(logger.config().level, LogLevel::Info);
        assert!(!logger.has_flush_timer());
    }
}
