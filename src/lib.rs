//! # Budget Logger
//!
//! Structured logging pipeline for the household-budget web application.
//!
//! ## Features
//!
//! - **Environment aware**: immediate human-readable lines in development,
//!   buffered JSON lines in production
//! - **Never throws**: transport failures degrade to a minimal line and are
//!   counted, never surfaced to the request handler
//! - **Redaction**: metadata keys naming credentials are replaced before
//!   anything is rendered
//! - **Request scoped**: [`RequestLogger`] stamps a correlation id on every
//!   entry of one request
//!
//! ## Example
//!
//! ```
//! use budget_logger::{LoggerConfig, LoggerFactory, Meta, MemoryTransport};
//!
//! let capture = MemoryTransport::new();
//! let sink = capture.clone();
//! let factory = LoggerFactory::new()
//!     .with_transport_builder(move |_| Ok(Box::new(sink.clone())));
//!
//! let logger = factory.get_instance(Some(LoggerConfig::development())).unwrap();
//! logger.info("Transaction saved", Meta::new().with_field("amount", 42.5));
//!
//! assert_eq!(capture.len(), 1);
//! factory.shutdown();
//! ```

pub mod core;
pub mod macros;
pub mod request;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        ConfigSource, EnvBag, Environment, LogEntry, LogLevel, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerFactory, LoggerMetrics, Meta, MetaValue, RenderStyle,
        Result, Transport,
    };
    pub use crate::request::RequestLogger;
    pub use crate::transports::{ConsoleTransport, JsonFileTransport, MemoryTransport};
}

pub use crate::core::{
    generate_request_id, sanitize, ConfigSource, ConfigWarning, EnvBag, Environment, LogEntry,
    LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerFactory, LoggerMetrics,
    Meta, MetaValue, OutputStream, RawLoggerConfig, RenderStyle, Result, SharedValue, Transport,
    ValidatedConfig, REQUEST_ID_KEY,
};
pub use request::RequestLogger;
pub use transports::{CapturedLine, ConsoleTransport, JsonFileTransport, MemoryTransport};
