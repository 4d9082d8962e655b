//! Core logger types and traits

pub mod config;
pub mod error;
pub mod factory;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod meta;
pub mod metrics;
pub mod render;
pub mod sanitizer;
pub mod transport;

pub use config::{
    ConfigSource, ConfigWarning, EnvBag, Environment, LoggerConfig, RawLoggerConfig,
    ValidatedConfig,
};
pub use error::{LoggerError, Result};
pub use factory::LoggerFactory;
pub use log_entry::{generate_request_id, LogEntry};
pub use log_level::{severity_of_name, should_emit, LogLevel};
pub use logger::{Logger, LoggerBuilder};
pub use meta::{Meta, MetaValue, SharedValue, REQUEST_ID_KEY};
pub use metrics::LoggerMetrics;
pub use render::{OutputStream, RenderStyle};
pub use sanitizer::{sanitize, CIRCULAR_REFERENCE, REDACTED};
pub use transport::Transport;
