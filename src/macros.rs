//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They accept a
//! [`Logger`](crate::Logger) or a [`RequestLogger`](crate::RequestLogger).
//!
//! # Examples
//!
//! ```
//! use budget_logger::prelude::*;
//! use budget_logger::info;
//!
//! let logger = Logger::builder().transport(MemoryTransport::new()).build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Budget service started");
//!
//! // With format arguments
//! let month = "2024-03";
//! info!(logger, "Closing month {}", month);
//!
//! // With metadata
//! let meta = Meta::new().with_field("categoryId", 7);
//! info!(logger, meta: meta, "Category {} renamed", 7);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use budget_logger::prelude::*;
/// # let logger = Logger::builder().transport(MemoryTransport::new()).build().unwrap();
/// use budget_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Import failed on row {}", 12);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, meta: $meta:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $meta)
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), None)
    };
}

/// Log a debug-level message.
///
/// ```
/// # use budget_logger::prelude::*;
/// # let logger = Logger::builder().transport(MemoryTransport::new()).build().unwrap();
/// use budget_logger::debug;
/// debug!(logger, "Recomputed {} balances", 3);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use budget_logger::prelude::*;
/// # let logger = Logger::builder().transport(MemoryTransport::new()).build().unwrap();
/// use budget_logger::error;
/// error!(logger, "Failed to load transactions for {}", "2024-03");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. Flushes immediately in production.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger, LoggerConfig, Meta};
    use crate::request::RequestLogger;
    use crate::transports::MemoryTransport;
    use std::sync::Arc;

    fn capture_logger() -> (Logger, MemoryTransport) {
        let capture = MemoryTransport::new();
        let logger = Logger::new(
            LoggerConfig::development().with_level(LogLevel::Debug),
            Box::new(capture.clone()),
        )
        .unwrap();
        (logger, capture)
    }

    #[test]
    fn test_log_macro() {
        let (logger, capture) = capture_logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        assert_eq!(capture.len(), 2);
        assert!(capture.texts()[1].contains("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, capture) = capture_logger();
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        fatal!(logger, "Critical failure: {}", "ledger");

        let levels: Vec<LogLevel> = capture.lines().iter().map(|l| l.level).collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }

    #[test]
    fn test_meta_arm() {
        let (logger, capture) = capture_logger();
        info!(logger, meta: Meta::new().with_field("operationType", "auth.signin"), "Signed in after {} tries", 2);
        let text = &capture.texts()[0];
        assert!(text.contains("Signed in after 2 tries"));
        assert!(text.contains("operationType=auth.signin"));
    }

    #[test]
    fn test_macros_accept_request_logger() {
        let capture = MemoryTransport::new();
        let logger = Arc::new(
            Logger::new(
                LoggerConfig::production().with_buffer_size(1),
                Box::new(capture.clone()),
            )
            .unwrap(),
        );
        let request = RequestLogger::new(logger, "req-macro");
        warn!(request, "Budget {} exceeded", "groceries");

        let entry = &capture.structured_entries()[0];
        assert_eq!(entry.request_id, "req-macro");
        assert_eq!(entry.message, "Budget groceries exceeded");
    }
}
