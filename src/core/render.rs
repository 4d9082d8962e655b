//! Rendering of log entries into output lines
//!
//! Provides the two rendering styles the logger core chooses between:
//! - Structured: one JSON object per line, the wire format for collectors
//! - Formatted: a scannable single line for interactive development
//!
//! and the minimal `timestamp level message` line used when either fails.

use super::error::{LoggerError, Result};
use super::log_entry::{escape_line_breaks, LogEntry};
use super::log_level::LogLevel;
use chrono::{Local, SecondsFormat};

/// Meta keys shown in formatted output, in display order
pub const IMPORTANT_META_KEYS: &[&str] = &[
    "duration",
    "statusCode",
    "error",
    "operationType",
    "method",
    "path",
];

/// Rendering style, chosen by the logger core per output strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderStyle {
    /// JSON object per line
    #[default]
    Structured,
    /// Human-readable text line
    Formatted,
}

impl RenderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStyle::Structured => "structured",
            RenderStyle::Formatted => "formatted",
        }
    }
}

/// Logical output stream for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Standard,
    Warn,
    Error,
}

impl OutputStream {
    pub fn for_level(level: LogLevel) -> Self {
        match level {
            LogLevel::Error | LogLevel::Fatal => OutputStream::Error,
            LogLevel::Warn => OutputStream::Warn,
            LogLevel::Debug | LogLevel::Info => OutputStream::Standard,
        }
    }
}

/// Serialize the full entry as a single JSON line
pub fn render_structured(entry: &LogEntry) -> Result<String> {
    Ok(serde_json::to_string(entry)?)
}

/// Human-readable line: local time, level, request id, message and the
/// important meta keys.
pub fn render_formatted(entry: &LogEntry, use_colors: bool) -> Result<String> {
    let timestamp = entry
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.3f");

    let mut line = format!(
        "[{}] {} [{}] {}",
        timestamp,
        level_label(entry.level, use_colors),
        escape_line_breaks(&entry.request_id),
        escape_line_breaks(&entry.message)
    );

    for key in IMPORTANT_META_KEYS {
        if let Some(value) = entry.meta.get(key) {
            let rendered = value.to_json().map_err(|err| {
                LoggerError::render(RenderStyle::Formatted.as_str(), err.to_string())
            })?;
            let text = match rendered {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            line.push_str(&format!(" {}={}", key, escape_line_breaks(&text)));
        }
    }

    Ok(line)
}

/// Render in the requested style
pub fn render(entry: &LogEntry, style: RenderStyle, use_colors: bool) -> Result<String> {
    match style {
        RenderStyle::Structured => render_structured(entry),
        RenderStyle::Formatted => render_formatted(entry, use_colors),
    }
}

/// Last-resort line. Cannot fail.
pub fn render_minimal(entry: &LogEntry) -> String {
    format!(
        "{} {} {}",
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        entry.level.to_str(),
        escape_line_breaks(&entry.message)
    )
}

#[cfg(feature = "console")]
fn level_label(level: LogLevel, use_colors: bool) -> String {
    use colored::Colorize;

    let label = format!("{:5}", level.to_str());
    if use_colors {
        label.color(level.color_code()).to_string()
    } else {
        label
    }
}

#[cfg(not(feature = "console"))]
fn level_label(level: LogLevel, _use_colors: bool) -> String {
    format!("{:5}", level.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Environment, Meta};

    fn entry(level: LogLevel, meta: Meta) -> LogEntry {
        LogEntry::new(
            level,
            "Fetched subscriptions",
            meta.with_request_id("req-1"),
            Environment::Development,
            "household-budget",
            "2.0.0",
        )
    }

    #[test]
    fn test_structured_is_one_json_line() {
        let line = render_structured(&entry(LogLevel::Info, Meta::new().with_field("count", 3)))
            .unwrap();
        assert!(!line.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], "Fetched subscriptions");
        assert_eq!(parsed["requestId"], "req-1");
        assert_eq!(parsed["meta"]["count"], 3);
    }

    #[test]
    fn test_formatted_shows_only_important_keys() {
        let meta = Meta::new()
            .with_field("method", "GET")
            .with_field("path", "/api/subscriptions")
            .with_field("statusCode", 200u16)
            .with_field("duration", 14)
            .with_field("rows", 99);
        let line = render_formatted(&entry(LogLevel::Info, meta), false).unwrap();

        assert!(line.contains("INFO "));
        assert!(line.contains("[req-1]"));
        assert!(line.contains("Fetched subscriptions"));
        assert!(line.contains("method=GET"));
        assert!(line.contains("path=/api/subscriptions"));
        assert!(line.contains("statusCode=200"));
        assert!(line.contains("duration=14"));
        assert!(!line.contains("rows"));
    }

    #[test]
    fn test_formatted_escapes_multiline_values() {
        let meta = Meta::new()
            .with_field("error", "db error\nERROR forged entry")
            .with_field("path", "/api/budgets\r\n");
        let mut e = entry(LogLevel::Error, meta);
        e.request_id = "req\nFATAL forged".to_string();

        let line = render_formatted(&e, false).unwrap();
        assert_eq!(line.lines().count(), 1);
        assert!(!line.contains('\r'));
        assert!(line.contains("error=db error\\nERROR forged entry"));
        assert!(line.contains("[req\\nFATAL forged]"));
    }

    #[test]
    fn test_minimal_line() {
        let line = render_minimal(&entry(LogLevel::Error, Meta::new()));
        assert!(line.ends_with("ERROR Fetched subscriptions"));
        assert!(line.contains('T'));
    }

    #[test]
    fn test_stream_routing() {
        assert_eq!(OutputStream::for_level(LogLevel::Debug), OutputStream::Standard);
        assert_eq!(OutputStream::for_level(LogLevel::Info), OutputStream::Standard);
        assert_eq!(OutputStream::for_level(LogLevel::Warn), OutputStream::Warn);
        assert_eq!(OutputStream::for_level(LogLevel::Error), OutputStream::Error);
        assert_eq!(OutputStream::for_level(LogLevel::Fatal), OutputStream::Error);
    }
}
