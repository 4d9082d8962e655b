//! In-memory transport
//!
//! Captures rendered lines instead of printing them. Clones share the same
//! capture buffer, so a test (or a health endpoint) can keep one handle while
//! the logger owns another. Failure switches let callers exercise the
//! fallback paths of the logger core.

use crate::core::{
    render, LogEntry, LogLevel, LoggerError, OutputStream, RenderStyle, Result, Transport,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One captured output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub level: LogLevel,
    pub stream: OutputStream,
    /// `None` for the minimal fallback line
    pub style: Option<RenderStyle>,
    pub line: String,
}

#[derive(Debug, Default)]
struct Shared {
    lines: Mutex<Vec<CapturedLine>>,
    fail_writes: AtomicBool,
    fail_minimal: AtomicBool,
    panic_on_write: AtomicBool,
    closed: AtomicBool,
    flushes: Mutex<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, oldest first
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.shared.lines.lock().clone()
    }

    /// Captured line texts, oldest first
    pub fn texts(&self) -> Vec<String> {
        self.shared
            .lines
            .lock()
            .iter()
            .map(|captured| captured.line.clone())
            .collect()
    }

    /// Parse every structured line back into an entry
    pub fn structured_entries(&self) -> Vec<LogEntry> {
        self.shared
            .lines
            .lock()
            .iter()
            .filter(|captured| captured.style == Some(RenderStyle::Structured))
            .filter_map(|captured| serde_json::from_str(&captured.line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shared.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.shared.lines.lock().clear();
    }

    /// Make `write` return an error
    pub fn set_fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `write_minimal` return an error
    pub fn set_fail_minimal(&self, fail: bool) {
        self.shared.fail_minimal.store(fail, Ordering::SeqCst);
    }

    /// Make `write` panic
    pub fn set_panic_on_write(&self, panic: bool) {
        self.shared.panic_on_write.store(panic, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn flush_count(&self) -> usize {
        *self.shared.flushes.lock()
    }

    fn push(&self, entry: &LogEntry, style: Option<RenderStyle>, line: String) {
        self.shared.lines.lock().push(CapturedLine {
            level: entry.level,
            stream: OutputStream::for_level(entry.level),
            style,
            line,
        });
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, entry: &LogEntry, style: RenderStyle) -> Result<()> {
        if self.shared.panic_on_write.load(Ordering::SeqCst) {
            panic!("memory transport asked to panic");
        }
        if self.shared.fail_writes.load(Ordering::SeqCst) {
            return Err(LoggerError::writer_failed("memory", "write failure requested"));
        }
        let line = render::render(entry, style, false)?;
        self.push(entry, Some(style), line);
        Ok(())
    }

    fn write_minimal(&mut self, entry: &LogEntry) -> Result<()> {
        if self.shared.fail_minimal.load(Ordering::SeqCst) {
            return Err(LoggerError::writer_failed("memory", "minimal write failure requested"));
        }
        self.push(entry, None, render::render_minimal(entry));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        *self.shared.flushes.lock() += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.shared.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Environment, Meta};

    fn entry(level: LogLevel) -> LogEntry {
        LogEntry::new(
            level,
            "Monthly balance",
            Meta::new(),
            Environment::Production,
            "household-budget",
            "1.0.0",
        )
    }

    #[test]
    fn test_clones_share_capture() {
        let observer = MemoryTransport::new();
        let mut transport = observer.clone();

        transport.write(&entry(LogLevel::Error), RenderStyle::Structured).unwrap();

        let lines = observer.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].stream, OutputStream::Error);
        assert_eq!(observer.structured_entries()[0].message, "Monthly balance");
    }

    #[test]
    fn test_failure_switches() {
        let observer = MemoryTransport::new();
        let mut transport = observer.clone();

        observer.set_fail_writes(true);
        assert!(transport.write(&entry(LogLevel::Info), RenderStyle::Structured).is_err());
        assert!(transport.write_minimal(&entry(LogLevel::Info)).is_ok());

        observer.set_fail_minimal(true);
        assert!(transport.write_minimal(&entry(LogLevel::Info)).is_err());

        assert_eq!(observer.len(), 1);
        assert_eq!(observer.lines()[0].style, None);
    }
}
