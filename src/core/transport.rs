//! Transport trait for log output destinations

use super::error::Result;
use super::log_entry::LogEntry;
use super::render::{render_minimal, RenderStyle};
use std::io::Write;

/// A sink that turns entries into output lines.
///
/// The logger core picks the [`RenderStyle`]; transports only decide where
/// the line goes. Errors are returned to the core, which falls back to
/// [`Transport::write_minimal`] and never lets them reach application code.
pub trait Transport: Send {
    /// Render and write one entry
    fn write(&mut self, entry: &LogEntry, style: RenderStyle) -> Result<()>;

    /// Write the minimal `timestamp level message` line.
    ///
    /// Called once per entry after `write` failed. The default goes straight
    /// to stderr.
    fn write_minimal(&mut self, entry: &LogEntry) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", render_minimal(entry))?;
        Ok(())
    }

    /// Push buffered bytes to the underlying output
    fn flush(&mut self) -> Result<()>;

    /// Release the output; later writes may fail
    fn close(&mut self) -> Result<()> {
        self.flush()
    }

    fn name(&self) -> &str;
}
