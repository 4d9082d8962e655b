//! Console transport implementation

use crate::core::{render, LogEntry, OutputStream, RenderStyle, Result, Transport};
use std::io::Write;

pub struct ConsoleTransport {
    use_colors: bool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn emit(stream: OutputStream, line: &str) -> Result<()> {
        // Warnings share stderr with errors, everything else goes to stdout
        match stream {
            OutputStream::Error | OutputStream::Warn => {
                writeln!(std::io::stderr().lock(), "{}", line)?;
            }
            OutputStream::Standard => {
                writeln!(std::io::stdout().lock(), "{}", line)?;
            }
        }
        Ok(())
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConsoleTransport {
    fn write(&mut self, entry: &LogEntry, style: RenderStyle) -> Result<()> {
        let line = render::render(entry, style, self.use_colors)?;
        Self::emit(OutputStream::for_level(entry.level), &line)
    }

    fn write_minimal(&mut self, entry: &LogEntry) -> Result<()> {
        Self::emit(
            OutputStream::for_level(entry.level),
            &render::render_minimal(entry),
        )
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
