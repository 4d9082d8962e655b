//! JSON-lines file transport
//!
//! Writes structured entries as one JSON object per line (JSONL), the format
//! log shippers such as Vector, Fluent Bit or Loki's promtail pick up.
//! Formatted entries are written as plain text lines.

use crate::core::{render, LogEntry, LoggerError, RenderStyle, Result, Transport};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonFileTransport {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl JsonFileTransport {
    /// Open (or create) the file for appending
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| {
                LoggerError::io_operation(format!("opening log file '{}'", path.display()), err)
            })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| LoggerError::TransportClosed("json_file".to_string()))
    }
}

impl Transport for JsonFileTransport {
    fn write(&mut self, entry: &LogEntry, style: RenderStyle) -> Result<()> {
        let line = render::render(entry, style, false)?;
        writeln!(self.writer()?, "{}", line)?;
        Ok(())
    }

    fn write_minimal(&mut self, entry: &LogEntry) -> Result<()> {
        let line = render::render_minimal(entry);
        writeln!(self.writer()?, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "json_file"
    }
}
