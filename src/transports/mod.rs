//! Transport implementations

pub mod console;
pub mod json_file;
pub mod memory;

pub use console::ConsoleTransport;
pub use json_file::JsonFileTransport;
pub use memory::{CapturedLine, MemoryTransport};

pub use crate::core::Transport;
