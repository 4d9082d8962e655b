//! Error types for the logging pipeline
//!
//! Only [`LoggerError::ConfigurationRequired`] ever reaches application code.
//! Every other variant is produced and recovered inside the pipeline.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// `get_instance` was called before any configuration was supplied
    #[error("Logger has not been configured: pass a configuration to the first get_instance call")]
    ConfigurationRequired,

    /// The logger core could not be built from a valid configuration
    #[error("Logger construction failed: {message}")]
    Construction { message: String },

    /// IO error with context
    #[error("IO error while {operation}: {source}")]
    IoOperation {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Rendering an entry failed
    #[error("Render error ({style}): {message}")]
    RenderError { style: String, message: String },

    /// Metadata contains a cycle or cannot be read
    #[error("Circular or unreadable metadata value")]
    CircularReference,

    /// A transport refused or failed to write
    #[error("Transport '{transport}' failed: {message}")]
    WriterError { transport: String, message: String },

    /// Transport already closed
    #[error("Transport '{0}' is closed")]
    TransportClosed(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a construction error
    pub fn construction(message: impl Into<String>) -> Self {
        LoggerError::Construction {
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(operation: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            source,
        }
    }

    /// Create a render error
    pub fn render(style: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::RenderError {
            style: style.into(),
            message: message.into(),
        }
    }

    /// Create a writer error for the named transport
    pub fn writer_failed(transport: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::WriterError {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
