//! Log entry structure

use super::config::Environment;
use super::log_level::LogLevel;
use super::meta::{Meta, MetaValue, REQUEST_ID_KEY};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stand-in for an empty message
pub const EMPTY_MESSAGE: &str = "(empty message)";

/// Escape line breaks and tabs so caller text cannot split or forge a line
pub(crate) fn escape_line_breaks(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Generate a request correlation id: 128 random bits as 32 hex characters
pub fn generate_request_id() -> String {
    let mut rng = rand::thread_rng();
    format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub request_id: String,
    pub environment: Environment,
    pub service: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
}

impl LogEntry {
    fn sanitize_message(message: &str) -> String {
        if message.trim().is_empty() {
            return EMPTY_MESSAGE.to_string();
        }
        escape_line_breaks(message)
    }

    /// Build an entry stamped with the current time.
    ///
    /// A non-empty string under `requestId` in `meta` becomes the entry's
    /// request id (line breaks escaped) and is removed from the metadata;
    /// otherwise a fresh id is generated.
    pub fn new(
        level: LogLevel,
        message: &str,
        mut meta: Meta,
        environment: Environment,
        service: &str,
        version: &str,
    ) -> Self {
        let request_id = match meta.remove(REQUEST_ID_KEY) {
            Some(MetaValue::String(id)) if !id.is_empty() => escape_line_breaks(&id),
            Some(other) if !matches!(other, MetaValue::Null | MetaValue::String(_)) => {
                escape_line_breaks(&other.to_string())
            }
            _ => generate_request_id(),
        };

        Self {
            timestamp: Utc::now(),
            level,
            message: Self::sanitize_message(message),
            request_id,
            environment,
            service: service.to_string(),
            version: version.to_string(),
            meta,
        }
    }
}
