// ── Drive event ──

use serde::{Deserialize, Serialize};

/// Operator annotation published once per submission. Never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveEvent {
    pub timestamp_ms: u64,
    pub message: String,
    pub tags: Vec<String>,
}

impl DriveEvent {
    pub fn new(timestamp_ms: u64, message: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            timestamp_ms,
            message: message.into(),
            tags,
        }
    }
}
