//! Severity mapping and line shaping for remote task logs.

use crate::client::model::MessageType;
use chrono::{DateTime, Utc};

/// Local severity for a remote log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Information,
    Warning,
    Error,
}

/// Map the service's message tag onto a local level.
///
/// `Output` is what `print` produces, so it lands at the same level as an
/// untagged message. `Info` is engine chatter and stays quieter.
pub fn level_for(message_type: MessageType) -> LogLevel {
    match message_type {
        MessageType::Unspecified => LogLevel::Information,
        MessageType::Output => LogLevel::Information,
        MessageType::Info => LogLevel::Trace,
        MessageType::Warning => LogLevel::Warning,
        MessageType::Error => LogLevel::Error,
    }
}

/// One renderable line from the remote task.
///
/// Multi-line remote messages are split before they get here; `text` never
/// contains a newline.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLogLine {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl TaskLogLine {
    /// Render as `[HH:MM:SS] text`.
    pub fn format(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}
