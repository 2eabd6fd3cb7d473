//! Wire types for the Open Cloud endpoints the runner touches.
//!
//! Field and variant names mirror the JSON the API speaks. Fields the caller
//! never reads are still modelled so payloads round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response to a place publish: the new saved version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub version_number: u64,
}

/// Body for starting a Luau execution session task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExecutionRequest {
    pub script: String,

    /// Task timeout as a duration string (e.g. "300s").
    /// Omitted from the payload when unset; the server applies its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// A Luau execution session task resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTask {
    /// Resource path, e.g.
    /// `universes/1/places/2/versions/3/luau-execution-session-tasks/abc`.
    /// State and log reads are addressed with this.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,

    /// User the task runs as. Informational only.
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub state: ExecutionState,

    /// Echo of the submitted script.
    #[serde(default)]
    pub script: String,
}

/// Remote lifecycle state of an execution task.
///
/// `Queued` and `Processing` are the in-progress states; the rest are
/// terminal, and only `Complete` counts as a passing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,

    #[serde(rename = "QUEUED")]
    Queued,

    #[serde(rename = "PROCESSING")]
    Processing,

    #[serde(rename = "CANCELLED")]
    Cancelled,

    #[serde(rename = "COMPLETE")]
    Complete,

    #[serde(rename = "FAILED")]
    Failed,
}

impl ExecutionState {
    /// True while the remote task is still queued or running.
    pub fn is_in_progress(self) -> bool {
        matches!(self, ExecutionState::Queued | ExecutionState::Processing)
    }

    /// The wire name, also used when logging states.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            ExecutionState::Unspecified => "STATE_UNSPECIFIED",
            ExecutionState::Queued => "QUEUED",
            ExecutionState::Processing => "PROCESSING",
            ExecutionState::Cancelled => "CANCELLED",
            ExecutionState::Complete => "COMPLETE",
            ExecutionState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Envelope returned by the structured logs endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionTaskLogs {
    #[serde(default)]
    pub luau_execution_session_task_logs: Vec<SessionTaskLogs>,

    /// Pagination cursor. A task that just finished fits in one page, so
    /// this is modelled but never followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Log entries for one session task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTaskLogs {
    #[serde(default)]
    pub path: String,

    /// Flat message lines. Superseded by `structured_messages` under
    /// `view=STRUCTURED`.
    #[serde(default)]
    pub messages: Option<Vec<String>>,

    #[serde(default)]
    pub structured_messages: Option<Vec<StructuredMessage>>,
}

/// One log message with its remote severity tag and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMessage {
    #[serde(default)]
    pub message: String,

    #[serde(default = "epoch")]
    pub create_time: DateTime<Utc>,

    #[serde(default)]
    pub message_type: MessageType,
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// Severity tag the service attaches to each structured message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[default]
    #[serde(rename = "MESSAGE_TYPE_UNSPECIFIED")]
    Unspecified,

    #[serde(rename = "OUTPUT")]
    Output,

    #[serde(rename = "INFO")]
    Info,

    #[serde(rename = "WARNING")]
    Warning,

    #[serde(rename = "ERROR")]
    Error,
}
