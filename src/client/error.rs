//! Open Cloud client errors.

use crate::client::transport::TransportError;
use std::path::PathBuf;

/// Action labels used in API error messages, one per client operation.
/// These strings are stable; tests and scripts match on them.
pub const PUBLISHING_PLACE: &str = "publishing place";
pub const STARTING_EXECUTION_TASK: &str = "starting execution task";
pub const GETTING_EXECUTION_TASK: &str = "getting execution task";
pub const GETTING_EXECUTION_TASK_LOGS: &str = "getting execution task logs";

/// Errors produced by [`OpenCloudClient`](crate::client::OpenCloudClient)
/// operations. None of these are retried; the caller decides what a failure
/// means for the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a non-2xx status.
    #[error("Got HTTP {status} for {action}: {body}")]
    Api {
        status: u16,
        action: &'static str,
        body: String,
    },

    /// The API answered 2xx but the body did not decode.
    #[error("failed to decode response while {action}: {source}")]
    Decode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request body did not serialize.
    #[error("failed to encode request while {action}: {source}")]
    Encode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The place file could not be read before upload.
    #[error("failed to read place file {path:?}: {source}")]
    PlaceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
