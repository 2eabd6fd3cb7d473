//! Typed client for the Roblox Open Cloud endpoints the runner uses.
//!
//! Four operations, all authenticated with `x-api-key`:
//! - publish a place version (raw rbxl upload)
//! - start a Luau execution session task
//! - read a task back while polling
//! - fetch the task's structured logs
//!
//! Every non-2xx answer becomes [`Error::Api`] with the status and body
//! preserved. The client never retries; the caller decides what a failure
//! means for the run.

pub mod error;
pub mod model;
pub mod transport;

pub use error::Error;

use crate::client::error::{
    GETTING_EXECUTION_TASK, GETTING_EXECUTION_TASK_LOGS, PUBLISHING_PLACE,
    STARTING_EXECUTION_TASK,
};
use crate::client::model::{
    ExecutionTask, ExecutionTaskLogs, PublishResponse, StartExecutionRequest,
};
use crate::client::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const BASE_URL: &str = "https://apis.roblox.com";

/// Open Cloud API client.
///
/// Construction:
/// - [`OpenCloudClient::new`] for production (reqwest-backed transport)
/// - [`OpenCloudClient::with_transport`] to substitute the HTTP layer in tests
pub struct OpenCloudClient {
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl OpenCloudClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_transport(api_key, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            transport,
        }
    }

    /// Upload a built place file as a new saved version.
    ///
    /// POST `universes/v1/{universe}/places/{place}/versions?versionType=Saved`
    /// with the raw file bytes as the body.
    pub async fn publish_place(
        &self,
        universe_id: u64,
        place_id: u64,
        place_file: &Path,
    ) -> Result<PublishResponse, Error> {
        let bytes = std::fs::read(place_file).map_err(|source| Error::PlaceFile {
            path: place_file.to_path_buf(),
            source,
        })?;

        debug!(
            universe_id,
            place_id,
            size = bytes.len(),
            "publishing place version"
        );

        let url = format!(
            "{}/universes/v1/{}/places/{}/versions?versionType=Saved",
            BASE_URL, universe_id, place_id
        );
        let request = self
            .request(ApiRequest::post(url))
            .header("content-type", "application/octet-stream")
            .body(bytes);

        let response = self.transport.send(request).await?;
        let published: PublishResponse = decode(PUBLISHING_PLACE, &response)?;

        debug!(version = published.version_number, "place version published");
        Ok(published)
    }

    /// Start a Luau execution session task against a published version.
    ///
    /// The task runs `script` inside the place; its terminal state reports
    /// whether the script finished or raised.
    pub async fn start_execution_task(
        &self,
        universe_id: u64,
        place_id: u64,
        version_number: u64,
        script: &str,
    ) -> Result<ExecutionTask, Error> {
        debug!(
            universe_id,
            place_id, version_number, "starting execution task"
        );

        let url = format!(
            "{}/cloud/v2/universes/{}/places/{}/versions/{}/luau-execution-session-tasks",
            BASE_URL, universe_id, place_id, version_number
        );
        let body = StartExecutionRequest {
            script: script.to_string(),
            timeout: None,
        };
        let body = serde_json::to_vec(&body).map_err(|source| Error::Encode {
            action: STARTING_EXECUTION_TASK,
            source,
        })?;

        let request = self
            .request(ApiRequest::post(url))
            .header("content-type", "application/json")
            .body(body);

        let response = self.transport.send(request).await?;
        let task: ExecutionTask = decode(STARTING_EXECUTION_TASK, &response)?;

        debug!(path = %task.path, state = %task.state, "execution task created");
        Ok(task)
    }

    /// Read a task resource back by its `path`.
    pub async fn get_execution_task(&self, task_path: &str) -> Result<ExecutionTask, Error> {
        let url = format!("{}/cloud/v2/{}", BASE_URL, task_path);
        let request = self.request(ApiRequest::get(url));

        let response = self.transport.send(request).await?;
        decode(GETTING_EXECUTION_TASK, &response)
    }

    /// Fetch structured logs for a task by its `path`.
    pub async fn get_execution_task_logs(
        &self,
        task_path: &str,
    ) -> Result<ExecutionTaskLogs, Error> {
        let url = format!("{}/cloud/v2/{}/logs?view=STRUCTURED", BASE_URL, task_path);
        let request = self.request(ApiRequest::get(url));

        let response = self.transport.send(request).await?;
        decode(GETTING_EXECUTION_TASK_LOGS, &response)
    }

    fn request(&self, request: ApiRequest) -> ApiRequest {
        request.header("x-api-key", &self.api_key)
    }
}

/// Shared status check + JSON decode for every operation.
fn decode<T: DeserializeOwned>(action: &'static str, response: &ApiResponse) -> Result<T, Error> {
    if !response.is_success() {
        return Err(Error::Api {
            status: response.status,
            action,
            body: response.body.clone(),
        });
    }

    serde_json::from_str(&response.body).map_err(|source| Error::Decode { action, source })
}
