use crate::client::model::ExecutionState;
use crate::client::{Error, OpenCloudClient};
use crate::execution::logs::{level_for, TaskLogLine};
use crate::execution::sink::LogSink;
use crate::scripts;

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Knobs for a remote run.
///
/// Defaults match production behaviour; tests shrink the poll interval and
/// point `script_file` wherever they need.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Delay between task state reads.
    pub poll_interval: Duration,

    /// Replace the embedded task script with the contents of this file.
    pub script_file: Option<PathBuf>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            script_file: None,
        }
    }
}

/// Drives one place build through the publish → execute → poll → report
/// cycle and collapses the outcome to pass/fail.
pub struct CloudExecution {
    client: OpenCloudClient,
    universe_id: u64,
    place_id: u64,
    options: ExecutionOptions,
}

impl CloudExecution {
    pub fn new(
        api_key: impl Into<String>,
        universe_id: u64,
        place_id: u64,
        options: ExecutionOptions,
    ) -> Self {
        Self::with_client(OpenCloudClient::new(api_key), universe_id, place_id, options)
    }

    pub fn with_client(
        client: OpenCloudClient,
        universe_id: u64,
        place_id: u64,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            client,
            universe_id,
            place_id,
            options,
        }
    }

    /// Publish `place_file` and run the test task against it.
    ///
    /// Returns true only when the remote task ends in `COMPLETE`. Every
    /// failure along the way is logged and collapses to false, so the caller
    /// never has to reason about a partial run.
    pub async fn run(&self, place_file: &Path, sink: &mut dyn LogSink) -> bool {
        // Resolve the script first: a bad override should fail the run
        // before anything is published.
        let script = match self.load_script() {
            Ok(script) => script,
            Err(e) => {
                error!("{:#}", e);
                return false;
            }
        };

        match self.run_inner(place_file, &script, sink).await {
            Ok(passed) => passed,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    async fn run_inner(
        &self,
        place_file: &Path,
        script: &str,
        sink: &mut dyn LogSink,
    ) -> Result<bool, Error> {
        let published = self
            .client
            .publish_place(self.universe_id, self.place_id, place_file)
            .await?;
        info!(
            version = published.version_number,
            "published place version"
        );

        let mut task = self
            .client
            .start_execution_task(
                self.universe_id,
                self.place_id,
                published.version_number,
                script,
            )
            .await?;
        info!(path = %task.path, "started execution task");

        loop {
            task = self.client.get_execution_task(&task.path).await?;
            if !task.state.is_in_progress() {
                break;
            }
            debug!(state = %task.state, "execution task still in progress");
            tokio::time::sleep(self.options.poll_interval).await;
        }
        info!(state = %task.state, "execution task finished");

        let logs = self.client.get_execution_task_logs(&task.path).await?;
        for session in &logs.luau_execution_session_task_logs {
            let Some(messages) = &session.structured_messages else {
                continue;
            };
            for message in messages {
                let level = level_for(message.message_type);
                for text in message.message.split('\n') {
                    sink.emit(TaskLogLine {
                        level,
                        timestamp: message.create_time,
                        text: text.to_string(),
                    });
                }
            }
        }

        Ok(task.state == ExecutionState::Complete)
    }

    fn load_script(&self) -> anyhow::Result<String> {
        match &self.options.script_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read task script {:?}", path)),
            None => Ok(scripts::run_tests_script().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::FakeTransport;
    use crate::execution::logs::LogLevel;
    use crate::execution::sink::CollectingSink;
    use std::sync::Arc;

    const PUBLISH_URL: &str =
        "https://apis.roblox.com/universes/v1/9111/places/2431/versions?versionType=Saved";
    const START_URL: &str = "https://apis.roblox.com/cloud/v2/universes/9111/places/2431/versions/789/luau-execution-session-tasks";
    const TASK_PATH: &str =
        "universes/9111/places/2431/versions/789/luau-execution-session-tasks/task-1";
    const TASK_URL: &str = "https://apis.roblox.com/cloud/v2/universes/9111/places/2431/versions/789/luau-execution-session-tasks/task-1";
    const LOGS_URL: &str = "https://apis.roblox.com/cloud/v2/universes/9111/places/2431/versions/789/luau-execution-session-tasks/task-1/logs?view=STRUCTURED";

    const EMPTY_LOGS: &str = r#"{"luauExecutionSessionTaskLogs":[{"structuredMessages":[]}]}"#;

    fn task_body(state: &str) -> String {
        format!(r#"{{"path":"{}","state":"{}"}}"#, TASK_PATH, state)
    }

    fn options() -> ExecutionOptions {
        ExecutionOptions {
            poll_interval: Duration::from_millis(1),
            script_file: None,
        }
    }

    fn execution(transport: Arc<FakeTransport>) -> CloudExecution {
        CloudExecution::with_client(
            OpenCloudClient::with_transport("test-key", transport),
            9111,
            2431,
            options(),
        )
    }

    fn temp_place_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("place.rbxl");
        std::fs::write(&path, b"<rbxl bytes>").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn completed_task_reports_success() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("COMPLETE"))
                .respond(LOGS_URL, 200, EMPTY_LOGS),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport).run(&place, &mut sink).await;
        assert!(passed);
    }

    #[tokio::test]
    async fn failed_task_reports_failure() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("FAILED"))
                .respond(LOGS_URL, 200, EMPTY_LOGS),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport).run(&place, &mut sink).await;
        assert!(!passed);
    }

    #[tokio::test]
    async fn cancelled_task_reports_failure() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("CANCELLED"))
                .respond(LOGS_URL, 200, EMPTY_LOGS),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport).run(&place, &mut sink).await;
        assert!(!passed);
    }

    #[tokio::test]
    async fn publish_failure_stops_the_run() {
        let transport = Arc::new(FakeTransport::new().respond(PUBLISH_URL, 401, "{}"));
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport.clone()).run(&place, &mut sink).await;

        assert!(!passed);
        assert_eq!(transport.requested_urls(), vec![PUBLISH_URL.to_string()]);
    }

    #[tokio::test]
    async fn state_read_failure_mid_poll_fails_the_run() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 503, "unavailable"),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport.clone()).run(&place, &mut sink).await;

        assert!(!passed);
        assert_eq!(
            transport.requested_urls(),
            vec![
                PUBLISH_URL.to_string(),
                START_URL.to_string(),
                TASK_URL.to_string(),
                TASK_URL.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn logs_failure_after_completion_fails_the_run() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("COMPLETE"))
                .respond(LOGS_URL, 500, "oops"),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport.clone()).run(&place, &mut sink).await;

        // The task finished COMPLETE, but an unreadable log page still
        // fails the run and emits nothing.
        assert!(!passed);
        assert!(sink.lines().is_empty());
        assert_eq!(
            transport.requested_urls().last().map(String::as_str),
            Some(LOGS_URL)
        );
    }

    #[tokio::test]
    async fn transport_failure_fails_the_run() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .fail(START_URL, "connection reset by peer"),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport.clone()).run(&place, &mut sink).await;

        assert!(!passed);
        assert_eq!(
            transport.requested_urls(),
            vec![PUBLISH_URL.to_string(), START_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn polling_stops_at_the_first_terminal_state() {
        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("COMPLETE"))
                .respond(LOGS_URL, 200, EMPTY_LOGS),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution(transport.clone()).run(&place, &mut sink).await;
        assert!(passed);

        let urls = transport.requested_urls();
        assert_eq!(
            urls,
            vec![
                PUBLISH_URL.to_string(),
                START_URL.to_string(),
                TASK_URL.to_string(),
                TASK_URL.to_string(),
                LOGS_URL.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn task_logs_reach_the_sink_line_by_line() {
        let logs_body = r#"{
            "luauExecutionSessionTaskLogs": [{
                "path": "tasks/task-1/logs/1",
                "structuredMessages": [
                    {
                        "message": "line one\nline two",
                        "createTime": "2024-05-01T12:34:56Z",
                        "messageType": "OUTPUT"
                    },
                    {
                        "message": "boom",
                        "createTime": "2024-05-01T12:34:57Z",
                        "messageType": "ERROR"
                    }
                ]
            }]
        }"#;

        let transport = Arc::new(
            FakeTransport::new()
                .respond(PUBLISH_URL, 200, r#"{"versionNumber":789}"#)
                .respond(START_URL, 200, &task_body("PROCESSING"))
                .respond(TASK_URL, 200, &task_body("COMPLETE"))
                .respond(LOGS_URL, 200, logs_body),
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        execution(transport).run(&place, &mut sink).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 3);

        assert_eq!(lines[0].text, "line one");
        assert_eq!(lines[0].level, LogLevel::Information);
        assert_eq!(lines[0].format(), "[12:34:56] line one");

        assert_eq!(lines[1].text, "line two");
        assert_eq!(lines[1].level, LogLevel::Information);

        assert_eq!(lines[2].text, "boom");
        assert_eq!(lines[2].level, LogLevel::Error);
        assert_eq!(lines[2].format(), "[12:34:57] boom");
    }

    #[tokio::test]
    async fn missing_script_override_fails_before_any_request() {
        let transport = Arc::new(FakeTransport::new());
        let execution = CloudExecution::with_client(
            OpenCloudClient::with_transport("test-key", transport.clone()),
            9111,
            2431,
            ExecutionOptions {
                poll_interval: Duration::from_millis(1),
                script_file: Some(PathBuf::from("does/not/exist.luau")),
            },
        );
        let (_dir, place) = temp_place_file();
        let mut sink = CollectingSink::new();

        let passed = execution.run(&place, &mut sink).await;

        assert!(!passed);
        assert!(transport.requested_urls().is_empty());
    }
}
