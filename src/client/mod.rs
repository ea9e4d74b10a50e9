//! Report execution client split into focused submodules.
//!
//! The `ReportClient` struct and its methods are organized by step:
//! - [`submit`] - Job creation and session cookie extraction
//! - [`poll`] - Single status read
//! - [`fetch`] - Opening the output stream
//!
//! This module holds the orchestration that chains them under the overall
//! deadline: submit once, poll at a fixed delay until the job is ready or
//! failed, then fetch the first export.

mod fetch;
mod poll;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::stream::ReportStream;
use crate::types::{ExecutionState, Parameters, ReportRequest, ReportStatus, RequestId};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Output format requested for every execution
pub const OUTPUT_FORMAT: &str = "pdf";

const REPORT_EXECUTIONS_PATH: &str = "rest_v2/reportExecutions";

/// Client for asynchronous report executions
///
/// Holds only immutable configuration and a connection pool, so one client can
/// run any number of executions concurrently; each execution keeps its own
/// session and state.
#[derive(Clone, Debug)]
pub struct ReportClient {
    config: Config,
    http: reqwest::Client,
}

impl ReportClient {
    /// Create a client, validating the configuration first
    ///
    /// Fails with [`Error::Config`] (before any network access) when the
    /// endpoint is missing or malformed.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http = builder.build().map_err(|e| {
            Error::config("http_client", format!("failed to create HTTP client: {e}"))
        })?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a report and return its output stream
    ///
    /// Submits `path/name` with the given parameters, polls every
    /// `poll_delay` until the job is ready, and opens the first export.
    /// Submission and polling together are bounded by `timeout`.
    pub async fn run_report(
        &self,
        name: &str,
        path: &str,
        parameters: Option<&Parameters>,
    ) -> Result<ReportStream> {
        self.run_report_with_cancel(name, path, parameters, CancellationToken::new())
            .await
    }

    /// Like [`ReportClient::run_report`], but ends with [`Error::Cancelled`]
    /// as soon as `cancel` fires, up to the moment the stream is handed over
    pub async fn run_report_with_cancel(
        &self,
        name: &str,
        path: &str,
        parameters: Option<&Parameters>,
        cancel: CancellationToken,
    ) -> Result<ReportStream> {
        let deadline = self.config.timeout;

        // Dropping the execution future on expiry aborts the in-flight request or
        // pending delay; no poll is issued afterwards.
        let status =
            match tokio::time::timeout(deadline, self.execute(name, path, parameters, &cancel))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        report = %format_args!("{path}/{name}"),
                        timeout_ms = deadline.as_millis() as u64,
                        state = %ExecutionState::TimedOut,
                        "report execution timed out"
                    );
                    return Err(Error::TimedOut {
                        seconds: deadline.as_secs_f64(),
                    });
                }
            };

        let stream = until_cancelled(&cancel, self.fetch_output(&status)).await?;
        debug!(
            request_id = %status.request_id,
            export_id = stream.export_id(),
            state = %ExecutionState::Done,
            "report output stream opened"
        );
        Ok(stream)
    }

    /// Submitting and polling, the part bounded by the deadline
    async fn execute(
        &self,
        name: &str,
        path: &str,
        parameters: Option<&Parameters>,
        cancel: &CancellationToken,
    ) -> Result<ReportStatus> {
        debug!(report = %format_args!("{path}/{name}"), state = %ExecutionState::Submitting, "submitting report");
        let request = until_cancelled(cancel, self.submit_report(name, path, parameters)).await?;
        self.poll_until_done(request, cancel).await
    }

    /// Poll at a fixed delay until the job is ready or failed
    async fn poll_until_done(
        &self,
        request: ReportRequest,
        cancel: &CancellationToken,
    ) -> Result<ReportStatus> {
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let status = until_cancelled(cancel, self.poll_status(&request)).await?;

            if status.status.is_ready() {
                info!(
                    request_id = %status.request_id,
                    polls,
                    exports = status.exports.len(),
                    "report ready"
                );
                return Ok(status);
            }

            if status.status.is_failed() {
                let detail = status.failure_detail();
                warn!(
                    request_id = %status.request_id,
                    polls,
                    error = %detail,
                    state = %ExecutionState::Failed,
                    "report failed on server"
                );
                return Err(Error::ReportFailed {
                    request_id: status.request_id,
                    detail,
                });
            }

            debug!(
                request_id = %request.request_id,
                polls,
                status = %status.status,
                state = %ExecutionState::Polling,
                delay_ms = self.config.poll_delay.as_millis() as u64,
                "report not ready, waiting"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(request_id = %request.request_id, state = %ExecutionState::Cancelled, "report execution cancelled");
                    return Err(Error::Cancelled);
                }
                _ = tokio::time::sleep(self.config.poll_delay) => {}
            }
        }
    }

    fn executions_url(&self) -> String {
        format!("{}/{}", self.config.base_url(), REPORT_EXECUTIONS_PATH)
    }

    fn status_url(&self, request_id: &RequestId) -> String {
        format!(
            "{}/{}",
            self.executions_url(),
            urlencoding::encode(request_id.as_str())
        )
    }

    fn output_url(&self, request_id: &RequestId, export_id: &str) -> String {
        format!(
            "{}/exports/{}/outputResource",
            self.status_url(request_id),
            urlencoding::encode(export_id)
        )
    }
}

/// Body of a non-success response, used as error detail
///
/// A body that cannot be read still yields a detail naming the read error.
async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(e) => format!("<unreadable body: {e}>"),
    }
}

/// Run `fut` unless `cancel` fires first
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
