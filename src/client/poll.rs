//! Status reads.

use crate::error::{Error, Result};
use crate::types::{ReportRequest, ReportStatus, StatusResponse};
use reqwest::header::{ACCEPT, COOKIE};
use tracing::debug;

use super::{ReportClient, error_body};

impl ReportClient {
    /// Read the current status of a submitted job, once
    ///
    /// The status endpoint issues no cookies, so the session from `request`
    /// is carried into the returned [`ReportStatus`] unchanged.
    pub async fn poll_status(&self, request: &ReportRequest) -> Result<ReportStatus> {
        let url = self.status_url(&request.request_id);
        let mut req = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(COOKIE, request.session.as_str());
        if let Some(timeout) = self.config.request_timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Poll {
                request_id: request.request_id.clone(),
                status: status.as_u16(),
                detail: error_body(response).await,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: StatusResponse =
            serde_json::from_slice(&bytes).map_err(|source| Error::InvalidResponse {
                endpoint: url,
                source,
            })?;

        debug!(
            request_id = %request.request_id,
            status = %parsed.status,
            exports = parsed.exports.len(),
            "polled report status"
        );

        Ok(ReportStatus {
            request_id: request.request_id.clone(),
            session: request.session.clone(),
            status: parsed.status,
            exports: parsed.exports,
            error: parsed.error_descriptor,
        })
    }
}
