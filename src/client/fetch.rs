//! Output retrieval.

use crate::error::{Error, Result};
use crate::stream::ReportStream;
use crate::types::ReportStatus;
use reqwest::header::COOKIE;
use tracing::debug;

use super::{ReportClient, error_body};

impl ReportClient {
    /// Open the output of a ready job as a stream
    ///
    /// Always reads the first export listed in `status`. The request and export
    /// ids are percent-encoded as path segments, so ids containing `/` or `;`
    /// address a single segment rather than being inserted raw. Only establishing
    /// the connection happens here; the body is read as the caller consumes
    /// the returned [`ReportStream`].
    pub async fn fetch_output(&self, status: &ReportStatus) -> Result<ReportStream> {
        let export = status.primary_export().ok_or_else(|| Error::Fetch {
            request_id: status.request_id.clone(),
            detail: "ready status lists no exports".to_string(),
        })?;

        let url = self.output_url(&status.request_id, &export.id);
        debug!(request_id = %status.request_id, export_id = %export.id, "opening report output");

        let response = self
            .http
            .get(&url)
            .header(COOKIE, status.session.as_str())
            .send()
            .await
            .map_err(|e| Error::Fetch {
                request_id: status.request_id.clone(),
                detail: e.to_string(),
            })?;

        let http_status = response.status();
        if !http_status.is_success() {
            let body = error_body(response).await;
            return Err(Error::Fetch {
                request_id: status.request_id.clone(),
                detail: format!("HTTP {http_status}: {body}"),
            });
        }

        Ok(ReportStream::from_response(
            status.request_id.clone(),
            export.id.clone(),
            response,
        ))
    }
}
