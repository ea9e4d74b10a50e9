//! Job submission.

use crate::error::{Error, Result};
use crate::types::{
    ExecutionRequestBody, ExecutionResponse, Parameters, ReportParameters, ReportRequest,
    SessionCookie,
};
use reqwest::header::{ACCEPT, SET_COOKIE};
use tracing::info;

use super::{OUTPUT_FORMAT, ReportClient, error_body};

impl ReportClient {
    /// Create a report execution on the server
    ///
    /// The report is addressed as `path/name`. When `parameters` is `None` the
    /// request carries no parameters section at all.
    ///
    /// The returned [`ReportRequest`] holds the session cookie issued with the
    /// response; a successful response without a `JSESSIONID*` cookie is
    /// rejected as [`Error::Submission`], since no later call could be
    /// authenticated.
    pub async fn submit_report(
        &self,
        name: &str,
        path: &str,
        parameters: Option<&Parameters>,
    ) -> Result<ReportRequest> {
        let body = ExecutionRequestBody {
            report_unit_uri: format!("{path}/{name}"),
            is_async: "true",
            output_format: OUTPUT_FORMAT,
            parameters: parameters.map(ReportParameters::from),
        };

        let url = self.executions_url();
        let mut request = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body);
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Submission {
                status: status.as_u16(),
                detail: error_body(response).await,
            });
        }

        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| cookie_pair(v.as_bytes()));
        let session =
            SessionCookie::from_set_cookie(set_cookies).ok_or_else(|| Error::Submission {
                status: status.as_u16(),
                detail: format!(
                    "response carried no {}* session cookie",
                    SessionCookie::PREFIX
                ),
            })?;

        let bytes = response.bytes().await?;
        let parsed: ExecutionResponse =
            serde_json::from_slice(&bytes).map_err(|source| Error::InvalidResponse {
                endpoint: url,
                source,
            })?;

        info!(
            request_id = %parsed.request_id,
            report = %body.report_unit_uri,
            parameters = parameters.map_or(0, Parameters::len),
            "report execution submitted"
        );

        Ok(ReportRequest {
            request_id: parsed.request_id,
            session,
        })
    }
}

/// The `name=value` part of a raw `Set-Cookie` value
///
/// Attributes after the first `;` may carry arbitrary bytes and are never
/// inspected; only the pair itself has to be valid UTF-8.
fn cookie_pair(raw: &[u8]) -> Option<&str> {
    let pair = raw.split(|b| *b == b';').next().unwrap_or(raw);
    std::str::from_utf8(pair).ok()
}
