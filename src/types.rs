//! Core types for jasper-exec

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of one report execution
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Create a new RequestId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session cookie issued by the server on submission (`JSESSIONID=...`)
///
/// Sent verbatim as the `Cookie` header on every call for the same job.
/// The `Debug` output hides the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    /// Prefix a `Set-Cookie` entry must carry to be accepted as the session
    pub const PREFIX: &'static str = "JSESSIONID";

    /// Wrap an already-extracted `name=value` cookie pair
    pub fn new(cookie: impl Into<String>) -> Self {
        Self(cookie.into())
    }

    /// Extract the session cookie from a set of `Set-Cookie` header values
    ///
    /// Picks the first value starting with `JSESSIONID` and cuts it at the
    /// first `;`, dropping attributes such as `Path` or `HttpOnly`.
    pub fn from_set_cookie<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        values
            .into_iter()
            .map(str::trim_start)
            .find(|value| value.starts_with(Self::PREFIX))
            .map(|value| {
                let pair = value.split(';').next().unwrap_or(value);
                Self(pair.to_string())
            })
    }

    /// Header value for the `Cookie` request header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.0.split('=').next().unwrap_or_default();
        write!(f, "SessionCookie({name}=<redacted>)")
    }
}

/// Report parameters, in the order the caller supplied them
///
/// Each parameter carries a single value; it is sent as a one-element list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(IndexMap<String, String>);

impl Parameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value but keeping its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Builder-style variant of [`Parameters::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a parameter value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no parameters are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A submitted job: its identifier plus the session that owns it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRequest {
    /// Job identifier assigned by the server
    pub request_id: RequestId,
    /// Session cookie required on every subsequent call
    pub session: SessionCookie,
}

/// Server-side status of a job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Waiting for an execution slot
    Queued,
    /// Rendering in progress
    Execution,
    /// Output is available
    Ready,
    /// Rendering failed
    Failed,
    /// Cancelled on the server
    Cancelled,
    /// Any status this client does not know about
    Other(String),
}

impl JobStatus {
    /// True when the output can be fetched
    pub fn is_ready(&self) -> bool {
        matches!(self, JobStatus::Ready)
    }

    /// True when the job failed on the server
    pub fn is_failed(&self) -> bool {
        matches!(self, JobStatus::Failed)
    }

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Execution => "execution",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => JobStatus::Queued,
            "execution" => JobStatus::Execution,
            "ready" => JobStatus::Ready,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to one rendered output of a job
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDescriptor {
    /// Export identifier used in the output resource URL
    pub id: String,
    /// Per-export status, when the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Error details the server attaches to a failed job
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDescriptor {
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Server error code
    #[serde(default)]
    pub error_code: Option<String>,
}

/// One polled snapshot of a job, carrying the session forward
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportStatus {
    /// Job identifier
    pub request_id: RequestId,
    /// Session cookie from submission, unchanged
    pub session: SessionCookie,
    /// Job status
    pub status: JobStatus,
    /// Rendered outputs, populated once the job is ready
    pub exports: Vec<ExportDescriptor>,
    /// Failure details, when the server provides them
    pub error: Option<ErrorDescriptor>,
}

impl ReportStatus {
    /// The export that gets fetched: always the first one listed
    pub fn primary_export(&self) -> Option<&ExportDescriptor> {
        self.exports.first()
    }

    /// Description of a failure, falling back to the raw status
    pub fn failure_detail(&self) -> String {
        match &self.error {
            Some(ErrorDescriptor {
                message: Some(message),
                error_code: Some(code),
            }) => format!("{message} ({code})"),
            Some(ErrorDescriptor {
                message: Some(message),
                ..
            }) => message.clone(),
            Some(ErrorDescriptor {
                error_code: Some(code),
                ..
            }) => code.clone(),
            _ => format!("status {}", self.status),
        }
    }
}

/// States of one report execution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionState {
    /// Waiting for the job-creation response
    Submitting,
    /// Reading status until a terminal one arrives
    Polling,
    /// Output stream handed to the caller
    Done,
    /// Submission, a status read, the job or the fetch failed
    Failed,
    /// The overall deadline elapsed
    TimedOut,
    /// The caller cancelled
    Cancelled,
}

impl ExecutionState {
    /// True for states an execution never leaves
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionState::Submitting | ExecutionState::Polling)
    }
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionState::Submitting => "submitting",
            ExecutionState::Polling => "polling",
            ExecutionState::Done => "done",
            ExecutionState::Failed => "failed",
            ExecutionState::TimedOut => "timed_out",
            ExecutionState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// Wire payloads for the reportExecutions resource

/// Body of `POST /rest_v2/reportExecutions`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecutionRequestBody<'a> {
    pub(crate) report_unit_uri: String,
    #[serde(rename = "async")]
    pub(crate) is_async: &'static str,
    pub(crate) output_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parameters: Option<ReportParameters<'a>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportParameters<'a> {
    pub(crate) report_parameter: Vec<ReportParameter<'a>>,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct ReportParameter<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: [&'a str; 1],
}

impl<'a> From<&'a Parameters> for ReportParameters<'a> {
    fn from(params: &'a Parameters) -> Self {
        Self {
            report_parameter: params
                .iter()
                .map(|(name, value)| ReportParameter {
                    name,
                    value: [value],
                })
                .collect(),
        }
    }
}

/// Fields of the submission response this client relies on
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecutionResponse {
    pub(crate) request_id: RequestId,
}

/// Body of `GET /rest_v2/reportExecutions/{requestId}`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusResponse {
    pub(crate) status: JobStatus,
    #[serde(default)]
    pub(crate) exports: Vec<ExportDescriptor>,
    #[serde(default)]
    pub(crate) error_descriptor: Option<ErrorDescriptor>,
}
