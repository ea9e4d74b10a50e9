//! # jasper-exec
//!
//! Async client for JasperReports Server report executions.
//!
//! A report run is one asynchronous job on the server:
//! - **Submit** - `POST rest_v2/reportExecutions` creates the job and opens a session
//! - **Poll** - the job status is read at a fixed delay until it is `ready` or `failed`
//! - **Fetch** - the first export's output resource is streamed back
//!
//! Submission and polling together are bounded by a deadline. When it
//! elapses the poll loop is abandoned and the run ends with
//! [`Error::TimedOut`]. Callers can also cancel a run with a
//! [`tokio_util::sync::CancellationToken`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use jasper_exec::{Config, Parameters, ReportClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("http://localhost:8080/jasperserver")
//!         .with_timeout(Duration::from_secs(120))
//!         .with_poll_delay(Duration::from_secs(2));
//!     let client = ReportClient::new(config)?;
//!
//!     let params = Parameters::new().with("region", "EU");
//!     let report = client.run_report("sales", "/reports", Some(&params)).await?;
//!
//!     let mut file = tokio::fs::File::create("sales.pdf").await?;
//!     tokio::io::copy(&mut report.into_async_read(), &mut file).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Report execution client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Output streaming
pub mod stream;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::{OUTPUT_FORMAT, ReportClient};
pub use config::Config;
pub use error::{Error, IsRetryable, Result};
pub use stream::ReportStream;
pub use types::{
    ErrorDescriptor, ExecutionState, ExportDescriptor, JobStatus, Parameters, ReportRequest,
    ReportStatus, RequestId, SessionCookie,
};
pub use tokio_util::sync::CancellationToken;
