//! Streaming access to a rendered report
//!
//! [`ReportStream`] is single-pass and lazily consumed: bytes are pulled from
//! the open HTTP connection only as the caller reads them. The connection is
//! released when the stream is drained or dropped. Read failures show up as
//! [`Error::Stream`] items, never silently truncate the output.

use crate::error::{Error, Result};
use crate::types::RequestId;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Live byte stream of one export's output resource
pub struct ReportStream {
    request_id: RequestId,
    export_id: String,
    content_type: Option<String>,
    content_length: Option<u64>,
    inner: ByteStream,
}

impl ReportStream {
    pub(crate) fn new<S>(
        request_id: RequestId,
        export_id: String,
        content_type: Option<String>,
        content_length: Option<u64>,
        inner: S,
    ) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            request_id,
            export_id,
            content_type,
            content_length,
            inner: Box::pin(inner),
        }
    }

    /// Wrap the body of an output-resource response
    pub(crate) fn from_response(
        request_id: RequestId,
        export_id: String,
        response: reqwest::Response,
    ) -> Self {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        let body = response
            .bytes_stream()
            .map_err(|e| Error::Stream(e.to_string()));

        Self::new(request_id, export_id, content_type, content_length, body)
    }

    /// The job this output belongs to
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// The export being streamed
    pub fn export_id(&self) -> &str {
        &self.export_id
    }

    /// `Content-Type` reported by the server, if any
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// `Content-Length` reported by the server, if any
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Drain the whole stream into memory
    ///
    /// Stops at the first read error and returns it.
    pub async fn collect_bytes(mut self) -> Result<Vec<u8>> {
        let capacity = self
            .content_length
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0);
        let mut buf = Vec::with_capacity(capacity);
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf)
    }

    /// Adapt the stream to [`AsyncRead`], e.g. for `tokio::io::copy` into a file
    ///
    /// Read errors become `std::io::Error`s wrapping the [`Error::Stream`].
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.map_err(std::io::Error::other))
    }
}

impl Stream for ReportStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl std::fmt::Debug for ReportStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStream")
            .field("request_id", &self.request_id)
            .field("export_id", &self.export_id)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn stream_of(items: Vec<Result<Bytes>>) -> ReportStream {
        ReportStream::new(
            RequestId::from("r1"),
            "x1".to_string(),
            Some("application/pdf".to_string()),
            None,
            futures::stream::iter(items),
        )
    }

    #[tokio::test]
    async fn collects_chunks_in_order() {
        let stream = stream_of(vec![
            Ok(Bytes::from_static(b"%PDF-")),
            Ok(Bytes::from_static(b"1.4")),
        ]);
        assert_eq!(stream.content_type(), Some("application/pdf"));
        assert_eq!(stream.collect_bytes().await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn read_error_is_surfaced_after_earlier_chunks() {
        let mut stream = stream_of(vec![
            Ok(Bytes::from_static(b"%PDF-")),
            Err(Error::Stream("connection reset".into())),
        ]);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"%PDF-");

        match stream.next().await {
            Some(Err(Error::Stream(msg))) => assert!(msg.contains("connection reset")),
            other => panic!("expected stream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn collect_stops_at_read_error() {
        let stream = stream_of(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(Error::Stream("truncated".into())),
            Ok(Bytes::from_static(b"never")),
        ]);
        let err = stream.collect_bytes().await.unwrap_err();
        assert_eq!(err.error_code(), "stream_error");
    }

    #[tokio::test]
    async fn async_read_adapter_yields_bytes_and_errors() {
        let stream = stream_of(vec![Ok(Bytes::from_static(b"hello")), Ok(Bytes::new())]);
        let mut reader = stream.into_async_read();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "hello");

        let stream = stream_of(vec![Err(Error::Stream("boom".into()))]);
        let mut reader = stream.into_async_read();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
