use super::*;
use crate::types::{JobStatus, SessionCookie};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};


const SESSION: &str = "JSESSIONID=4C2B8F1E9A";
const SET_COOKIE_VALUE: &str = "JSESSIONID=4C2B8F1E9A; Path=/jasperserver; HttpOnly";
const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

/// Client pointed at the mock server with test-friendly timings
fn test_client(server: &MockServer, timeout: Duration, poll_delay: Duration) -> ReportClient {
    let config = Config::new(server.uri())
        .with_timeout(timeout)
        .with_poll_delay(poll_delay);
    ReportClient::new(config).unwrap()
}

fn executions_path() -> &'static str {
    "/rest_v2/reportExecutions"
}

fn status_path(request_id: &str) -> String {
    format!("/rest_v2/reportExecutions/{request_id}")
}

fn output_path(request_id: &str, export_id: &str) -> String {
    format!("/rest_v2/reportExecutions/{request_id}/exports/{export_id}/outputResource")
}

fn submission_response(request_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Set-Cookie", SET_COOKIE_VALUE)
        .set_body_json(serde_json::json!({
            "requestId": request_id,
            "status": "queued",
            "reportURI": "/reports/sales",
        }))
}

fn status_response(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": status }))
}

fn ready_response(export_ids: &[&str]) -> ResponseTemplate {
    let exports: Vec<_> = export_ids
        .iter()
        .map(|id| serde_json::json!({ "id": id, "status": "ready" }))
        .collect();
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "ready",
        "exports": exports,
    }))
}

fn pdf_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "application/pdf")
        .set_body_bytes(PDF_BYTES)
}

async fn mount_submission(server: &MockServer, request_id: &str) {
    Mock::given(method("POST"))
        .and(path(executions_path()))
        .respond_with(submission_response(request_id))
        .mount(server)
        .await;
}

fn report_request(request_id: &str) -> ReportRequest {
    ReportRequest {
        request_id: RequestId::from(request_id),
        session: SessionCookie::new(SESSION),
    }
}

fn ready_status(request_id: &str, export_ids: &[&str]) -> ReportStatus {
    ReportStatus {
        request_id: RequestId::from(request_id),
        session: SessionCookie::new(SESSION),
        status: JobStatus::Ready,
        exports: export_ids
            .iter()
            .map(|id| crate::types::ExportDescriptor {
                id: id.to_string(),
                status: None,
            })
            .collect(),
        error: None,
    }
}

/// Number of requests the server received for `request_path`
async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
