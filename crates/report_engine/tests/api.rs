use std::time::Duration;

use pretty_assertions::assert_eq;
use report_engine::{
    ClientSettings, FailureKind, FormField, ProgressApi, ReqwestProgressApi, TaskStatus,
};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestProgressApi {
    ReqwestProgressApi::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn submit_posts_urlencoded_fields_and_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .and(body_string_contains("board_id=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "t-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = api_for(&server)
        .submit(&[FormField::text("board_id", "abc")])
        .await
        .expect("submit ok");

    assert_eq!(outcome.error, None);
    assert_eq!(outcome.task_id.as_deref(), Some("t-1"));
}

#[tokio::test]
async fn submit_with_file_uses_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .and(header_exists("content-type"))
        .respond_with(|request: &Request| {
            let content_type = request
                .headers
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = String::from_utf8_lossy(&request.body).to_string();
            if content_type.starts_with("multipart/form-data") && body.contains("sticky notes") {
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "task_id": "m-1" }))
            } else {
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "no file" }))
            }
        })
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let upload = dir.path().join("notes.csv");
    std::fs::write(&upload, "sticky notes").unwrap();

    let outcome = api_for(&server)
        .submit(&[
            FormField::text("title", "Q3"),
            FormField::file("data", &upload),
        ])
        .await
        .expect("submit ok");

    assert_eq!(outcome.error, None);
    assert_eq!(outcome.task_id.as_deref(), Some("m-1"));
}

#[tokio::test]
async fn submit_missing_upload_is_an_io_error() {
    let server = MockServer::start().await;
    let err = api_for(&server)
        .submit(&[FormField::file("data", "/definitely/not/here.csv")])
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn submit_error_body_is_reported_even_with_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Missing board id"
        })))
        .mount(&server)
        .await;

    let outcome = api_for(&server).submit(&[]).await.expect("decoded body");

    assert_eq!(outcome.error.as_deref(), Some("Missing board id"));
    assert_eq!(outcome.task_id, None);
}

#[tokio::test]
async fn non_json_error_status_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).submit(&[]).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn non_json_success_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server).poll("t-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn poll_decodes_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "percent": 45,
            "message": "Scanning",
            "status": "pending"
        })))
        .mount(&server)
        .await;

    let snapshot = api_for(&server).poll("t-1").await.expect("poll ok");

    assert_eq!(snapshot.percent, Some(45.0));
    assert_eq!(snapshot.message.as_deref(), Some("Scanning"));
    assert_eq!(snapshot.status, TaskStatus::Pending);
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports/progress/t-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "completed", "result_file": "r.pdf" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestProgressApi::new(ClientSettings {
        base_url: format!("{}/reports", server.uri()),
        ..ClientSettings::default()
    })
    .unwrap();
    let snapshot = api.poll("t-9").await.expect("poll ok");

    assert_eq!(snapshot.status, TaskStatus::Completed);
    assert_eq!(snapshot.result_file.as_deref(), Some("r.pdf"));
}

#[tokio::test]
async fn request_timeout_applies_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/progress/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "status": "pending" })),
        )
        .mount(&server)
        .await;

    let api = ReqwestProgressApi::new(ClientSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..ClientSettings::default()
    })
    .unwrap();

    let err = api.poll("slow").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn download_saves_file_under_sanitized_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = api_for(&server)
        .download("report.pdf", dir.path())
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("report.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7");
}

#[tokio::test]
async fn nested_result_file_is_fetched_from_the_linked_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/2024/q1%20report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"q1".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = api_for(&server)
        .download("2024/q1 report.pdf", dir.path())
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("q1 report.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"q1");
}

#[tokio::test]
async fn download_missing_file_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = api_for(&server)
        .download("gone.pdf", dir.path())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(!dir.path().join("gone.pdf").exists());
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestProgressApi::new(ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
