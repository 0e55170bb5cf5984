//! Upload round trips against a local HTTP server
//!
//! Each test serves exactly one canned response from a tiny_http server on
//! an ephemeral port and drives the real `HttpTransport` through the
//! submission controller.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use fakescope::config::ServerConfig;
use fakescope::{
    FailureKind, HttpTransport, SubmissionController, SubmissionState, SubmitOutcome, VideoFile,
};
use tempfile::TempDir;

const PAYLOAD: &str = r#"{
  "frames_with_anomalies": [
    {"frame_index": 45, "real_score": 0.1, "fake_score": 0.9, "frame_url": "/frames/45.jpg"},
    {"frame_index": 12, "real_score": 0.3, "fake_score": 0.7, "frame_url": "/frames/12.jpg"}
  ],
  "final_scores": {
    "total_frames": 4, "real_count": 2, "fake_count": 2,
    "real_percentage": 50.0, "fake_percentage": 50.0
  }
}"#;

/// What the server saw
struct Captured {
    method: String,
    url: String,
    content_type: String,
    body: Vec<u8>,
}

/// Serve one response, then hand back the request that was received
fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<Captured>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to bind test server");
    let addr = server.server_addr().to_ip().expect("Test server has no IP address");

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("Failed to receive request");
        let mut received = Vec::new();
        request.as_reader().read_to_end(&mut received).unwrap();

        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string())
            .unwrap_or_default();
        let captured = Captured {
            method: request.method().to_string(),
            url: request.url().to_string(),
            content_type,
            body: received,
        };

        let header: tiny_http::Header = "Content-Type: application/json".parse().unwrap();
        let response = tiny_http::Response::from_string(body)
            .with_status_code(status)
            .with_header(header);
        request.respond(response).unwrap();
        captured
    });

    (format!("http://{}", addr), handle)
}

fn controller_for(base_url: &str) -> SubmissionController<HttpTransport> {
    let server = ServerConfig {
        base_url: base_url.to_string(),
        timeout_secs: 10,
        ..ServerConfig::default()
    };
    SubmissionController::new(HttpTransport::new(&server).unwrap())
}

fn video_in(dir: &Path) -> PathBuf {
    let path = dir.join("clip.mp4");
    std::fs::write(&path, b"not really a video").unwrap();
    path
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));
    let (base_url, server) = serve_once(200, PAYLOAD);

    let controller = controller_for(&base_url);
    let outcome = controller.submit(Some(&video)).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Succeeded);

    let captured = server.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/upload");
    assert!(captured.content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&captured.body).to_lowercase();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"clip.mp4\""));
    assert!(body.contains("content-type: video/mp4"));
    assert!(body.contains("not really a video"));
}

#[tokio::test]
async fn test_success_is_normalized() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));
    let (base_url, server) = serve_once(200, PAYLOAD);

    let controller = controller_for(&base_url);
    controller.submit(Some(&video)).await.unwrap();
    server.join().unwrap();

    let SubmissionState::Succeeded(result) = controller.state() else {
        panic!("expected Succeeded, got {:?}", controller.state());
    };
    let indices: Vec<u64> = result.frames.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![12, 45]);
    assert_eq!(result.anomaly_count(), 2);
    assert_eq!(result.summary.total_frames, 4);
    assert!(result.warnings.is_empty());
    assert_eq!(controller.requests_issued(), 1);
}

#[tokio::test]
async fn test_server_error_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));
    let (base_url, server) = serve_once(500, r#"{"error": "model not loaded"}"#);

    let controller = controller_for(&base_url);
    let outcome = controller.submit(Some(&video)).await.unwrap();
    server.join().unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed);
    let info = controller.state().error().cloned().unwrap();
    assert_eq!(info.kind, FailureKind::Transport);
    assert!(info.message.contains("500"));
    assert!(info.message.contains("model not loaded"));
}

#[tokio::test]
async fn test_garbage_body_fails_as_malformed() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));
    let (base_url, server) = serve_once(200, "<html>proxy error</html>");

    let controller = controller_for(&base_url);
    controller.submit(Some(&video)).await.unwrap();
    server.join().unwrap();

    let info = controller.state().error().cloned().unwrap();
    assert_eq!(info.kind, FailureKind::MalformedPayload);
}

#[tokio::test]
async fn test_backend_error_payload_fails() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));
    let (base_url, server) = serve_once(
        200,
        r#"{"frames_with_anomalies": [], "final_scores": {"error": "No frames processed"}}"#,
    );

    let controller = controller_for(&base_url);
    controller.submit(Some(&video)).await.unwrap();
    server.join().unwrap();

    let info = controller.state().error().cloned().unwrap();
    assert_eq!(info.kind, FailureKind::MalformedPayload);
    assert!(info.message.contains("No frames processed"));
}

#[tokio::test]
async fn test_unreachable_server_fails() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));

    // Grab a free port and release it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let controller = controller_for(&format!("http://127.0.0.1:{}", port));
    let outcome = controller.submit(Some(&video)).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(controller.state().error().unwrap().kind, FailureKind::Transport);
}

#[tokio::test]
async fn test_missing_video_fails_without_request() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(dir.path().join("gone.mp4"));

    let controller = controller_for("http://127.0.0.1:9");
    let outcome = controller.submit(Some(&video)).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed);
    let info = controller.state().error().cloned().unwrap();
    assert_eq!(info.kind, FailureKind::Transport);
    assert!(info.message.contains("gone.mp4"));
}

#[tokio::test]
async fn test_failed_requires_reset() {
    let dir = TempDir::new().unwrap();
    let video = VideoFile::from_path(video_in(dir.path()));

    let (first_url, first) = serve_once(503, "busy");
    let controller = controller_for(&first_url);
    controller.submit(Some(&video)).await.unwrap();
    first.join().unwrap();
    assert!(matches!(controller.state(), SubmissionState::Failed(_)));

    // Failed holds until reset
    assert!(controller.submit(Some(&video)).await.is_err());
    assert_eq!(controller.requests_issued(), 1);

    controller.reset().unwrap();
    assert_eq!(controller.state(), SubmissionState::Idle);
}

// =============================================================================
// CLI round trip
// =============================================================================

#[test]
fn test_cli_analyze_round_trip() {
    let dir = TempDir::new().unwrap();
    let video = video_in(dir.path());
    let (base_url, server) = serve_once(200, PAYLOAD);

    let output = Command::new(env!("CARGO_BIN_EXE_fakescope"))
        .args(["--server", &base_url, "analyze", video.to_str().unwrap(), "--json"])
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute fakescope");
    server.join().unwrap();

    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["video"]["file_name"], "clip.mp4");
    assert_eq!(report["video"]["mime_type"], "video/mp4");
    // No score arrays in the response, so the default chart uses the anomaly list
    assert_eq!(report["chart_source"], "anomalies");
    assert_eq!(
        report["chart"]["labels"],
        serde_json::json!(["Frame 12", "Frame 45"])
    );
}

#[test]
fn test_cli_analyze_failure_exit_code() {
    let dir = TempDir::new().unwrap();
    let video = video_in(dir.path());
    let (base_url, server) = serve_once(500, r#"{"error": "boom"}"#);

    let output = Command::new(env!("CARGO_BIN_EXE_fakescope"))
        .args(["--server", &base_url, "analyze", video.to_str().unwrap()])
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute fakescope");
    server.join().unwrap();

    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Analysis failed"));
    assert!(err.contains("boom"));
}
