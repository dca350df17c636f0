//! Router tests driving the real handler with stub runners
//!
//! Stub runners are either standard tools found on PATH (`echo`, `true`,
//! `false`) or small shell scripts written once into a temporary directory.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::config::{Config, RunnerConfig};
use crate::webserver::{
    build_app, routes::chat::CHAT_COMPLETIONS_PATH, shutdown, start_server, state::AppState,
};

const HELLO: &str = r#"{"messages": [{"role": "user", "content": "Hello"}]}"#;

fn app_with_runner(binary: &str) -> Router {
    let config = Config {
        runner: RunnerConfig {
            binary: binary.to_string(),
            model: "test-model".to_string(),
        },
        ..Default::default()
    };
    build_app(Arc::new(AppState::new(config)))
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(CHAT_COMPLETIONS_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn detail(response: Response) -> String {
    let text = body_string(response).await;
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["detail"].as_str().unwrap().to_string()
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// VALIDATION
// =============================================================================

#[tokio::test]
async fn test_invalid_json_is_400() {
    let response = send(app_with_runner("echo"), chat_request("{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await, "Invalid JSON payload");
}

#[tokio::test]
async fn test_missing_or_invalid_messages_is_400() {
    for body in [r#"{"messages": []}"#, r#"{"messages": "not-a-list"}"#, "{}"] {
        let response = send(app_with_runner("echo"), chat_request(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            detail(response).await,
            "No messages provided or invalid format"
        );
    }
}

#[tokio::test]
async fn test_assistant_last_is_400() {
    let body = r#"{"messages": [{"role": "assistant", "content": "hi"}]}"#;
    let response = send(app_with_runner("echo"), chat_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await, "Last message must have role 'user'");
}

#[tokio::test]
async fn test_blank_prompt_is_400() {
    let body = r#"{"messages": [{"role": "user", "content": "   "}]}"#;
    let response = send(app_with_runner("echo"), chat_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await, "Empty prompt");
}

#[tokio::test]
async fn test_validation_happens_before_runner_lookup() {
    let body = r#"{"messages": [{"role": "user", "content": ""}]}"#;
    let response = send(app_with_runner("/nonexistent/runner"), chat_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// ROUTING
// =============================================================================

#[tokio::test]
async fn test_unknown_path_is_404() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/completions")
        .body(Body::from(HELLO))
        .unwrap();
    let response = send(app_with_runner("echo"), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(response).await, "Not Found");
}

#[tokio::test]
async fn test_get_on_chat_path_is_405() {
    let request = Request::builder()
        .method(Method::GET)
        .uri(CHAT_COMPLETIONS_PATH)
        .body(Body::empty())
        .unwrap();
    let response = send(app_with_runner("echo"), request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(detail(response).await, "Method Not Allowed");
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_server_binds_and_stops_on_shutdown() {
    let mut config = Config::default();
    config.webserver.port = 0;

    let server = tokio::spawn(start_server(Arc::new(config)));
    shutdown();

    let result = tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok(), "server failed: {:?}", result);
}

// =============================================================================
// RUNNER INVOCATION
// =============================================================================

#[tokio::test]
async fn test_missing_runner_is_500_naming_binary() {
    let response = send(app_with_runner("/nonexistent/ollama"), chat_request(HELLO)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type(&response).starts_with("application/json"));
    assert_eq!(
        detail(response).await,
        "Runner command not found: /nonexistent/ollama"
    );
}

#[cfg(unix)]
mod with_stub_runners {
    use super::*;
    use once_cell::sync::Lazy;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// All stub scripts, written once before any of them is executed
    struct Stubs {
        _dir: TempDir,
        hi_there: String,
        print_args: String,
        fail_silently: String,
        fail_midstream: String,
        slow: String,
        chatty_stderr: String,
        killed_by_signal: String,
        multiline_stderr: String,
        abandoned: String,
        abandoned_pid_file: PathBuf,
    }

    static STUBS: Lazy<Stubs> = Lazy::new(|| {
        let dir = tempfile::tempdir().unwrap();
        let abandoned_pid_file = dir.path().join("abandoned.pid");
        let write = |name: &str, script: &str| -> String {
            let path: PathBuf = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        };

        Stubs {
            hi_there: write("hi_there.sh", r"printf 'Hi\nthere\n'"),
            print_args: write("print_args.sh", r#"for arg in "$@"; do echo "[$arg]"; done"#),
            fail_silently: write("fail_silently.sh", "echo boom >&2\nexit 1"),
            fail_midstream: write("fail_midstream.sh", "echo partial\necho boom >&2\nexit 3"),
            slow: write("slow.sh", "echo first\nsleep 30\necho never"),
            chatty_stderr: write(
                "chatty_stderr.sh",
                "head -c 500000 /dev/zero | tr '\\0' x >&2\necho done",
            ),
            killed_by_signal: write("killed_by_signal.sh", "kill -9 $$"),
            multiline_stderr: write(
                "multiline_stderr.sh",
                "printf '  first\\nsecond\\n\\n' >&2\nexit 2",
            ),
            abandoned: write(
                "abandoned.sh",
                &format!(
                    "echo $$ > '{}'\necho first\nexec sleep 30",
                    abandoned_pid_file.display()
                ),
            ),
            abandoned_pid_file,
            _dir: dir,
        }
    });

    #[tokio::test]
    async fn test_streams_runner_stdout_as_text() {
        let response = send(app_with_runner(&STUBS.hi_there), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/plain"));

        let chunks: Vec<_> = response.into_body().into_data_stream().collect().await;
        let chunks: Vec<_> = chunks.into_iter().map(|c| c.unwrap()).collect();
        assert!(chunks.len() >= 2);
        assert_eq!(&chunks[0][..], b"Hi\n");

        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.to_vec()).collect();
        assert_eq!(joined, b"Hi\nthere\n");
    }

    #[tokio::test]
    async fn test_prompt_is_one_literal_argument() {
        let body = r#"{"messages": [{"role": "user", "content": "  $(echo pwned); ls *  "}]}"#;
        let response = send(app_with_runner(&STUBS.print_args), chat_request(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "[run]\n[test-model]\n[$(echo pwned); ls *]\n"
        );
    }

    #[tokio::test]
    async fn test_failure_before_output_is_500() {
        let response = send(app_with_runner(&STUBS.fail_silently), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(response).await, "Runner failed (1): boom");
    }

    #[tokio::test]
    async fn test_failure_after_output_aborts_stream() {
        let response = send(app_with_runner(&STUBS.fail_midstream), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let mut data = response.into_body().into_data_stream();
        let first = data.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"partial\n");

        let err = data.next().await.unwrap().unwrap_err().to_string();
        assert!(err.contains("boom"), "unexpected error: {}", err);
        assert!(err.contains("(3)"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_success_without_output_is_empty_200() {
        let response = send(app_with_runner("true"), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_failing_tool_without_stderr() {
        let response = send(app_with_runner("false"), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(response).await, "Runner failed (1): ");
    }

    #[tokio::test]
    async fn test_slow_stream_does_not_block_other_requests() {
        let slow = send(app_with_runner(&STUBS.slow), chat_request(HELLO)).await;
        assert_eq!(slow.status(), StatusCode::OK);

        let mut slow_body = slow.into_body().into_data_stream();
        let first = slow_body.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"first\n");

        let fast = tokio::time::timeout(
            Duration::from_secs(10),
            send(app_with_runner(&STUBS.hi_there), chat_request(HELLO)),
        )
        .await
        .expect("second request blocked by the first");
        assert_eq!(body_string(fast).await, "Hi\nthere\n");

        // Caller goes away mid-stream; the runner is killed on drop
        drop(slow_body);
    }

    fn process_alive(pid: &str) -> bool {
        std::process::Command::new("sh")
            .args(["-c", &format!("kill -0 {} 2>/dev/null", pid)])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_disconnect_kills_and_reaps_runner() {
        let response = send(app_with_runner(&STUBS.abandoned), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"first\n");

        // Written before the first line, and `exec` keeps the pid
        let pid = std::fs::read_to_string(&STUBS.abandoned_pid_file).unwrap();
        let pid = pid.trim().to_string();
        assert!(process_alive(&pid), "runner {} should still be running", pid);

        drop(body);

        let mut gone = false;
        for _ in 0..100 {
            if !process_alive(&pid) {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(gone, "runner {} survived the disconnect", pid);
    }

    #[tokio::test]
    async fn test_large_stderr_does_not_stall_stdout() {
        let response = tokio::time::timeout(
            Duration::from_secs(10),
            send(app_with_runner(&STUBS.chatty_stderr), chat_request(HELLO)),
        )
        .await
        .expect("runner stalled on a full stderr pipe");
        assert_eq!(response.status(), StatusCode::OK);

        let body = tokio::time::timeout(Duration::from_secs(10), body_string(response))
            .await
            .expect("body never finished");
        assert_eq!(body, "done\n");
    }

    #[tokio::test]
    async fn test_signal_exit_reports_minus_one() {
        let response = send(app_with_runner(&STUBS.killed_by_signal), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(response).await, "Runner failed (-1): ");
    }

    #[tokio::test]
    async fn test_stderr_kept_verbatim_except_trailing_newlines() {
        let response = send(app_with_runner(&STUBS.multiline_stderr), chat_request(HELLO)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(response).await, "Runner failed (2):   first\nsecond");
    }

    #[tokio::test]
    async fn test_identical_requests_validate_identically() {
        for _ in 0..3 {
            let response = send(app_with_runner(&STUBS.hi_there), chat_request(HELLO)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_string(response).await, "Hi\nthere\n");
        }
    }
}
