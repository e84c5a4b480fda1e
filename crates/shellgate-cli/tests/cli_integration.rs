// End-to-end tests for the shellgate binary against a fake internal API.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use predicates::prelude::*;
use shellgate_test_utils::fixtures::ALLOWED_ROUTE;
use shellgate_test_utils::{shellgate, ShellgateCommand, TestFixtures, TestServer};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, server: &TestServer, extra: &str) -> PathBuf {
    let path = dir.path().join("config.yml");
    std::fs::write(&path, server.config_yaml(extra)).expect("config should be written");
    path
}

/// Run the binary off the async runtime so the fake server keeps serving
async fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("command thread should not panic")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_custom_action_push() {
    let router = Router::new()
        .route(
            ALLOWED_ROUTE,
            post(|| async {
                (
                    StatusCode::MULTIPLE_CHOICES,
                    Json(TestFixtures::custom_action_body(&["/a", "/b"], "info_message")),
                )
            }),
        )
        .route(
            "/a",
            post(|| async { Json(TestFixtures::custom_result_body(b"custom")) }),
        )
        .route(
            "/b",
            post(|| async { Json(TestFixtures::custom_result_body(b"output")) }),
        );
    let server = TestServer::start(router).await.expect("server should start");
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir, &server, "secret: \"secret\"\n");

    run_blocking(move || {
        ShellgateCommand::new()
            .config(&config)
            .key_id("1")
            .args(&["receive-pack", "group/repo"])
            .stdin("input")
            .run_success()
            .stdout("> GitLab: info_message\ncustom\noutput\n");
    })
    .await;

    let second = server.requests_to("/b");
    assert_eq!(second[0].json()["output"], TestFixtures::encode(b"input"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_denied_session_exits_with_message() {
    let router = Router::new().route(
        ALLOWED_ROUTE,
        post(|| async {
            let mut body = TestFixtures::denied_body("Not allowed!");
            body["gl_console_messages"] = serde_json::json!(["console"]);
            Json(body)
        }),
    );
    let server = TestServer::start(router).await.expect("server should start");
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir, &server, "");

    run_blocking(move || {
        ShellgateCommand::new()
            .config(&config)
            .username("first")
            .args(&["upload-pack", "group/repo"])
            .env("NO_COLOR", "1")
            .run_failure()
            .code(1)
            .stdout("> GitLab: console\n")
            .stderr(predicate::str::contains("Not allowed!"));
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_allowed_session_reports_forwarding() {
    let router = Router::new().route(
        ALLOWED_ROUTE,
        post(|| async { Json(TestFixtures::allowed_body()) }),
    );
    let server = TestServer::start(router).await.expect("server should start");
    let dir = TempDir::new().expect("temp dir");
    let log_file = dir.path().join("shellgate.log");
    let config = write_config(
        &dir,
        &server,
        &format!("log_file: \"{}\"\nlog_format: json\n", log_file.display()),
    );

    run_blocking(move || {
        ShellgateCommand::new()
            .config(&config)
            .key_id("1")
            .args(&["--color", "never", "upload-archive", "group/repo"])
            .run_success()
            .stdout("> GitLab: console\n> GitLab: message\n")
            .stderr(predicate::str::contains("Forwarding git-upload-archive for group/repo"))
            .stderr(predicate::str::contains("address"))
            .stderr(predicate::str::contains("token").not());
    })
    .await;

    let logs = std::fs::read_to_string(dir.path().join("shellgate.log")).expect("log file");
    assert!(logs.contains("allowed git-upload-archive on group/repo"));
}

#[test]
fn test_missing_identity_fails() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "gitlab_url = \"http://127.0.0.1:9\"\n").expect("config");

    shellgate()
        .arg("--config")
        .arg(&path)
        .args(["upload-pack", "group/repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "either a key id or a username is required",
        ));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().expect("temp dir");

    shellgate()
        .arg("--config")
        .arg(dir.path().join("absent.yml"))
        .args(["--key-id", "1", "upload-pack", "group/repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_config_from_environment() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("gateway.json");
    std::fs::write(&path, r#"{"gitlab_url": "unix:/var/run/gitlab.socket"}"#).expect("config");

    shellgate()
        .env("SHELLGATE_CONFIG", &path)
        .args(["--key-id", "1", "upload-pack", "group/repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gitlab_url"));
}
