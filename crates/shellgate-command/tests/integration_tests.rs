// Integration tests for shellgate-command
// These tests run whole sessions through the HTTP transport against a local
// fake of the internal API.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use shellgate_api::{CommandType, Identity};
use shellgate_command::{ReadWriter, SessionCommand, SessionOutcome};
use shellgate_config::StdinCapture;
use shellgate_test_utils::fixtures::ALLOWED_ROUTE;
use shellgate_test_utils::{
    assert_custom_action_output, assert_output_lines, assert_shared_secret, TestFixtures,
    TestServer,
};

const INFO_REFS: &str = "/geo/proxy_git_push_ssh/info_refs";
const PUSH: &str = "/geo/proxy_git_push_ssh/push";

fn custom_action_router() -> Router {
    Router::new()
        .route(
            ALLOWED_ROUTE,
            post(|| async {
                (
                    StatusCode::MULTIPLE_CHOICES,
                    Json(TestFixtures::custom_action_body(
                        &[INFO_REFS, PUSH],
                        "info_message",
                    )),
                )
            }),
        )
        .route(
            INFO_REFS,
            post(|| async { Json(TestFixtures::custom_result_body(b"custom")) }),
        )
        .route(
            PUSH,
            post(|| async { Json(TestFixtures::custom_result_body(b"output")) }),
        )
}

fn session(server: &TestServer, identity: Identity) -> SessionCommand {
    let mut config = server.config();
    config.secret = Some("secret".into());
    SessionCommand::from_config(&config, identity).expect("session should build")
}

#[tokio::test]
async fn test_custom_receive_pack() {
    let server = TestServer::start(custom_action_router())
        .await
        .expect("server should start");

    let mut rw = ReadWriter::new(&b"input"[..], Vec::new());
    let outcome = session(&server, Identity::KeyId("1".into()))
        .execute(CommandType::ReceivePack, TestFixtures::REPO, &mut rw)
        .await
        .expect("session should succeed");

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_output_lines(&rw.out, &["> GitLab: info_message", "custom", "output"]);

    let allowed = server.requests_to(ALLOWED_ROUTE);
    assert_eq!(allowed.len(), 1);
    assert_eq!(allowed[0].json()["key_id"], "1");
    assert_shared_secret(&allowed[0], "secret");

    let info_refs = server.requests_to(INFO_REFS);
    assert_eq!(info_refs.len(), 1);
    assert_eq!(info_refs[0].json()["data"]["gl_id"], "1");
    assert_custom_action_output(&info_refs[0], b"");
    assert_shared_secret(&info_refs[0], "secret");

    let push = server.requests_to(PUSH);
    assert_eq!(push.len(), 1);
    assert_eq!(push[0].json()["data"]["gl_id"], "1");
    assert_custom_action_output(&push[0], b"input");

    let order: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(order, vec![ALLOWED_ROUTE, INFO_REFS, PUSH]);
}

#[tokio::test]
async fn test_custom_action_error_status_aborts() {
    let router = Router::new()
        .route(
            ALLOWED_ROUTE,
            post(|| async {
                (
                    StatusCode::MULTIPLE_CHOICES,
                    Json(TestFixtures::custom_action_body(&[INFO_REFS, PUSH], "")),
                )
            }),
        )
        .route(
            INFO_REFS,
            post(|| async { Json(TestFixtures::custom_result_body(b"custom")) }),
        )
        .route(
            PUSH,
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"message": "primary unreachable"})),
                )
            }),
        );
    let server = TestServer::start(router).await.expect("server should start");

    let mut rw = ReadWriter::new(&b"input\n"[..], Vec::new());
    let err = session(&server, Identity::KeyId("1".into()))
        .execute(CommandType::ReceivePack, TestFixtures::REPO, &mut rw)
        .await
        .expect_err("session should fail");

    assert_eq!(err.to_string(), "primary unreachable");
    assert_output_lines(&rw.out, &["custom"]);
}

#[tokio::test]
async fn test_denied_session_prints_console_messages() {
    let router = Router::new().route(
        ALLOWED_ROUTE,
        post(|Json(request): Json<Value>| async move {
            assert_eq!(request["username"], "first");
            let mut body = TestFixtures::denied_body("Not allowed!");
            body["gl_console_messages"] = serde_json::json!(["console", "message"]);
            Json(body)
        }),
    );
    let server = TestServer::start(router).await.expect("server should start");

    let mut rw = ReadWriter::new(&b""[..], Vec::new());
    let err = session(&server, Identity::Username("first".into()))
        .execute(CommandType::UploadPack, TestFixtures::REPO, &mut rw)
        .await
        .expect_err("session should be denied");

    assert_eq!(err.to_string(), "Not allowed!");
    assert_output_lines(&rw.out, &["> GitLab: console", "> GitLab: message"]);
}

#[tokio::test]
async fn test_allowed_session_forwards_with_console_messages() {
    let router = Router::new().route(
        ALLOWED_ROUTE,
        post(|| async { Json(TestFixtures::allowed_body()) }),
    );
    let server = TestServer::start(router).await.expect("server should start");

    let mut rw = ReadWriter::new(&b""[..], Vec::new());
    let outcome = session(&server, Identity::KeyId("1".into()))
        .execute(CommandType::UploadArchive, TestFixtures::REPO, &mut rw)
        .await
        .expect("session should succeed");

    let SessionOutcome::Forward(transfer) = outcome else {
        panic!("expected forward, got {:?}", outcome);
    };
    assert_eq!(transfer.address, "address");
    assert_eq!(transfer.repository.repo_name, "group/gitaly-repo");
    assert_eq!(transfer.git_config_options, vec!["option".to_string()]);
    assert_output_lines(&rw.out, &["> GitLab: console", "> GitLab: message"]);
}

#[tokio::test]
async fn test_capture_to_end_over_http() {
    let server = TestServer::start(custom_action_router())
        .await
        .expect("server should start");

    let mut config = server.config();
    config.custom_action.stdin_capture = StdinCapture::ToEnd;
    let command = SessionCommand::from_config(&config, Identity::KeyId("1".into()))
        .expect("session should build");

    let mut rw = ReadWriter::new(&b"0032want abc\n0000"[..], Vec::new());
    command
        .execute(CommandType::ReceivePack, TestFixtures::REPO, &mut rw)
        .await
        .expect("session should succeed");

    assert_custom_action_output(&server.requests_to(PUSH)[0], b"0032want abc\n0000");
}
