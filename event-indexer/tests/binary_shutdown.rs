//! Shutdown tests for the event-indexer binary.
//!
//! The binary runs against a wiremock engine with its stdin held open, so only the
//! interrupt signal can end it.

#![cfg(unix)]

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

async fn start_engine() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/events/_doc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_index": "events",
            "_id": "doc-1",
            "result": "created"
        })))
        .mount(&server)
        .await;
    server
}

fn spawn_indexer(engine_url: &str) -> Child {
    Command::new(env!("CARGO_BIN_EXE_event-indexer"))
        .env("OPENSEARCH_URL", engine_url)
        .env("INDEX_NAME", "events")
        .env_remove("QUEUE_CAPACITY")
        .env_remove("SUBMIT_TIMEOUT_SECS")
        .env_remove("PROGRESS_INTERVAL_SECS")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn event-indexer")
}

async fn wait_for_submission(server: &MockServer) {
    timeout(STARTUP_TIMEOUT, async {
        loop {
            let submitted = server
                .received_requests()
                .await
                .unwrap_or_default()
                .iter()
                .any(|request| request.method.as_str() == "POST");
            if submitted {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("indexer did not submit the first record in time");
}

#[tokio::test]
async fn test_interrupt_exits_while_stdin_is_still_open() {
    let server = start_engine().await;
    let mut child = spawn_indexer(&server.uri());

    // Keep the write end open for the whole test.
    let mut stdin = child.stdin.take().expect("stdin is piped");
    writeln!(stdin, r#"{{"event":"app_open","_track_id":1}}"#).unwrap();
    stdin.flush().unwrap();

    wait_for_submission(&server).await;
    // Let the signal listener settle after the loop started.
    sleep(Duration::from_millis(200)).await;

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + EXIT_TIMEOUT;
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break Some(exit);
        }
        if Instant::now() >= deadline {
            break None;
        }
        sleep(Duration::from_millis(20)).await;
    };

    let Some(exit) = exit else {
        child.kill().ok();
        panic!("event-indexer still running {:?} after SIGINT", EXIT_TIMEOUT);
    };
    assert!(exit.success(), "unexpected exit status: {}", exit);

    drop(stdin);
}
