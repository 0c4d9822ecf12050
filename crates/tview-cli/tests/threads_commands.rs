//! Integration tests for `tview threads ...` against a mock server.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tview(home: &TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tview");
    cmd.env("TVIEW_HOME", home.path())
        .env_remove("TVIEW_SERVER_URL")
        .args(["--server", &server.uri()]);
    cmd
}

async fn mount_threads(server: &MockServer, threads: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "threads": threads })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_list_empty() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    mount_threads(&server, json!([])).await;

    tview(&home, &server)
        .args(["threads", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No threads yet."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_list_shows_titles_and_tags() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    mount_threads(
        &server,
        json!([
            { "id": "t1", "title": "Budget", "client_slug": "acme", "source_slug": "drive" },
            { "id": "t2", "title": null, "archived": true }
        ]),
    )
    .await;

    tview(&home, &server)
        .args(["threads", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t1  Budget  acme · drive"))
        .stdout(predicate::str::contains("t2  Untitled  default · n/a  [archived]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_show_renders_messages() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    mount_threads(
        &server,
        json!([{
            "id": "t1",
            "title": "Budget",
            "messages": [
                { "role": "user", "text": "What changed?" },
                {
                    "role": "assistant",
                    "text": "Travel went up.",
                    "citations": [
                        { "file": "q3.xlsx", "date": "2024-04-01" },
                        { "file": "q3.xlsx", "date": "2024-04-01" }
                    ]
                }
            ]
        }]),
    )
    .await;

    tview(&home, &server)
        .args(["threads", "show", "t1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USER"))
        .stdout(predicate::str::contains("What changed?"))
        .stdout(predicate::str::contains("ASSISTANT"))
        .stdout(predicate::str::contains("↳ q3.xlsx — 2024-04-01").count(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_show_unknown_id_fails() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    mount_threads(&server, json!([{ "id": "t1", "title": "Budget" }])).await;

    tview(&home, &server)
        .args(["threads", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread 'missing' not found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_send_blank_prompt_never_reaches_server() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/threads/t1/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    tview(&home, &server)
        .args(["threads", "send", "t1", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Message failed: Prompt is empty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_send_trims_prompt() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/threads/t1/messages"))
        .and(body_json(json!({ "prompt": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    tview(&home, &server)
        .args(["threads", "send", "t1", "  hello  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message appended to t1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_archive_reports_server_error() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/threads/t1/archive"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Thread not found" })),
        )
        .mount(&server)
        .await;

    tview(&home, &server)
        .args(["threads", "archive", "t1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Archive failed: Thread not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_threads_restore_sends_archive_false() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/threads/t1/archive"))
        .and(body_json(json!({ "archive": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    tview(&home, &server)
        .args(["threads", "restore", "t1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored thread t1"));
}

#[test]
fn test_unreachable_server_fails() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("tview")
        .env("TVIEW_HOME", home.path())
        .args(["--server", "http://127.0.0.1:1", "threads", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Connection failed"));
}
