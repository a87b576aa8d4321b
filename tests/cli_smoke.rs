#![allow(clippy::unwrap_used)]
//! CLI smoke tests to verify basic command functionality.
//!
//! Every test points `XDG_CONFIG_HOME` at a fresh temp dir so no real
//! config file is read or written. Nothing leaves the machine: translation
//! runs against a local mock server.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(deprecated)]
fn chat_translator(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chat-translator").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Translate multiplayer chat messages"))
        .stdout(predicate::str::contains("translate"))
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("set"));
}

#[test]
fn test_version_displays_version() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_configure_show_masks_key() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["set", "api-key", "AIzaSyD-smoke-test-4321"])
        .assert()
        .success();

    chat_translator(&home)
        .args(["configure", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current settings"))
        .stdout(predicate::str::contains("********4321"))
        .stdout(predicate::str::contains("smoke-test").not());
}

#[test]
fn test_set_writes_config_file() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["set", "model", "gemini-2.0-flash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.0-flash"));

    let contents =
        std::fs::read_to_string(home.path().join("chat-translator").join("config.toml")).unwrap();
    assert!(contents.contains("model = \"gemini-2.0-flash\""));
}

#[test]
fn test_set_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["set", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn test_set_invalid_value_fails() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["set", "max-retries", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_translate_without_key_fails() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["translate", "Bonjour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key"));
}

#[test]
fn test_run_without_key_warns_and_exits() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .write_stdin("Anuke: Bonjour le monde\n\nserver restarting\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no API key configured"));
}

#[test]
fn test_run_when_disabled_is_silent() {
    let home = TempDir::new().unwrap();
    chat_translator(&home)
        .args(["set", "enabled", "false"])
        .assert()
        .success();

    chat_translator(&home)
        .arg("run")
        .write_stdin("Anuke: Bonjour\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no API key configured").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_survives_invalid_utf8_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "Hello world [fr]" }] } }]
                }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let endpoint = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        chat_translator(&home)
            .args(["set", "api-key", "test-key"])
            .assert()
            .success();
        chat_translator(&home)
            .args(["set", "endpoint", &endpoint])
            .assert()
            .success();

        chat_translator(&home)
            .arg("run")
            .write_stdin(b"Anuke: Bonjour le monde\nKasi: \xff\xfe caf\xe9\n".to_vec())
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Anuke: Hello world [fr]"), "{stdout}");
}
