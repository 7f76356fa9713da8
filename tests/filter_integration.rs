//! Integration tests for the hotswap binary
//!
//! These tests drive the full pipeline:
//! - Writing the default persona file on first use
//! - Filtering request bodies through `hotswap inlet`
//! - Status events on stderr
//! - Listing and validating personas

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

/// Helper to get the hotswap binary path
fn hotswap_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/hotswap
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("hotswap");
    path
}

/// Write a config whose persona cache lives under `dir`
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config_path = dir.join("hotswap.yaml");
    let config = format!(
        "filter:\n  cache_directory: {}\n  status_message_auto_close_delay_ms: 10\n{}",
        dir.join("cache").display(),
        extra
    );
    fs::write(&config_path, config).unwrap();
    config_path
}

fn persona_file(dir: &Path) -> PathBuf {
    dir.join("cache").join("agent_hotswap").join("personas.json")
}

/// Run hotswap with `args`, feeding `input` on stdin
fn run_hotswap(dir: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(hotswap_binary())
        .env("HOTSWAP_DIR", dir)
        .env("XDG_DATA_HOME", dir.join("data"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute hotswap");

    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().expect("Failed to wait for hotswap")
}

fn json_lines(bytes: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|l| l.trim_start().starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn body(messages: Value) -> String {
    serde_json::json!({ "model": "test-model", "messages": messages }).to_string()
}

#[test]
fn test_inlet_switches_persona_and_persists() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let config = config.to_str().unwrap();

    let first = body(serde_json::json!([{"role": "user", "content": "!coder write a sort function"}]));
    let second = body(serde_json::json!([
        {"role": "user", "content": "!coder write a sort function"},
        {"role": "assistant", "content": "fn sort() {}"},
        {"role": "user", "content": "now in reverse"}
    ]));
    let input = format!("{}\n{}\n", first, second);

    let output = run_hotswap(temp.path(), &["-c", config, "inlet"], &input);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bodies = json_lines(&output.stdout);
    assert_eq!(bodies.len(), 2);

    let messages = bodies[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("**Active Persona**: 💻 Code Assistant"));
    assert!(messages[1]["content"].as_str().unwrap().ends_with("write a sort function"));
    assert_eq!(bodies[0]["model"], "test-model");

    let messages = bodies[1]["messages"].as_array().unwrap();
    let system_count = messages.iter().filter(|m| m["role"] == "system").count();
    assert_eq!(system_count, 1);
    assert_eq!(messages.last().unwrap()["content"], "now in reverse");

    assert!(persona_file(temp.path()).exists());
}

#[test]
fn test_inlet_emits_status_events() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let input = body(serde_json::json!([{"role": "user", "content": "!list"}]));

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "inlet"], &input);
    assert!(output.status.success());

    let events = json_lines(&output.stderr);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "status");
    assert_eq!(events[0]["data"]["description"], "📋 Preparing persona list table and reset info...");
    assert_eq!(events[1]["data"]["close"], true);
    assert_eq!(events[0]["message_id"], events[1]["message_id"]);

    let bodies = json_lines(&output.stdout);
    let content = bodies[0]["messages"][0]["content"].as_str().unwrap();
    assert!(content.contains("| `!analyst` | 📊 Data Analyst | `!coder` | 💻 Code Assistant |"));
}

#[test]
fn test_inlet_off_leaves_messages_untouched() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let input = body(serde_json::json!([{"role": "user", "content": "!coder hi"}]));

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "inlet", "--off"], &input);
    assert!(output.status.success());

    let bodies = json_lines(&output.stdout);
    assert_eq!(bodies[0]["messages"], serde_json::json!([{"role": "user", "content": "!coder hi"}]));
}

#[test]
fn test_inlet_uses_configured_personas() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "  keyword_prefix: \"@\"\n");
    let personas = persona_file(temp.path());
    fs::create_dir_all(personas.parent().unwrap()).unwrap();
    fs::write(
        &personas,
        r#"{"pirate": {"name": "🏴‍☠️ Pirate", "prompt": "Speak like a pirate.", "description": "Arr"}}"#,
    )
    .unwrap();

    let input = body(serde_json::json!([{"role": "user", "content": "@pirate hello"}]));
    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "inlet", "--no-wait"], &input);
    assert!(output.status.success());

    let bodies = json_lines(&output.stdout);
    let system = bodies[0]["messages"][0]["content"].as_str().unwrap();
    assert!(system.starts_with("Speak like a pirate."));
    assert!(system.ends_with("🎭 **Active Persona**: 🏴‍☠️ Pirate"));
}

#[test]
fn test_inlet_survives_malformed_and_null_bodies() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let input = format!(
        "{}\nnot json\n{{\"messages\": null}}\n{}\n",
        body(serde_json::json!([{"role": "user", "content": "!coder"}])),
        body(serde_json::json!([{"role": "user", "content": "hi"}]))
    );

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "inlet", "--no-wait"], &input);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "not json");

    let last: Value = serde_json::from_str(lines[3]).unwrap();
    assert_eq!(last["messages"][0]["role"], "system");
}

#[test]
fn test_outlet_passthrough() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let input = format!(
        "not json\n{}\n",
        body(serde_json::json!([{"role": "assistant", "content": "!reset"}]))
    );

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "outlet"], &input);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("not json\n"));

    let bodies = json_lines(&output.stdout);
    assert_eq!(bodies[0]["messages"], serde_json::json!([{"role": "assistant", "content": "!reset"}]));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "list", "-o", "json"], "");
    assert!(output.status.success());

    let personas: Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&String> = personas.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["coder", "writer", "analyst", "teacher", "researcher"]);
}

#[test]
fn test_validate_reports_problems() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"coder": {"prompt": "p", "description": "d"}}"#).unwrap();

    let output = run_hotswap(
        temp.path(),
        &["-c", config.to_str().unwrap(), "validate", bad.to_str().unwrap()],
        "",
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Persona 'coder': Missing required field: name"));
}

#[test]
fn test_init_writes_persona_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    let output = run_hotswap(temp.path(), &["-c", config.to_str().unwrap(), "init"], "");
    assert!(output.status.success());
    assert!(persona_file(temp.path()).exists());

    let output = run_hotswap(
        temp.path(),
        &["-c", config.to_str().unwrap(), "validate", persona_file(temp.path()).to_str().unwrap()],
        "",
    );
    assert!(output.status.success());
}
