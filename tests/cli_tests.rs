// tests/cli_tests.rs
// The `botsim-analyzer` binary, run from a scratch working directory.

use std::fs;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;

fn run_in(dir: &TempDir, log_arg: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_botsim-analyzer"))
        .arg(log_arg)
        .current_dir(dir.path())
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn botsim-analyzer")
}

#[test]
fn missing_log_file_fails_without_report() {
    let tmp = TempDir::new().unwrap();
    let out = run_in(&tmp, "nope.jsonl");

    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Error: Log file not found at nope.jsonl"),
        "stdout was: {stdout}"
    );
    assert!(!stdout.contains("Analyzing"));
    assert!(!tmp.path().join("analysis_report.html").exists());
}

#[test]
fn analyzes_log_into_working_directory() {
    let tmp = TempDir::new().unwrap();
    let lines = [
        json!({"asctime": "2026-02-16 22:45:37,218", "event": "post.generated",
               "bot_name": "Dan", "post_content": "Hello @Steve"}),
        json!({"asctime": "2026-02-16 22:45:42,969", "event": "post.generated",
               "bot_name": "Steve", "post_content": "Hi @Dan, how are you?"}),
    ];
    let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
    fs::write(tmp.path().join("sim.jsonl"), body).unwrap();

    let out = run_in(&tmp, "sim.jsonl");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Analyzing sim.jsonl..."));
    assert!(stdout.contains("Analysis complete! Report saved to analysis_report.html"));
    let html = fs::read_to_string(tmp.path().join("analysis_report.html")).unwrap();
    assert!(html.contains("data:image/png;base64,iVBOR"));
}

#[test]
fn log_without_posts_exits_cleanly() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("quiet.jsonl"), "{\"event\": \"system.init\"}\n").unwrap();

    let out = run_in(&tmp, "quiet.jsonl");

    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("No posts found in log file."));
    assert!(!tmp.path().join("analysis_report.html").exists());
}
