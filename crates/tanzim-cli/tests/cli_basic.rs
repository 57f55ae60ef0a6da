//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway HOME so the
//! real configuration and database are never touched.

use std::path::Path;
use std::process::Command;

fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "tanzim-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env("TANZIM_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_fixtures(dir: &Path) -> (String, String) {
    let qalib = dir.join("weekday.qalib");
    std::fs::write(&qalib, "05:00\n2 Study\n.15 Coffee\n8 Sleep\n").unwrap();

    let prayer_times = dir.join("prayer_times.json");
    std::fs::write(
        &prayer_times,
        r#"{"fajr":"05:30","dhuhr":"13:00","asr":"16:30","maghrib":"19:45","isha":"21:30"}"#,
    )
    .unwrap();

    (
        qalib.to_string_lossy().into_owned(),
        prayer_times.to_string_lossy().into_owned(),
    )
}

#[test]
fn compile_show_shrink_export_flow() {
    let home = tempfile::tempdir().unwrap();
    let (qalib, prayer_times) = write_fixtures(home.path());

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &["template", "set", "weekday", &qalib],
    );
    assert_eq!(code, 0, "template set failed: {stderr}");
    assert!(stdout.contains("weekday"));

    let (stdout, _, code) = run_cli(home.path(), &["template", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("weekday"));

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "plan",
            "compile",
            "weekday",
            "--date",
            "2026-03-02",
            "--prayer-times",
            &prayer_times,
        ],
    );
    assert_eq!(code, 0, "plan compile failed: {stderr}");
    assert!(stdout.contains("Fajr"));
    assert!(stdout.contains("Study"));
    assert!(stdout.contains("to plan:"));

    let (stdout, _, code) = run_cli(
        home.path(),
        &["plan", "show", "--date", "2026-03-02", "--json"],
    );
    assert_eq!(code, 0);
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(!plan["events"].as_array().unwrap().is_empty());

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &["shrink", "06:00", "06:30", "--date", "2026-03-02"],
    );
    assert_eq!(code, 0, "shrink failed: {stderr}");
    assert!(stdout.contains("Unplanned Surprise"));

    let (stdout, _, code) = run_cli(home.path(), &["export", "--date", "2026-03-02"]);
    assert_eq!(code, 0);
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"Wake-up"));
    assert!(names.contains(&"Unplanned Surprise"));
}

#[test]
fn compile_rejects_a_template_that_never_parses() {
    let home = tempfile::tempdir().unwrap();
    let bad = home.path().join("bad.qalib");
    std::fs::write(&bad, "2 Study\n05:00\n").unwrap();

    let (_, stderr, code) = run_cli(
        home.path(),
        &["template", "set", "bad", bad.to_string_lossy().as_ref()],
    );
    assert_ne!(code, 0);
    assert!(!stderr.is_empty());
}

#[test]
fn config_show_prints_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("wake_margin_minutes"));
}
