//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data
//! directory and checks stdout, stderr and the exit code.

use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const RUN_LOCK: &str = "timerdeck-run.pid";

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timerdeck"))
        .args(args)
        .env("TIMERDECK_DATA_DIR", data_dir)
        .env("TIMERDECK_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[derive(Deserialize)]
struct Group {
    category: String,
    color: String,
    timers: Vec<TimerJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerJson {
    id: String,
    name: String,
    duration: u64,
    remaining_time: u64,
    status: String,
    halfway_alert: bool,
}

fn list(data_dir: &Path) -> Vec<Group> {
    let (stdout, stderr, code) = run_cli(data_dir, &["timer", "list", "--json"]);
    assert_eq!(code, 0, "timer list failed: {stderr}");
    serde_json::from_str(&stdout).expect("list output is JSON")
}

fn add(data_dir: &Path, name: &str, duration: &str, category: &str) -> String {
    let (stdout, stderr, code) = run_cli(
        data_dir,
        &["timer", "add", name, "--duration", duration, "--category", category],
    );
    assert_eq!(code, 0, "timer add failed: {stderr}");
    assert!(stdout.starts_with("created "), "unexpected output: {stdout}");
    list(data_dir)
        .into_iter()
        .flat_map(|g| g.timers)
        .find(|t| t.name == name)
        .expect("created timer is listed")
        .id
}

#[test]
fn test_timer_add_and_list() {
    let dir = TempDir::new().unwrap();
    add(dir.path(), "Plank", "1:30", "Workout");
    add(dir.path(), "Reading", "25:00", "Study");

    let groups = list(dir.path());
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].category, "Workout");
    assert_eq!(groups[0].color, "#FF6B6B");
    let plank = &groups[0].timers[0];
    assert_eq!(plank.duration, 90);
    assert_eq!(plank.remaining_time, 90);
    assert_eq!(plank.status, "idle");
    assert!(!plank.halfway_alert);
}

#[test]
fn test_timer_add_rejects_zero_duration() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["timer", "add", "Nothing", "--duration", "abc", "--category", "Work"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(list(dir.path()).is_empty());
}

#[test]
fn test_timer_add_rejects_blank_name() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(
        dir.path(),
        &["timer", "add", "   ", "--duration", "10", "--category", "Work"],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_timer_start_pause_by_prefix() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Stretch", "45", "Workout");

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "start", &id[..8]]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("started"), "stdout: {stdout}");

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "show", &id]);
    assert_eq!(code, 0);
    let shown: TimerJson = serde_json::from_str(&stdout).unwrap();
    assert_eq!(shown.status, "running");

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "pause", &id]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("paused"), "stdout: {stdout}");

    // Pausing again changes nothing.
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "pause", &id]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "no change");
}

#[test]
fn test_timer_delete() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Tea", "3:00", "Cooking");

    let (stdout, _, code) = run_cli(dir.path(), &["timer", "delete", &id]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("deleted"));
    assert!(list(dir.path()).is_empty());

    let (_, _, code) = run_cli(dir.path(), &["timer", "show", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_category_start_skips_completed_and_counts() {
    let dir = TempDir::new().unwrap();
    add(dir.path(), "Squats", "30", "Workout");
    add(dir.path(), "Pushups", "30", "Workout");
    add(dir.path(), "Notes", "30", "Study");

    let (stdout, _, code) = run_cli(dir.path(), &["category", "start", "Workout"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Workout: 2 timer(s) now running");

    let groups = list(dir.path());
    let study = groups.iter().find(|g| g.category == "Study").unwrap();
    assert_eq!(study.timers[0].status, "idle");
}

#[test]
fn test_category_palette() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["category", "palette"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 8);
    assert!(stdout.contains("Meditation"));
}

#[test]
fn test_theme_toggle_persists() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, _) = run_cli(dir.path(), &["theme", "show"]);
    assert_eq!(stdout.trim(), "light");

    let (stdout, _, code) = run_cli(dir.path(), &["theme", "toggle"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "dark");

    let (stdout, _, _) = run_cli(dir.path(), &["theme", "show"]);
    assert_eq!(stdout.trim(), "dark");

    let (_, _, code) = run_cli(dir.path(), &["theme", "set", "sepia"]);
    assert_ne!(code, 0);
}

#[test]
fn test_history_export_to_file() {
    let dir = TempDir::new().unwrap();
    add(dir.path(), "Rest", "1:00", "Break");
    let out = dir.path().join("export.json");

    let (_, stderr, code) = run_cli(
        dir.path(),
        &["history", "export", "--output", out.to_str().unwrap()],
    );
    assert_eq!(code, 0, "export failed: {stderr}");

    let bundle: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(bundle["timers"].as_array().unwrap().len(), 1);
    assert!(bundle["history"].as_array().unwrap().is_empty());
    assert!(bundle["exportedAt"].is_string());
}

#[test]
fn test_run_until_idle_completes_short_timer() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Blink", "2", "Other");
    run_cli(dir.path(), &["timer", "start", &id]);

    let started = Instant::now();
    let (stdout, stderr, code) = run_cli(dir.path(), &["run", "--until-idle"]);
    assert_eq!(code, 0, "run failed: {stderr}");
    assert!(stdout.contains("completed: Blink [Other]"), "stdout: {stdout}");
    // One tick per wall-clock second.
    assert!(started.elapsed() >= Duration::from_millis(1900));

    let (stdout, _, _) = run_cli(dir.path(), &["history", "list", "--json"]);
    let history: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["name"], "Blink");

    let (stdout, _, _) = run_cli(dir.path(), &["timer", "show", &id]);
    let shown: TimerJson = serde_json::from_str(&stdout).unwrap();
    assert_eq!(shown.status, "completed");
    assert_eq!(shown.remaining_time, 0);
    assert!(!dir.path().join(RUN_LOCK).exists());
}

#[test]
fn test_mutations_refused_while_run_is_ticking() {
    let dir = TempDir::new().unwrap();
    let id = add(dir.path(), "Long", "60", "Work");
    run_cli(dir.path(), &["timer", "start", &id]);

    let mut runner = Command::new(env!("CARGO_BIN_EXE_timerdeck"))
        .arg("run")
        .env("TIMERDECK_DATA_DIR", dir.path())
        .env("TIMERDECK_LOG", "off")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn runner");

    let lock = dir.path().join(RUN_LOCK);
    let deadline = Instant::now() + Duration::from_secs(10);
    while !lock.exists() {
        assert!(Instant::now() < deadline, "runner never took the lock");
        std::thread::sleep(Duration::from_millis(20));
    }

    let refused = [
        vec!["timer", "add", "Added", "-d", "30", "-c", "Study"],
        vec!["timer", "pause", id.as_str()],
        vec!["category", "pause", "Work"],
        vec!["history", "clear"],
        vec!["run", "--until-idle"],
    ];
    for args in &refused {
        let (_, stderr, code) = run_cli(dir.path(), args);
        assert_eq!(code, 1, "{args:?} should be refused");
        assert!(
            stderr.contains("timers are being ticked by another process"),
            "{args:?} stderr: {stderr}"
        );
    }

    // Reads still work.
    let groups = list(dir.path());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].timers[0].name, "Long");

    runner.kill().unwrap();
    runner.wait().unwrap();

    // A lock left behind by a dead runner does not block anything.
    add(dir.path(), "Added", "30", "Study");
    let names: Vec<String> = list(dir.path())
        .into_iter()
        .flat_map(|g| g.timers)
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["Long", "Added"]);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "display.show_completed"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "ticker.interval_ms", "50"]);
    assert_eq!(code, 1, "tick cadence is fixed: {stderr}");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "notifications.bell", "true"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "notifications.bell"]);
    assert_eq!(stdout.trim(), "true");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}
