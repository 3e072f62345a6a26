use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "anchorplace_headless_{:016x}",
        rand::random::<u64>()
    ));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_script(dir: &Path, steps: Value) -> PathBuf {
    let path = dir.join("script.json");
    fs::write(&path, json!({ "steps": steps }).to_string()).expect("write script");
    path
}

fn read_events(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("event log exists")
        .lines()
        .map(|line| serde_json::from_str(line).expect("event line is json"))
        .collect()
}

fn run_headless(dir: &Path, script: &Path, extra: &[&str]) -> std::process::Output {
    run_with_config(dir, &dir.join("missing.toml"), script, extra)
}

fn run_with_config(
    dir: &Path,
    config: &Path,
    script: &Path,
    extra: &[&str],
) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_anchorplace"))
        .arg("--config")
        .arg(config)
        .arg("--event-script")
        .arg(script)
        .arg("--event-log")
        .arg(dir.join("events.jsonl"))
        .arg("--metrics-out")
        .arg(dir.join("metrics.json"))
        .args(extra)
        .output()
        .expect("spawn anchorplace")
}

#[test]
fn tap_measure_release_session() {
    let dir = scratch_dir();
    let script = write_script(
        &dir,
        json!([
            { "tick": 2, "command": "tap 0.2 0 -1.5" },
            { "tick": 3, "command": "tap 1 0 -1" },
            { "tick": 4, "command": "scale 2 2 2" },
            { "tick": 6, "command": "release" }
        ]),
    );

    let output = run_headless(&dir, &script, &["--max-ticks", "10"]);
    assert!(
        output.status.success(),
        "anchorplace failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let events = read_events(&dir.join("events.jsonl"));
    let kinds: Vec<&str> = events
        .iter()
        .map(|event| event["kind"].as_str().expect("kind is a string"))
        .collect();

    // Preview on ticks 0-1, lock at 2, ignored tap at 3, rescale at 4,
    // release at 6 and fresh previews from then on.
    assert_eq!(
        kinds,
        vec![
            "preview",
            "preview",
            "lock",
            "measurement",
            "tap_ignored",
            "measurement",
            "release",
            "preview",
            "preview",
            "preview",
            "preview",
            "session_end",
        ]
    );

    let first = &events[3];
    assert_eq!(first["tick"], 2);
    assert_eq!(first["payload"]["display"], "X = 45.0 Y = 55.0 Z = 25.0");
    assert_eq!(
        first["payload"]["shadows"],
        json!({ "casts": false, "receives": false })
    );
    let rescaled = &events[5];
    assert_eq!(rescaled["tick"], 4);
    assert_eq!(rescaled["payload"]["display"], "X = 90.0 Y = 110.0 Z = 50.0");

    let metrics: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("metrics.json")).expect("metrics"))
            .expect("metrics json");
    assert_eq!(metrics["session_name"], "script");
    assert_eq!(metrics["result"], "pass");
    assert_eq!(metrics["placement"]["locks"], 1);
    assert_eq!(metrics["placement"]["taps_ignored"], 1);
    assert_eq!(metrics["placement"]["leaked_anchors"], 0);
    assert_eq!(metrics["tracking"]["stable_frames"], 10);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn tracking_loss_and_pause_suppress_previews() {
    let dir = scratch_dir();
    let script = write_script(
        &dir,
        json!([
            { "tick": 1, "command": "tracking lost" },
            { "tick": 2, "command": "tap 0 0 -1" },
            { "tick": 3, "command": "tracking stable" },
            { "tick": 3, "command": "session pause" },
            { "tick": 5, "command": "session resume" }
        ]),
    );

    let output = run_headless(&dir, &script, &["--max-ticks", "6"]);
    assert!(output.status.success());

    let events = read_events(&dir.join("events.jsonl"));
    let timeline: Vec<(u64, &str)> = events
        .iter()
        .map(|event| {
            (
                event["tick"].as_u64().expect("tick"),
                event["kind"].as_str().expect("kind"),
            )
        })
        .collect();
    assert_eq!(
        timeline,
        vec![
            (0, "preview"),
            (2, "tap_failed"),
            (5, "preview"),
            (6, "session_end"),
        ]
    );

    let metrics: Value =
        serde_json::from_str(&fs::read_to_string(dir.join("metrics.json")).expect("metrics"))
            .expect("metrics json");
    assert_eq!(metrics["tracking"]["stable_frames"], 2);
    assert_eq!(metrics["tracking"]["not_tracking_frames"], 2);
    assert_eq!(metrics["tracking"]["missing_frames"], 2);
    assert_eq!(metrics["placement"]["tap_failures"], 1);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn shadow_setting_reaches_measurement_events() {
    let dir = scratch_dir();
    let config = dir.join("placement.toml");
    fs::write(&config, "renderable = \"cube\"\nshadows = true\n").expect("write config");
    let script = write_script(&dir, json!([{ "tick": 1, "command": "tap 0 0 -1" }]));

    let output = run_with_config(&dir, &config, &script, &["--max-ticks", "3"]);
    assert!(output.status.success());

    let events = read_events(&dir.join("events.jsonl"));
    let measurement = events
        .iter()
        .find(|event| event["kind"] == "measurement")
        .expect("lock is measured");
    assert_eq!(measurement["payload"]["display"], "X = 20.0 Y = 20.0 Z = 20.0");
    assert_eq!(
        measurement["payload"]["shadows"],
        json!({ "casts": true, "receives": true })
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_script_is_rejected() {
    let dir = scratch_dir();
    let script = write_script(&dir, json!([{ "tick": 0, "command": "hover" }]));

    let output = run_headless(&dir, &script, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hover"), "unexpected stderr: {stderr}");

    fs::remove_dir_all(&dir).ok();
}
