//! Tick-stepped session harness for snapshot tests.
//!
//! A session test steps some state once per frame tick and snapshots it after
//! every step. Only frames whose snapshot differs from the previous one are
//! kept, so long sessions stay readable as golden files.

use crate::snapshot::assert_json_snapshot;
use anchorplace_core::FrameTick;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Configuration for a session test.
#[derive(Debug, Clone)]
pub struct SessionTestConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Number of ticks to step.
    pub ticks: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// Snapshot captured after the step for `tick`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFrame {
    /// Tick that was stepped (`None` for the initial state).
    pub tick: Option<u64>,
    /// Snapshot payload.
    pub snapshot: Value,
}

/// Change-only record of a stepped session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    /// Session name.
    pub name: String,
    /// Ticks stepped.
    pub ticks: u64,
    /// Initial frame followed by every frame that changed the snapshot.
    pub frames: Vec<SessionFrame>,
}

/// Step `state` for `ticks` frames starting at [`FrameTick::ZERO`], recording
/// the snapshot whenever it changes.
pub fn record_session<State, Snapshot, StepFn, SnapFn>(
    name: impl Into<String>,
    ticks: u64,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<SessionReport>
where
    Snapshot: Serialize,
    StepFn: FnMut(FrameTick, &mut State),
    SnapFn: FnMut(&State) -> Snapshot,
{
    let capture = |snap: Snapshot| {
        serde_json::to_value(snap).context("Failed to serialize session snapshot")
    };

    let mut last = capture(snapshot(&state))?;
    let mut frames = vec![SessionFrame {
        tick: None,
        snapshot: last.clone(),
    }];

    let mut tick = FrameTick::ZERO;
    for _ in 0..ticks {
        step(tick, &mut state);
        let current = capture(snapshot(&state))?;
        if current != last {
            frames.push(SessionFrame {
                tick: Some(tick.0),
                snapshot: current.clone(),
            });
            last = current;
        }
        tick = tick.advance(1);
    }

    Ok(SessionReport {
        name: name.into(),
        ticks,
        frames,
    })
}

/// Run a session test and assert (or update) the snapshot at `config.snapshot_path`.
pub fn run_session_test<State, Snapshot, StepFn, SnapFn>(
    config: SessionTestConfig,
    state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(FrameTick, &mut State),
    SnapFn: FnMut(&State) -> Snapshot,
{
    let report = record_session(config.name, config.ticks, state, step, snapshot)?;
    assert_json_snapshot(config.snapshot_path, &report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unchanged_frames_are_dropped() {
        let report = record_session(
            "counter",
            6,
            0u32,
            |tick, count| {
                if tick.0 % 3 == 0 {
                    *count += 1;
                }
            },
            |count| *count,
        )
        .expect("records");

        let ticks: Vec<Option<u64>> = report.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![None, Some(0), Some(3)]);
        assert_eq!(report.frames[2].snapshot, json!(2));
        assert_eq!(report.ticks, 6);
    }
}
