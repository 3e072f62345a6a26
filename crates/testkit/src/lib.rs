#![warn(missing_docs)]
//! Deterministic testing surfaces for placement sessions: event log, golden
//! snapshots, tick-stepped harness and metrics export.

mod metrics;
mod session_test;
mod snapshot;

use anchorplace_core::FrameTick;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use metrics::*;
pub use session_test::*;
pub use snapshot::*;

/// One line of a session event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Frame tick when the event occurred.
    pub tick: FrameTick,
    /// Event kind label (`preview`, `lock`, `measurement`, ...).
    pub kind: &'a str,
    /// Structured event details.
    pub payload: Value,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    out: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of events written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!(%err, "event log flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn jsonl_sink_writes_one_line_per_event() {
        let path = std::env::temp_dir().join(format!(
            "anchorplace-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        {
            let mut sink = JsonlSink::create(&path).expect("sink create");
            sink.write(&EventRecord {
                tick: FrameTick(3),
                kind: "preview",
                payload: json!({ "node": 1 }),
            })
            .expect("write");
            sink.write(&EventRecord {
                tick: FrameTick(4),
                kind: "release",
                payload: Value::Null,
            })
            .expect("write");
            assert_eq!(sink.written(), 2);
        }

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["tick"], 3);
        assert_eq!(first["kind"], "preview");
        assert_eq!(first["payload"]["node"], 1);
        fs::remove_file(&path).ok();
    }
}
