//! Session metrics export.
//!
//! A run of the headless driver ends with one [`MetricsReport`], written as
//! pretty JSON for CI artifacts and regression checks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics for one session run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Run identifier (script name or test name).
    pub session_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Seed used for simulated tracking loss
    pub seed: u64,

    /// Overall run result
    pub result: RunResult,

    /// Placement state machine counters
    pub placement: PlacementMetrics,

    /// Tracking frame quality counters
    pub tracking: TrackingMetrics,

    /// Last measured footprint, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_footprint: Option<[f32; 3]>,

    /// Wall-clock execution
    pub execution: ExecutionMetrics,
}

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    /// Session ended with nothing leaked
    Pass,
    /// Leaks or double detaches were observed
    Fail,
}

/// Placement counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementMetrics {
    /// Anchors created
    pub anchors_created: u64,

    /// Anchors detached
    pub anchors_detached: u64,

    /// Preview placements
    pub previews_placed: u64,

    /// Frames where the preview anchor could not be created
    pub preview_failures: u64,

    /// Successful locks
    pub locks: u64,

    /// Taps that failed to lock
    pub tap_failures: u64,

    /// Taps ignored while locked
    pub taps_ignored: u64,

    /// Lock releases
    pub releases: u64,

    /// Anchors still live after teardown
    pub leaked_anchors: u64,

    /// Scene nodes still live after teardown
    pub leaked_nodes: u64,

    /// Detach calls for anchors that were not live
    pub double_detaches: u64,
}

impl PlacementMetrics {
    /// Whether the session released everything exactly once.
    pub fn is_clean(&self) -> bool {
        self.leaked_anchors == 0 && self.leaked_nodes == 0 && self.double_detaches == 0
    }
}

/// Tracking frame counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingMetrics {
    /// Frames with stable tracking
    pub stable_frames: u64,

    /// Frames that reported lost tracking
    pub not_tracking_frames: u64,

    /// Ticks without any frame (paused or not started)
    pub missing_frames: u64,
}

impl TrackingMetrics {
    /// Fraction of ticks that delivered a stable frame.
    pub fn stable_ratio(&self) -> f64 {
        let total = self.stable_frames + self.not_tracking_frames + self.missing_frames;
        if total == 0 {
            0.0
        } else {
            self.stable_frames as f64 / total as f64
        }
    }
}

/// Execution metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Ticks stepped
    pub ticks: u64,

    /// Script commands applied
    pub commands: u64,

    /// Total wall time (seconds)
    pub duration_seconds: f64,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with a session name
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                session_name: session_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                seed: 0,
                result: RunResult::Pass,
                placement: PlacementMetrics::default(),
                tracking: TrackingMetrics::default(),
                last_footprint: None,
                execution: ExecutionMetrics::default(),
            },
        }
    }

    /// Set seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.report.seed = seed;
        self
    }

    /// Set placement metrics; the result follows their cleanliness
    pub fn placement(mut self, metrics: PlacementMetrics) -> Self {
        self.report.result = if metrics.is_clean() {
            RunResult::Pass
        } else {
            RunResult::Fail
        };
        self.report.placement = metrics;
        self
    }

    /// Set tracking metrics
    pub fn tracking(mut self, metrics: TrackingMetrics) -> Self {
        self.report.tracking = metrics;
        self
    }

    /// Set the last footprint (width, height, depth in centimeters)
    pub fn last_footprint(mut self, footprint: [f32; 3]) -> Self {
        self.report.last_footprint = Some(footprint);
        self
    }

    /// Set execution metrics
    pub fn execution(mut self, metrics: ExecutionMetrics) -> Self {
        self.report.execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
