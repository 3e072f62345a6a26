use crate::config::PlacementConfig;
use crate::event_script::{EventScriptPlayer, ScriptCommand};
use anchorplace_core::{FrameTick, NodeId, Pose};
use anchorplace_placement::{
    BoundingFootprint, FrameOutcome, LogMeasurementSink, MeasurementSink, PlacementController,
    PlacementStats, TapOutcome, TrackingSession,
};
use anchorplace_sim::{sim_pair, SimScene, SimTracking};
use anchorplace_testkit::{
    EventRecord, ExecutionMetrics, JsonlSink, MetricsReportBuilder, MetricsSink, PlacementMetrics,
    TrackingMetrics,
};
use anyhow::Result;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

pub struct HeadlessConfig {
    pub config: PlacementConfig,
    pub event_script: Option<PathBuf>,
    pub max_ticks: u64,
    pub seed: u64,
    pub event_log: Option<PathBuf>,
    pub metrics_out: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub ticks: u64,
    pub commands: u64,
    pub stats: PlacementStats,
    pub tracking: TrackingMetrics,
    pub last_footprint: Option<BoundingFootprint>,
    pub leaked_anchors: u64,
    pub leaked_nodes: u64,
    pub double_detaches: u64,
}

impl RunSummary {
    pub fn placement_metrics(&self) -> PlacementMetrics {
        PlacementMetrics {
            anchors_created: self.stats.anchors_created,
            anchors_detached: self.stats.anchors_detached,
            previews_placed: self.stats.previews_placed,
            preview_failures: self.stats.preview_failures,
            locks: self.stats.locks,
            tap_failures: self.stats.tap_failures,
            taps_ignored: self.stats.taps_ignored,
            releases: self.stats.releases,
            leaked_anchors: self.leaked_anchors,
            leaked_nodes: self.leaked_nodes,
            double_detaches: self.double_detaches,
        }
    }
}

/// Logs each footprint and queues it for the event log.
#[derive(Default)]
struct SessionSink {
    pending: Vec<(NodeId, BoundingFootprint)>,
    last: Option<BoundingFootprint>,
}

impl MeasurementSink for SessionSink {
    fn on_measurement(&mut self, node: NodeId, footprint: &BoundingFootprint) {
        LogMeasurementSink.on_measurement(node, footprint);
        self.pending.push((node, *footprint));
        self.last = Some(*footprint);
    }
}

type Controller = PlacementController<SimTracking, SimScene, SessionSink>;

struct EventLog {
    sink: Option<JsonlSink>,
}

impl EventLog {
    fn record(&mut self, tick: FrameTick, kind: &str, payload: Value) -> Result<()> {
        debug!(tick = tick.0, kind, %payload, "session event");
        match self.sink.as_mut() {
            Some(sink) => sink.write(&EventRecord {
                tick,
                kind,
                payload,
            }),
            None => Ok(()),
        }
    }
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let started = Instant::now();
    let renderable = cfg.config.renderable()?;
    let mut script = match cfg.event_script.as_deref() {
        Some(path) => Some(EventScriptPlayer::from_path(path)?),
        None => None,
    };
    let mut log = EventLog {
        sink: cfg.event_log.as_deref().map(JsonlSink::create).transpose()?,
    };

    let (mut tracking, mut scene, _journal) = sim_pair(cfg.seed);
    tracking.set_dropout(cfg.config.tracking_dropout);
    scene.set_spawn_scale(cfg.config.world_scale());
    let mut controller = PlacementController::with_sink(
        tracking,
        scene,
        renderable,
        cfg.config.settings(),
        SessionSink::default(),
    );

    info!(
        seed = cfg.seed,
        max_ticks = cfg.max_ticks,
        renderable = %cfg.config.renderable,
        "headless placement session starting"
    );

    let mut frames = TrackingMetrics::default();
    let mut commands = 0u64;
    let mut tick = FrameTick::ZERO;
    for _ in 0..cfg.max_ticks {
        if let Some(script) = script.as_mut() {
            for command in script.drain_ready_commands(tick) {
                apply_command(&mut controller, &mut log, tick, &command)?;
                commands += 1;
            }
        }

        controller.tracking_mut().advance(tick);
        match controller.tracking().current_frame() {
            None => frames.missing_frames += 1,
            Some(frame) if frame.quality.is_stable() => frames.stable_frames += 1,
            Some(_) => frames.not_tracking_frames += 1,
        }

        match controller.on_tracking_frame() {
            FrameOutcome::PreviewPlaced(node) => {
                let position = controller
                    .preview_node()
                    .map(|preview| preview.pose().translation.to_array());
                log.record(tick, "preview", json!({ "node": node.0, "position": position }))?;
            }
            FrameOutcome::PreviewUnavailable => {
                log.record(tick, "preview_unavailable", Value::Null)?;
            }
            FrameOutcome::Ignored(_) => {}
        }
        flush_measurements(&mut controller, &mut log, tick)?;
        tick = tick.advance(1);
    }

    if let Some(script) = script.as_ref().filter(|script| !script.is_finished()) {
        tracing::warn!(
            last_tick = ?script.last_tick(),
            "event script has steps beyond --max-ticks"
        );
    }

    controller.teardown();
    let summary = RunSummary {
        ticks: cfg.max_ticks,
        commands,
        stats: controller.stats(),
        tracking: frames,
        last_footprint: controller.sink().last,
        leaked_anchors: controller.tracking().live_anchors() as u64,
        leaked_nodes: controller.scene().live_nodes() as u64,
        double_detaches: controller.tracking().double_detaches()
            + controller.scene().unknown_detaches(),
    };
    log.record(
        tick,
        "session_end",
        json!({ "stats": summary.stats, "leaked_anchors": summary.leaked_anchors }),
    )?;
    if let Some(sink) = log.sink.as_mut() {
        sink.flush()?;
    }

    if let Some(path) = cfg.metrics_out.as_deref() {
        let session_name = cfg
            .event_script
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "headless".to_string());
        let mut builder = MetricsReportBuilder::new(session_name)
            .seed(cfg.seed)
            .placement(summary.placement_metrics())
            .tracking(summary.tracking.clone())
            .execution(ExecutionMetrics {
                ticks: summary.ticks,
                commands: summary.commands,
                duration_seconds: started.elapsed().as_secs_f64(),
            });
        if let Some(footprint) = summary.last_footprint {
            builder = builder.last_footprint([footprint.width, footprint.height, footprint.depth]);
        }
        MetricsSink::create(path)?.write(&builder.build())?;
    }

    info!(
        locks = summary.stats.locks,
        releases = summary.stats.releases,
        previews = summary.stats.previews_placed,
        "headless placement session finished"
    );
    Ok(summary)
}

fn apply_command(
    controller: &mut Controller,
    log: &mut EventLog,
    tick: FrameTick,
    command: &ScriptCommand,
) -> Result<()> {
    debug!(tick = tick.0, kind = command.kind(), ?command, "applying script command");
    match command {
        ScriptCommand::Tap(position) => {
            match controller.on_tap(Pose::from_translation(*position)) {
                Ok(TapOutcome::Locked { node, measurement }) => {
                    log.record(
                        tick,
                        "lock",
                        json!({ "node": node.0, "position": position.to_array() }),
                    )?;
                    if let Err(err) = measurement {
                        log.record(
                            tick,
                            "measurement_failed",
                            json!({ "node": node.0, "error": err.to_string() }),
                        )?;
                    }
                }
                Ok(TapOutcome::IgnoredWhileLocked) => {
                    log.record(tick, "tap_ignored", Value::Null)?;
                }
                Err(err) => {
                    log.record(tick, "tap_failed", json!({ "error": err.to_string() }))?;
                }
            }
        }
        ScriptCommand::Release => {
            if controller.on_release_command() {
                log.record(tick, "release", Value::Null)?;
            }
        }
        ScriptCommand::Tracking(mode) => controller.tracking_mut().set_mode(*mode),
        ScriptCommand::Session(running) => controller.tracking_mut().set_running(*running),
        ScriptCommand::Look { yaw, pitch } => controller
            .tracking_mut()
            .camera_mut()
            .rotate(yaw.to_radians(), pitch.to_radians()),
        ScriptCommand::Scale(scale) => match controller.locked_node().map(|n| n.node()) {
            Some(node) => {
                controller.scene_mut().set_world_scale(node, *scale);
                if let Some(Err(err)) = controller.measure_locked() {
                    log.record(
                        tick,
                        "measurement_failed",
                        json!({ "node": node.0, "error": err.to_string() }),
                    )?;
                }
            }
            None => controller.scene_mut().set_spawn_scale(*scale),
        },
    }
    flush_measurements(controller, log, tick)
}

fn flush_measurements(controller: &mut Controller, log: &mut EventLog, tick: FrameTick) -> Result<()> {
    let pending = std::mem::take(&mut controller.sink_mut().pending);
    for (node, footprint) in pending {
        let shadows = controller.scene().node(node).map(|placed| {
            json!({ "casts": placed.casts_shadows, "receives": placed.receives_shadows })
        });
        log.record(
            tick,
            "measurement",
            json!({
                "node": node.0,
                "footprint": footprint,
                "display": footprint.to_string(),
                "shadows": shadows,
            }),
        )?;
    }
    Ok(())
}
