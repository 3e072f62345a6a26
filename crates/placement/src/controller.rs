//! Placement state machine.
//!
//! Events arrive on a single logical thread, one at a time: a tracking update
//! per rendered frame, and user taps/release commands in between. Each event
//! runs to completion before the next one is handled.

use anchorplace_core::{NodeId, PlacementError, Pose};
use anchorplace_math::compose_forward_offset;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    AnchorHandle, AttachedNode, BoundingFootprint, GeometryFallback, LogMeasurementSink,
    MeasurementReporter, MeasurementSink, Renderable, SceneGraph, TrackingSession,
};

/// Library-side tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSettings {
    /// Distance in meters the preview floats in front of the camera.
    pub preview_distance: f32,
    /// Policy for measuring non-box collision shapes.
    pub geometry_fallback: GeometryFallback,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            preview_distance: 1.0,
            geometry_fallback: GeometryFallback::BoundingBox,
        }
    }
}

/// Who owns the single live anchor.
///
/// There is never a preview and a locked node at the same time.
#[derive(Debug, PartialEq)]
pub enum PlacementState {
    /// Preview mode; the preview is absent until tracking is stable.
    Unlocked {
        /// Preview node following the camera.
        preview: Option<AttachedNode>,
    },
    /// Object fixed to a user-chosen anchor.
    Locked {
        /// The authoritative node.
        locked: AttachedNode,
    },
}

impl Default for PlacementState {
    fn default() -> Self {
        PlacementState::Unlocked { preview: None }
    }
}

impl PlacementState {
    /// Short label for logs and snapshots.
    pub fn label(&self) -> &'static str {
        match self {
            PlacementState::Unlocked { preview: None } => "unlocked",
            PlacementState::Unlocked { preview: Some(_) } => "previewing",
            PlacementState::Locked { .. } => "locked",
        }
    }

    /// Current preview node, if previewing.
    pub fn preview(&self) -> Option<&AttachedNode> {
        match self {
            PlacementState::Unlocked { preview } => preview.as_ref(),
            PlacementState::Locked { .. } => None,
        }
    }

    /// Current locked node, if locked.
    pub fn locked(&self) -> Option<&AttachedNode> {
        match self {
            PlacementState::Locked { locked } => Some(locked),
            PlacementState::Unlocked { .. } => None,
        }
    }

    /// Number of nodes this state keeps attached (0 or 1).
    pub fn attached_count(&self) -> usize {
        usize::from(self.preview().is_some()) + usize::from(self.locked().is_some())
    }
}

/// Why a tracking update did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSkip {
    /// The session has not produced a frame yet.
    NoFrame,
    /// Tracking is not stable; any existing preview is kept as is.
    NotTracking,
    /// An object is locked; previews are suspended.
    Locked,
}

/// Result of [`PlacementController::on_tracking_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Event ignored without touching any anchor.
    Ignored(FrameSkip),
    /// Preview re-anchored on a new node.
    PreviewPlaced(NodeId),
    /// Old preview released but no anchor could be created this frame.
    PreviewUnavailable,
}

/// Result of a tap that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    /// Object locked at the tapped pose.
    Locked {
        /// The new locked node.
        node: NodeId,
        /// Footprint, or why it could not be computed. The lock holds either way.
        measurement: Result<BoundingFootprint, PlacementError>,
    },
    /// Already locked; nothing changed.
    IgnoredWhileLocked,
}

/// Running counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementStats {
    /// Anchors created through the controller.
    pub anchors_created: u64,
    /// Anchors detached through the controller.
    pub anchors_detached: u64,
    /// Successful preview placements.
    pub previews_placed: u64,
    /// Frames where the preview anchor could not be created.
    pub preview_failures: u64,
    /// Successful locks.
    pub locks: u64,
    /// Taps that failed to lock.
    pub tap_failures: u64,
    /// Taps ignored because an object was already locked.
    pub taps_ignored: u64,
    /// Release commands that dropped a lock.
    pub releases: u64,
}

impl PlacementStats {
    /// Anchors created but not yet detached.
    pub fn live_anchors(&self) -> u64 {
        self.anchors_created.saturating_sub(self.anchors_detached)
    }
}

/// Owns the placement state and drives both collaborators.
pub struct PlacementController<T, S, M = LogMeasurementSink> {
    tracking: T,
    scene: S,
    sink: M,
    renderable: Renderable,
    settings: PlacementSettings,
    reporter: MeasurementReporter,
    state: PlacementState,
    stats: PlacementStats,
}

impl<T, S> PlacementController<T, S, LogMeasurementSink>
where
    T: TrackingSession,
    S: SceneGraph,
{
    /// Controller that logs measurements.
    pub fn new(tracking: T, scene: S, renderable: Renderable, settings: PlacementSettings) -> Self {
        Self::with_sink(tracking, scene, renderable, settings, LogMeasurementSink)
    }
}

impl<T, S, M> PlacementController<T, S, M>
where
    T: TrackingSession,
    S: SceneGraph,
    M: MeasurementSink,
{
    /// Controller that reports measurements to `sink`.
    pub fn with_sink(
        tracking: T,
        scene: S,
        renderable: Renderable,
        settings: PlacementSettings,
        sink: M,
    ) -> Self {
        Self {
            tracking,
            scene,
            sink,
            renderable,
            reporter: MeasurementReporter::new(settings.geometry_fallback),
            settings,
            state: PlacementState::default(),
            stats: PlacementStats::default(),
        }
    }

    /// Per-frame tracking update.
    ///
    /// Qualification (unlocked, frame present, tracking stable) is checked
    /// before anything is released, so an unstable frame leaves a valid
    /// preview where it was instead of flashing it away.
    pub fn on_tracking_frame(&mut self) -> FrameOutcome {
        if self.is_locked() {
            return FrameOutcome::Ignored(FrameSkip::Locked);
        }
        let Some(frame) = self.tracking.current_frame() else {
            return FrameOutcome::Ignored(FrameSkip::NoFrame);
        };
        if !frame.quality.is_stable() {
            return FrameOutcome::Ignored(FrameSkip::NotTracking);
        }

        let target = compose_forward_offset(&frame.camera_pose, self.settings.preview_distance);
        let previous = self.take_preview();
        self.release(previous);

        match self.attach(target) {
            Ok(node) => {
                let id = node.node();
                self.stats.previews_placed += 1;
                self.state = PlacementState::Unlocked {
                    preview: Some(node),
                };
                FrameOutcome::PreviewPlaced(id)
            }
            Err(err) => {
                // Retried on the next frame.
                self.stats.preview_failures += 1;
                debug!(%err, "preview anchor unavailable");
                FrameOutcome::PreviewUnavailable
            }
        }
    }

    /// User tap carrying a world pose from a surface hit.
    ///
    /// Ignored while locked. Otherwise the preview is released and the object
    /// is locked at `pose`; a failure leaves the controller unlocked with no
    /// preview and is returned to the caller.
    pub fn on_tap(&mut self, pose: Pose) -> Result<TapOutcome, PlacementError> {
        if self.is_locked() {
            self.stats.taps_ignored += 1;
            debug!("tap ignored: already locked");
            return Ok(TapOutcome::IgnoredWhileLocked);
        }

        let previous = self.take_preview();
        self.release(previous);

        let locked = match self.attach(pose) {
            Ok(node) => node,
            Err(err) => {
                self.stats.tap_failures += 1;
                warn!(%err, "placement failed");
                return Err(err);
            }
        };

        let id = locked.node();
        self.scene.set_scalable(id, false);
        self.scene.set_translatable(id, false);
        self.scene.select(id);

        let measurement = self.measure(&locked);
        self.stats.locks += 1;
        info!(node = %id, anchor = %locked.anchor(), "object locked");
        self.state = PlacementState::Locked { locked };

        Ok(TapOutcome::Locked {
            node: id,
            measurement,
        })
    }

    /// Drop the lock and return to preview mode.
    ///
    /// Returns `false` (a no-op) when nothing is locked.
    pub fn on_release_command(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            PlacementState::Locked { locked } => {
                info!(node = %locked.node(), "lock released");
                self.release(Some(locked));
                self.stats.releases += 1;
                true
            }
            unlocked => {
                self.state = unlocked;
                false
            }
        }
    }

    /// Re-measure the locked object, e.g. after its scale changed.
    pub fn measure_locked(&mut self) -> Option<Result<BoundingFootprint, PlacementError>> {
        let PlacementState::Locked { locked } = &self.state else {
            return None;
        };
        Some(report_footprint(
            &self.reporter,
            &self.scene,
            &self.renderable,
            &mut self.sink,
            locked,
        ))
    }

    /// Release whatever is attached, leaving `Unlocked` with no preview.
    pub fn teardown(&mut self) {
        let node = match std::mem::take(&mut self.state) {
            PlacementState::Unlocked { preview } => preview,
            PlacementState::Locked { locked } => Some(locked),
        };
        if node.is_some() {
            debug!("tearing down placement");
        }
        self.release(node);
    }

    /// Current state.
    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    /// Whether an object is locked.
    pub fn is_locked(&self) -> bool {
        matches!(self.state, PlacementState::Locked { .. })
    }

    /// Current preview node, if any.
    pub fn preview_node(&self) -> Option<&AttachedNode> {
        self.state.preview()
    }

    /// Current locked node, if any.
    pub fn locked_node(&self) -> Option<&AttachedNode> {
        self.state.locked()
    }

    /// Session counters.
    pub fn stats(&self) -> PlacementStats {
        self.stats
    }

    /// Active settings.
    pub fn settings(&self) -> PlacementSettings {
        self.settings
    }

    /// Tracking collaborator.
    pub fn tracking(&self) -> &T {
        &self.tracking
    }

    /// Mutable tracking collaborator (host-side control, not state mutation).
    pub fn tracking_mut(&mut self) -> &mut T {
        &mut self.tracking
    }

    /// Scene collaborator.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable scene collaborator (host-side control, not state mutation).
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Measurement sink.
    pub fn sink(&self) -> &M {
        &self.sink
    }

    /// Mutable measurement sink, e.g. to drain what it collected.
    pub fn sink_mut(&mut self) -> &mut M {
        &mut self.sink
    }

    fn take_preview(&mut self) -> Option<AttachedNode> {
        match &mut self.state {
            PlacementState::Unlocked { preview } => preview.take(),
            PlacementState::Locked { .. } => None,
        }
    }

    fn attach(&mut self, pose: Pose) -> Result<AttachedNode, PlacementError> {
        let node =
            AnchorHandle::new(&mut self.tracking, &mut self.scene).attach(pose, &self.renderable)?;
        self.stats.anchors_created += 1;
        Ok(node)
    }

    fn release(&mut self, node: Option<AttachedNode>) {
        if AnchorHandle::new(&mut self.tracking, &mut self.scene).release(node) {
            self.stats.anchors_detached += 1;
        }
    }

    fn measure(&mut self, node: &AttachedNode) -> Result<BoundingFootprint, PlacementError> {
        report_footprint(
            &self.reporter,
            &self.scene,
            &self.renderable,
            &mut self.sink,
            node,
        )
    }
}

fn report_footprint<S: SceneGraph, M: MeasurementSink>(
    reporter: &MeasurementReporter,
    scene: &S,
    renderable: &Renderable,
    sink: &mut M,
    node: &AttachedNode,
) -> Result<BoundingFootprint, PlacementError> {
    let result = reporter.report(scene, node);
    match &result {
        Ok(footprint) => {
            debug!(
                node = %node.node(),
                %footprint,
                casts_shadows = renderable.casts_shadows,
                receives_shadows = renderable.receives_shadows,
                "footprint measured"
            );
            sink.on_measurement(node.node(), footprint);
        }
        Err(err) => warn!(node = %node.node(), %err, "measurement failed"),
    }
    result
}
