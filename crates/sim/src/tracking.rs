//! Simulated tracking session.

use std::collections::BTreeMap;

use anchorplace_camera::TrackedCamera;
use anchorplace_core::{
    scoped_rng, AnchorId, FrameTick, PlacementError, Pose, TrackingFrame, TrackingQuality,
};
use anchorplace_placement::TrackingSession;
use rand::Rng;
use tracing::warn;

use crate::{Call, Journal};

/// How the session decides per-frame tracking quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMode {
    /// Every frame is stable.
    #[default]
    Stable,
    /// Every frame reports lost tracking.
    Lost,
    /// Frames drop to NotTracking with the configured dropout probability.
    Auto,
}

/// Tracking session driven by a [`TrackedCamera`].
///
/// No frame exists until the host calls [`SimTracking::advance`], and none is
/// produced while the session is paused.
#[derive(Debug)]
pub struct SimTracking {
    camera: TrackedCamera,
    mode: QualityMode,
    dropout: f64,
    seed: u64,
    tick: Option<FrameTick>,
    quality: TrackingQuality,
    running: bool,
    fail_next_anchor: bool,
    anchors: BTreeMap<AnchorId, Pose>,
    next_anchor: u64,
    double_detaches: u64,
    journal: Journal,
}

impl SimTracking {
    /// New running session with a default camera.
    pub fn new(seed: u64, journal: Journal) -> Self {
        Self {
            camera: TrackedCamera::default(),
            mode: QualityMode::Stable,
            dropout: 0.0,
            seed,
            tick: None,
            quality: TrackingQuality::Stable,
            running: true,
            fail_next_anchor: false,
            anchors: BTreeMap::new(),
            next_anchor: 1,
            double_detaches: 0,
            journal,
        }
    }

    /// Produce the frame for `tick`, resolving its tracking quality.
    pub fn advance(&mut self, tick: FrameTick) {
        self.tick = Some(tick);
        self.quality = if !self.running {
            TrackingQuality::NotTracking
        } else {
            match self.mode {
                QualityMode::Stable => TrackingQuality::Stable,
                QualityMode::Lost => TrackingQuality::NotTracking,
                QualityMode::Auto => {
                    if scoped_rng(self.seed, tick).gen_bool(self.dropout) {
                        TrackingQuality::NotTracking
                    } else {
                        TrackingQuality::Stable
                    }
                }
            }
        };
    }

    /// Select how quality is decided; applies from the next [`advance`](Self::advance).
    pub fn set_mode(&mut self, mode: QualityMode) {
        self.mode = mode;
    }

    /// Probability (clamped to 0..=1) of a lost frame in [`QualityMode::Auto`].
    pub fn set_dropout(&mut self, probability: f64) {
        self.dropout = probability.clamp(0.0, 1.0);
    }

    /// Pause or resume the session. Paused sessions yield no frames and refuse anchors.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        if !running {
            self.quality = TrackingQuality::NotTracking;
        }
    }

    /// Make the next anchor request fail once.
    pub fn fail_next_anchor(&mut self) {
        self.fail_next_anchor = true;
    }

    /// The simulated viewer.
    pub fn camera(&self) -> &TrackedCamera {
        &self.camera
    }

    /// Move or turn the simulated viewer.
    pub fn camera_mut(&mut self) -> &mut TrackedCamera {
        &mut self.camera
    }

    /// Anchors currently tracked.
    pub fn live_anchors(&self) -> usize {
        self.anchors.len()
    }

    /// Pose of a live anchor.
    pub fn anchor_pose(&self, anchor: AnchorId) -> Option<Pose> {
        self.anchors.get(&anchor).copied()
    }

    /// Detach calls for anchors that were not live.
    pub fn double_detaches(&self) -> u64 {
        self.double_detaches
    }

    fn refuse(&mut self, pose: Pose, reason: &str) -> PlacementError {
        self.journal.record(Call::CreateAnchorFailed { pose });
        PlacementError::TrackingUnavailable(reason.to_string())
    }
}

impl TrackingSession for SimTracking {
    fn current_frame(&self) -> Option<TrackingFrame> {
        if !self.running {
            return None;
        }
        self.tick.map(|_| TrackingFrame {
            camera_pose: self.camera.pose(),
            quality: self.quality,
        })
    }

    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorId, PlacementError> {
        if !self.running {
            return Err(self.refuse(pose, "session is paused"));
        }
        if std::mem::take(&mut self.fail_next_anchor) {
            return Err(self.refuse(pose, "anchor request rejected"));
        }
        if !self.quality.is_stable() {
            return Err(self.refuse(pose, "camera is not tracking"));
        }

        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(anchor, pose);
        self.journal.record(Call::CreateAnchor { anchor, pose });
        Ok(anchor)
    }

    fn detach_anchor(&mut self, anchor: AnchorId) {
        if self.anchors.remove(&anchor).is_none() {
            self.double_detaches += 1;
            warn!(%anchor, "detach of an anchor that is not live");
        }
        self.journal.record(Call::DetachAnchor { anchor });
    }
}
