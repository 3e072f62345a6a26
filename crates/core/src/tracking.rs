//! Per-frame tracking data supplied by the tracking subsystem.

use serde::{Deserialize, Serialize};

use crate::Pose;

/// Confidence that current pose estimates are good enough to place content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingQuality {
    /// Pose estimates are unreliable or unavailable.
    NotTracking,
    /// Pose estimates are reliable.
    Stable,
}

impl TrackingQuality {
    /// Whether content may be placed against this frame.
    pub fn is_stable(self) -> bool {
        matches!(self, TrackingQuality::Stable)
    }
}

/// Snapshot of the tracked camera for a single rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    /// Camera pose in world space.
    pub camera_pose: Pose,
    /// Tracking quality reported for this frame.
    pub quality: TrackingQuality,
}

impl TrackingFrame {
    /// Frame with stable tracking at `camera_pose`.
    pub fn stable(camera_pose: Pose) -> Self {
        Self {
            camera_pose,
            quality: TrackingQuality::Stable,
        }
    }

    /// Frame reporting lost tracking.
    pub fn not_tracking(camera_pose: Pose) -> Self {
        Self {
            camera_pose,
            quality: TrackingQuality::NotTracking,
        }
    }
}
