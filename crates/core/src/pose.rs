//! Rigid world-space poses.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position + orientation in world space.
///
/// Uses the tracking convention: right-handed, +Y up, and a camera looks
/// down its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRecord", into = "PoseRecord")]
pub struct Pose {
    /// World-space translation in meters.
    pub translation: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Pose at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from translation and rotation.
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Translation-only pose.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Apply `local` in this pose's frame (`self * local`).
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * local.translation,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Drop the orientation, keeping only the translation.
    pub fn extract_translation(&self) -> Pose {
        Pose::from_translation(self.translation)
    }

    /// Local forward axis (-Z) expressed in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// Serialized form: plain arrays so scripts and snapshots stay readable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PoseRecord {
    translation: [f32; 3],
    #[serde(default = "identity_rotation")]
    rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl From<PoseRecord> for Pose {
    fn from(record: PoseRecord) -> Self {
        Pose {
            translation: Vec3::from_array(record.translation),
            rotation: Quat::from_array(record.rotation).normalize(),
        }
    }
}

impl From<Pose> for PoseRecord {
    fn from(pose: Pose) -> Self {
        PoseRecord {
            translation: pose.translation.to_array(),
            rotation: pose.rotation.to_array(),
        }
    }
}
