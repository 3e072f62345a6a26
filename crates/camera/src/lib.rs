#![warn(missing_docs)]
//! Viewer camera that produces tracked camera poses.

use anchorplace_core::Pose;
use glam::{EulerRot, Quat, Vec3};

/// Handheld/head-mounted viewer with position and yaw/pitch orientation.
///
/// At zero yaw and pitch the camera looks down -Z with +Y up, matching the
/// tracking convention used by [`Pose::forward`].
#[derive(Debug, Clone)]
pub struct TrackedCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Horizontal rotation in radians (around world Y, positive turns left).
    pub yaw: f32,
    /// Vertical rotation in radians (around local X, positive looks up).
    pub pitch: f32,
}

impl Default for TrackedCamera {
    fn default() -> Self {
        Self {
            // Roughly eye height of a standing viewer.
            position: Vec3::new(0.0, 1.6, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl TrackedCamera {
    /// Orientation as a quaternion (yaw, then pitch).
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Full camera pose in world space.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation())
    }

    /// Rotate the camera (add to yaw and pitch).
    ///
    /// # Arguments
    /// * `delta_yaw` - Horizontal rotation delta in radians
    /// * `delta_pitch` - Vertical rotation delta in radians
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch += delta_pitch;

        // Clamp pitch to avoid gimbal lock
        const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // Normalize yaw to [0, 2π]
        self.yaw = self.yaw.rem_euclid(std::f32::consts::TAU);
    }
}
