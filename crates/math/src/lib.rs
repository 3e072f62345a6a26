//! Pose and measurement math for placement.
//!
//! Everything here is pure: no tracking or scene state is touched, so the
//! same inputs always produce the same preview pose and the same footprint.

use anchorplace_core::Pose;
use glam::Vec3;

/// Centimeters in one meter (world units are meters).
pub const CENTIMETERS_PER_METER: f32 = 100.0;

/// Display precision: footprints are shown with one decimal of a centimeter.
pub const DISPLAY_STEPS_PER_CENTIMETER: f32 = 10.0;

/// Pose `distance` meters in front of the camera, translation only.
///
/// The offset is applied along the camera's local forward axis (-Z) and the
/// camera orientation is then discarded, so the preview stays upright no
/// matter how the viewer tilts the device.
pub fn compose_forward_offset(camera: &Pose, distance: f32) -> Pose {
    camera
        .compose(&Pose::from_translation(Vec3::new(0.0, 0.0, -distance)))
        .extract_translation()
}

/// Round half-up (ties go toward +infinity) to the nearest integer.
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Convert meters to centimeters rounded to one decimal.
///
/// Computed in f32 throughout, so decimal ties such as 0.0235 m round up.
pub fn meters_to_display_centimeters(meters: f32) -> f32 {
    round_half_up(meters * CENTIMETERS_PER_METER * DISPLAY_STEPS_PER_CENTIMETER)
        / DISPLAY_STEPS_PER_CENTIMETER
}

/// Multiply a local bounding box size by a world scale, element-wise, and
/// convert each extent to display centimeters.
pub fn scaled_bounding_extents(local_size: Vec3, world_scale: Vec3) -> Vec3 {
    let scaled = local_size * world_scale;
    Vec3::new(
        meters_to_display_centimeters(scaled.x),
        meters_to_display_centimeters(scaled.y),
        meters_to_display_centimeters(scaled.z),
    )
}
