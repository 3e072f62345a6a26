//! Renderable descriptors and built-in presets.

use anchorplace_physics::CollisionShape;
use glam::Vec3;

/// Local offset shared by the presets so objects rest slightly above the anchor.
const PRESET_CENTER: Vec3 = Vec3::new(0.0, 0.15, 0.0);

/// A loaded, ready-to-attach renderable.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Preset or asset name.
    pub name: String,
    /// Collision geometry used for measurement.
    pub shape: CollisionShape,
    /// Whether the renderable casts shadows.
    pub casts_shadows: bool,
    /// Whether the renderable receives shadows.
    pub receives_shadows: bool,
}

impl Renderable {
    /// Names accepted by [`Renderable::preset`].
    pub const PRESET_NAMES: &'static [&'static str] = &["bag", "cube", "sphere", "cylinder"];

    /// Renderable without shadows.
    pub fn new(name: impl Into<String>, shape: CollisionShape) -> Self {
        Self {
            name: name.into(),
            shape,
            casts_shadows: false,
            receives_shadows: false,
        }
    }

    /// Look up a built-in renderable by name.
    pub fn preset(name: &str) -> Option<Self> {
        let shape = match name {
            // Carry-on bag: 45 x 55 x 25 cm.
            "bag" => CollisionShape::Box {
                size: Vec3::new(0.45, 0.55, 0.25),
                center: PRESET_CENTER,
            },
            "cube" => CollisionShape::Box {
                size: Vec3::splat(0.2),
                center: PRESET_CENTER,
            },
            "sphere" => CollisionShape::Sphere {
                radius: 0.1,
                center: PRESET_CENTER,
            },
            "cylinder" => CollisionShape::Cylinder {
                radius: 0.1,
                height: 0.3,
                center: PRESET_CENTER,
            },
            _ => return None,
        };
        Some(Self::new(name, shape))
    }

    /// Enable or disable shadow casting.
    pub fn with_shadows(mut self, casts: bool, receives: bool) -> Self {
        self.casts_shadows = casts;
        self.receives_shadows = receives;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_preset_resolves() {
        for name in Renderable::PRESET_NAMES {
            let renderable = Renderable::preset(name).expect("preset exists");
            assert_eq!(renderable.name, *name);
            assert!(!renderable.casts_shadows);
            assert!(!renderable.receives_shadows);
        }
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(Renderable::preset("teapot").is_none());
    }

    #[test]
    fn bag_is_a_box() {
        let bag = Renderable::preset("bag").expect("bag preset");
        assert_eq!(bag.shape.box_size(), Some(Vec3::new(0.45, 0.55, 0.25)));
    }
}
