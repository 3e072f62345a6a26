use anchorplace_placement::{GeometryFallback, PlacementSettings, Renderable};
use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/placement.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Distance in meters between the camera and the floating preview.
    pub preview_distance: f32,
    /// Renderable preset placed by the session.
    pub renderable: String,
    pub geometry_fallback: GeometryFallback,
    /// World scale applied to every attached node.
    pub world_scale: [f32; 3],
    /// Probability (0.0 to 1.0) of a simulated NotTracking frame in `auto` mode.
    pub tracking_dropout: f64,
    /// Whether the placed object casts and receives shadows.
    pub shadows: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            preview_distance: 1.0,
            renderable: "bag".to_string(),
            geometry_fallback: GeometryFallback::BoundingBox,
            world_scale: [1.0, 1.0, 1.0],
            tracking_dropout: 0.0,
            shadows: false,
        }
    }
}

impl PlacementConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let cfg = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<PlacementConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    PlacementConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Placement config not found at {}. Using defaults",
                        path.display()
                    );
                }
                PlacementConfig::default()
            }
        };
        cfg.sanitized()
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Resolve the configured renderable preset.
    pub fn renderable(&self) -> Result<Renderable> {
        let renderable = Renderable::preset(&self.renderable).with_context(|| {
            format!(
                "unknown renderable '{}' (known: {})",
                self.renderable,
                Renderable::PRESET_NAMES.join(", ")
            )
        })?;
        Ok(renderable.with_shadows(self.shadows, self.shadows))
    }

    pub fn settings(&self) -> PlacementSettings {
        PlacementSettings {
            preview_distance: self.preview_distance,
            geometry_fallback: self.geometry_fallback,
        }
    }

    pub fn world_scale(&self) -> Vec3 {
        Vec3::from_array(self.world_scale)
    }

    fn sanitized(mut self) -> Self {
        let defaults = PlacementConfig::default();
        if !(self.preview_distance.is_finite() && self.preview_distance > 0.0) {
            warn!(
                value = self.preview_distance,
                "preview_distance must be positive. Using {}", defaults.preview_distance
            );
            self.preview_distance = defaults.preview_distance;
        }
        if !self.world_scale.iter().all(|s| s.is_finite() && *s > 0.0) {
            warn!(scale = ?self.world_scale, "world_scale must be positive. Using [1, 1, 1]");
            self.world_scale = defaults.world_scale;
        }
        if !(0.0..=1.0).contains(&self.tracking_dropout) {
            let clamped = if self.tracking_dropout.is_nan() {
                0.0
            } else {
                self.tracking_dropout.clamp(0.0, 1.0)
            };
            warn!(
                value = self.tracking_dropout,
                clamped, "tracking_dropout must be within 0.0..=1.0"
            );
            self.tracking_dropout = clamped;
        }
        self
    }
}
