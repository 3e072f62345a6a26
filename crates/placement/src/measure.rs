//! Physical footprint of a locked object.

use std::fmt;

use anchorplace_core::{NodeId, PlacementError};
use anchorplace_math::scaled_bounding_extents;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AttachedNode, SceneGraph};

/// Width, height and depth of an object in centimeters, one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingFootprint {
    /// Extent along local X.
    pub width: f32,
    /// Extent along local Y.
    pub height: f32,
    /// Extent along local Z.
    pub depth: f32,
}

impl fmt::Display for BoundingFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X = {:.1} Y = {:.1} Z = {:.1}",
            self.width, self.height, self.depth
        )
    }
}

/// What to do when the collision shape is not a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryFallback {
    /// Measure the shape's axis-aligned bounding box instead.
    #[default]
    BoundingBox,
    /// Refuse with [`PlacementError::UnsupportedGeometry`].
    Strict,
}

/// Computes footprints from a node's collision shape and world scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementReporter {
    fallback: GeometryFallback,
}

impl MeasurementReporter {
    /// Reporter with the given non-box policy.
    pub fn new(fallback: GeometryFallback) -> Self {
        Self { fallback }
    }

    /// Measure `node` as it currently stands in `scene`.
    ///
    /// Not cached: the world scale may change between calls.
    pub fn report<S: SceneGraph + ?Sized>(
        &self,
        scene: &S,
        node: &AttachedNode,
    ) -> Result<BoundingFootprint, PlacementError> {
        let id = node.node();
        let shape = scene.collision_shape(id).ok_or_else(|| {
            PlacementError::UnsupportedGeometry(format!("{id} has no collision shape"))
        })?;

        let local_size = match (shape.box_size(), self.fallback) {
            (Some(size), _) => size,
            (None, GeometryFallback::Strict) => {
                return Err(PlacementError::UnsupportedGeometry(format!(
                    "{id} collision shape is a {}, not a box",
                    shape.kind()
                )));
            }
            (None, GeometryFallback::BoundingBox) => {
                let aabb = shape.bounding_aabb().ok_or_else(|| {
                    PlacementError::UnsupportedGeometry(format!("{id} {} is empty", shape.kind()))
                })?;
                warn!(node = %id, shape = shape.kind(), "measuring non-box shape by its bounding box");
                aabb.size()
            }
        };

        let extents = scaled_bounding_extents(local_size, scene.world_scale(id));
        Ok(BoundingFootprint {
            width: extents.x,
            height: extents.y,
            depth: extents.z,
        })
    }
}

/// Outward notification for computed footprints.
pub trait MeasurementSink {
    /// Called once per successful measurement of a locked node.
    fn on_measurement(&mut self, node: NodeId, footprint: &BoundingFootprint);
}

impl<F> MeasurementSink for F
where
    F: FnMut(NodeId, &BoundingFootprint),
{
    fn on_measurement(&mut self, node: NodeId, footprint: &BoundingFootprint) {
        self(node, footprint)
    }
}

/// Default sink: logs each footprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMeasurementSink;

impl MeasurementSink for LogMeasurementSink {
    fn on_measurement(&mut self, node: NodeId, footprint: &BoundingFootprint) {
        info!(%node, "{footprint}");
    }
}
