//! Boundaries to the tracking subsystem and the scene graph.
//!
//! Both are assumed synchronous: anchor creation and node attachment resolve
//! before the call returns. Hosts backed by asynchronous APIs must present an
//! immediately-resolved facade so release-before-attach ordering holds.

use anchorplace_core::{AnchorId, NodeId, PlacementError, Pose, TrackingFrame};
use anchorplace_physics::CollisionShape;
use glam::Vec3;

use crate::Renderable;

/// Camera tracking and anchor bookkeeping.
pub trait TrackingSession {
    /// Latest tracked frame, or `None` before the session produced one.
    fn current_frame(&self) -> Option<TrackingFrame>;

    /// Create a new anchor at `pose`.
    ///
    /// Fails with [`PlacementError::TrackingUnavailable`] when the session
    /// cannot resolve an anchor right now (e.g. it is not running).
    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorId, PlacementError>;

    /// Stop tracking `anchor`. The handle must never be used again.
    fn detach_anchor(&mut self, anchor: AnchorId);
}

/// Scene graph that owns renderable nodes.
pub trait SceneGraph {
    /// The scene root new anchor nodes are parented to.
    fn root(&self) -> NodeId;

    /// Create a node bound to `anchor`, render `renderable` on it and parent
    /// it under `parent`.
    fn attach_node(&mut self, parent: NodeId, renderable: &Renderable, anchor: AnchorId) -> NodeId;

    /// Remove `node` from its parent.
    fn detach_node(&mut self, node: NodeId);

    /// Collision shape of the renderable on `node`, if any.
    fn collision_shape(&self, node: NodeId) -> Option<CollisionShape>;

    /// World scale of `node`.
    fn world_scale(&self, node: NodeId) -> Vec3;

    /// Allow or forbid interactive scaling of `node`.
    fn set_scalable(&mut self, node: NodeId, enabled: bool);

    /// Allow or forbid interactive translation of `node`.
    fn set_translatable(&mut self, node: NodeId, enabled: bool);

    /// Mark `node` as the selected/focused node.
    fn select(&mut self, node: NodeId);
}
