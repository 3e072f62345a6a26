//! Anchor + scene node lifetime as a single unit.

use anchorplace_core::{AnchorId, NodeId, PlacementError, Pose};
use tracing::debug;

use crate::{Renderable, SceneGraph, TrackingSession};

/// A spatial anchor together with the scene node rendered on it.
///
/// Not `Clone`: this value is the only owner of the anchor and releasing
/// consumes it, so a released anchor cannot be used again.
#[derive(Debug, PartialEq)]
#[must_use = "an attached node must be released through AnchorHandle::release"]
pub struct AttachedNode {
    anchor: AnchorId,
    node: NodeId,
    parent: NodeId,
    pose: Pose,
}

impl AttachedNode {
    /// Anchor this node is bound to.
    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    /// Scene node handle.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Scene node the anchor node is parented to.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Pose the anchor was created at.
    pub fn pose(&self) -> Pose {
        self.pose
    }
}

/// Creates and destroys [`AttachedNode`]s against the two collaborators.
pub struct AnchorHandle<'a, T: ?Sized, S: ?Sized> {
    tracking: &'a mut T,
    scene: &'a mut S,
}

impl<'a, T, S> AnchorHandle<'a, T, S>
where
    T: TrackingSession + ?Sized,
    S: SceneGraph + ?Sized,
{
    /// Borrow both collaborators for one attach/release sequence.
    pub fn new(tracking: &'a mut T, scene: &'a mut S) -> Self {
        Self { tracking, scene }
    }

    /// Anchor `renderable` at `pose` and parent it to the scene root.
    ///
    /// Nothing is added to the scene when the anchor cannot be created.
    pub fn attach(
        &mut self,
        pose: Pose,
        renderable: &Renderable,
    ) -> Result<AttachedNode, PlacementError> {
        let anchor = self.tracking.create_anchor(pose)?;
        let parent = self.scene.root();
        let node = self.scene.attach_node(parent, renderable, anchor);
        debug!(%anchor, %node, renderable = %renderable.name, "attached node");
        Ok(AttachedNode {
            anchor,
            node,
            parent,
            pose,
        })
    }

    /// Remove the node from the scene, then detach its anchor.
    ///
    /// Returns `false` (and issues no collaborator call) when `node` is `None`.
    pub fn release(&mut self, node: Option<AttachedNode>) -> bool {
        let Some(node) = node else {
            return false;
        };
        self.scene.detach_node(node.node);
        self.tracking.detach_anchor(node.anchor);
        debug!(anchor = %node.anchor, node = %node.node, "released node");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fakes, Call};
    use glam::Vec3;

    fn cube() -> Renderable {
        Renderable::preset("cube").expect("cube preset")
    }

    #[test]
    fn attach_creates_anchor_before_node() {
        let (mut tracking, mut scene, log) = fakes();
        let pose = Pose::from_translation(Vec3::new(0.0, 0.0, -1.0));
        let node = AnchorHandle::new(&mut tracking, &mut scene)
            .attach(pose, &cube())
            .expect("attach succeeds");

        assert_eq!(node.pose(), pose);
        assert_eq!(node.parent(), NodeId(0));
        assert_eq!(
            *log.borrow(),
            vec![
                Call::CreateAnchor(node.anchor(), pose),
                Call::AttachNode(node.node(), node.anchor()),
            ]
        );
        AnchorHandle::new(&mut tracking, &mut scene).release(Some(node));
    }

    #[test]
    fn failed_anchor_leaves_scene_untouched() {
        let (mut tracking, mut scene, log) = fakes();
        tracking.fail_anchors = true;
        let result = AnchorHandle::new(&mut tracking, &mut scene).attach(Pose::IDENTITY, &cube());

        assert!(matches!(result, Err(PlacementError::TrackingUnavailable(_))));
        assert!(log.borrow().is_empty());
        assert_eq!(scene.live_nodes(), 0);
    }

    #[test]
    fn release_detaches_node_then_anchor() {
        let (mut tracking, mut scene, log) = fakes();
        let mut handle = AnchorHandle::new(&mut tracking, &mut scene);
        let node = handle.attach(Pose::IDENTITY, &cube()).expect("attach");
        let (anchor, id) = (node.anchor(), node.node());
        log.borrow_mut().clear();

        assert!(handle.release(Some(node)));
        assert_eq!(
            *log.borrow(),
            vec![Call::DetachNode(id), Call::DetachAnchor(anchor)]
        );
    }

    #[test]
    fn releasing_nothing_is_a_no_op() {
        let (mut tracking, mut scene, log) = fakes();
        assert!(!AnchorHandle::new(&mut tracking, &mut scene).release(None));
        assert!(log.borrow().is_empty());
    }
}
