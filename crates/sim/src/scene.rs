//! Simulated scene graph.

use std::collections::HashMap;

use anchorplace_core::{AnchorId, NodeId};
use anchorplace_physics::CollisionShape;
use anchorplace_placement::{Renderable, SceneGraph};
use glam::Vec3;
use tracing::warn;

use crate::{Call, Journal};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Interactive transforms a node accepts from the user.
    pub struct NodeCapabilities: u8 {
        const SCALE = 0b0000_0001;
        const TRANSLATE = 0b0000_0010;
        const ROTATE = 0b0000_0100;
    }
}

impl Default for NodeCapabilities {
    fn default() -> Self {
        NodeCapabilities::all()
    }
}

/// A node living in the simulated scene.
#[derive(Debug, Clone)]
pub struct SimNode {
    /// Parent node.
    pub parent: NodeId,
    /// Anchor the node is bound to.
    pub anchor: AnchorId,
    /// Renderable name.
    pub renderable: String,
    /// Collision geometry of the renderable.
    pub shape: CollisionShape,
    /// Current world scale.
    pub world_scale: Vec3,
    /// Whether the node casts shadows.
    pub casts_shadows: bool,
    /// Whether the node receives shadows.
    pub receives_shadows: bool,
    /// Enabled interactive transforms.
    pub capabilities: NodeCapabilities,
}

/// Scene graph with a single root; nodes are keyed by handle.
#[derive(Debug)]
pub struct SimScene {
    root: NodeId,
    nodes: HashMap<NodeId, SimNode>,
    next_handle: u64,
    spawn_scale: Vec3,
    selected: Option<NodeId>,
    unknown_detaches: u64,
    journal: Journal,
}

impl SimScene {
    /// Empty scene recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self {
            root: NodeId(0),
            nodes: HashMap::new(),
            next_handle: 1,
            spawn_scale: Vec3::ONE,
            selected: None,
            unknown_detaches: 0,
            journal,
        }
    }

    /// World scale given to nodes attached from now on.
    pub fn set_spawn_scale(&mut self, scale: Vec3) {
        self.spawn_scale = scale;
    }

    /// Rescale a live node. Returns `false` for unknown nodes.
    pub fn set_world_scale(&mut self, node: NodeId, scale: Vec3) -> bool {
        match self.nodes.get_mut(&node) {
            Some(entry) => {
                entry.world_scale = scale;
                true
            }
            None => false,
        }
    }

    /// Look up a live node.
    pub fn node(&self, node: NodeId) -> Option<&SimNode> {
        self.nodes.get(&node)
    }

    /// Number of live nodes (the root excluded).
    pub fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Currently selected node.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Detach calls for nodes that were not live.
    pub fn unknown_detaches(&self) -> u64 {
        self.unknown_detaches
    }

    fn update_capability(&mut self, node: NodeId, flag: NodeCapabilities, enabled: bool) {
        match self.nodes.get_mut(&node) {
            Some(entry) => entry.capabilities.set(flag, enabled),
            None => warn!(%node, "capability change on unknown node"),
        }
    }
}

impl SceneGraph for SimScene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn attach_node(&mut self, parent: NodeId, renderable: &Renderable, anchor: AnchorId) -> NodeId {
        let node = NodeId(self.next_handle);
        self.next_handle += 1;
        self.nodes.insert(
            node,
            SimNode {
                parent,
                anchor,
                renderable: renderable.name.clone(),
                shape: renderable.shape.clone(),
                world_scale: self.spawn_scale,
                casts_shadows: renderable.casts_shadows,
                receives_shadows: renderable.receives_shadows,
                capabilities: NodeCapabilities::default(),
            },
        );
        self.journal.record(Call::AttachNode { node, anchor });
        node
    }

    fn detach_node(&mut self, node: NodeId) {
        if self.nodes.remove(&node).is_none() {
            self.unknown_detaches += 1;
            warn!(%node, "detach of a node that is not in the scene");
        }
        if self.selected == Some(node) {
            self.selected = None;
        }
        self.journal.record(Call::DetachNode { node });
    }

    fn collision_shape(&self, node: NodeId) -> Option<CollisionShape> {
        self.nodes.get(&node).map(|entry| entry.shape.clone())
    }

    fn world_scale(&self, node: NodeId) -> Vec3 {
        self.nodes
            .get(&node)
            .map_or(Vec3::ONE, |entry| entry.world_scale)
    }

    fn set_scalable(&mut self, node: NodeId, enabled: bool) {
        self.update_capability(node, NodeCapabilities::SCALE, enabled);
        self.journal.record(Call::SetScalable { node, enabled });
    }

    fn set_translatable(&mut self, node: NodeId, enabled: bool) {
        self.update_capability(node, NodeCapabilities::TRANSLATE, enabled);
        self.journal.record(Call::SetTranslatable { node, enabled });
    }

    fn select(&mut self, node: NodeId) {
        if self.nodes.contains_key(&node) {
            self.selected = Some(node);
        }
        self.journal.record(Call::Select { node });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> Renderable {
        Renderable::preset("bag").expect("bag preset")
    }

    #[test]
    fn attach_and_detach_track_live_nodes() {
        let journal = Journal::default();
        let mut scene = SimScene::new(journal.clone());
        let node = scene.attach_node(scene.root(), &bag(), AnchorId(1));

        let entry = scene.node(node).expect("live node");
        assert_eq!(entry.parent, NodeId(0));
        assert_eq!(entry.renderable, "bag");
        assert_eq!(entry.capabilities, NodeCapabilities::all());
        assert_eq!(scene.live_nodes(), 1);

        scene.detach_node(node);
        assert_eq!(scene.live_nodes(), 0);
        assert_eq!(scene.unknown_detaches(), 0);
        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn capabilities_toggle_individually() {
        let mut scene = SimScene::new(Journal::default());
        let node = scene.attach_node(scene.root(), &bag(), AnchorId(1));
        scene.set_scalable(node, false);
        scene.set_translatable(node, false);

        let caps = scene.node(node).expect("live").capabilities;
        assert_eq!(caps, NodeCapabilities::ROTATE);
    }

    #[test]
    fn selection_clears_when_node_leaves() {
        let mut scene = SimScene::new(Journal::default());
        let node = scene.attach_node(scene.root(), &bag(), AnchorId(1));
        scene.select(node);
        assert_eq!(scene.selected(), Some(node));
        scene.detach_node(node);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn spawn_scale_applies_to_new_nodes() {
        let mut scene = SimScene::new(Journal::default());
        scene.set_spawn_scale(Vec3::splat(2.0));
        let node = scene.attach_node(scene.root(), &bag(), AnchorId(1));
        assert_eq!(scene.world_scale(node), Vec3::splat(2.0));
        assert!(scene.set_world_scale(node, Vec3::ONE));
        assert_eq!(scene.world_scale(node), Vec3::ONE);
    }
}
