//! Minimal recording collaborators for unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anchorplace_core::{AnchorId, NodeId, PlacementError, Pose, TrackingFrame};
use anchorplace_physics::CollisionShape;
use glam::Vec3;

use crate::{Renderable, SceneGraph, TrackingSession};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAnchor(AnchorId, Pose),
    DetachAnchor(AnchorId),
    AttachNode(NodeId, AnchorId),
    DetachNode(NodeId),
    SetScalable(NodeId, bool),
    SetTranslatable(NodeId, bool),
    Select(NodeId),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct FakeTracking {
    pub frame: Option<TrackingFrame>,
    pub fail_anchors: bool,
    next_id: u64,
    log: CallLog,
}

impl FakeTracking {
    pub fn new(log: CallLog) -> Self {
        Self {
            frame: Some(TrackingFrame::stable(Pose::IDENTITY)),
            fail_anchors: false,
            next_id: 1,
            log,
        }
    }
}

impl TrackingSession for FakeTracking {
    fn current_frame(&self) -> Option<TrackingFrame> {
        self.frame
    }

    fn create_anchor(&mut self, pose: Pose) -> Result<AnchorId, PlacementError> {
        if self.fail_anchors {
            return Err(PlacementError::TrackingUnavailable("fake session paused".into()));
        }
        let id = AnchorId(self.next_id);
        self.next_id += 1;
        self.log.borrow_mut().push(Call::CreateAnchor(id, pose));
        Ok(id)
    }

    fn detach_anchor(&mut self, anchor: AnchorId) {
        self.log.borrow_mut().push(Call::DetachAnchor(anchor));
    }
}

pub struct FakeScene {
    pub scale: Vec3,
    shapes: BTreeMap<NodeId, CollisionShape>,
    next_id: u64,
    log: CallLog,
}

impl FakeScene {
    pub fn new(log: CallLog) -> Self {
        Self {
            scale: Vec3::ONE,
            shapes: BTreeMap::new(),
            next_id: 100,
            log,
        }
    }

    pub fn live_nodes(&self) -> usize {
        self.shapes.len()
    }
}

impl SceneGraph for FakeScene {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn attach_node(&mut self, _parent: NodeId, renderable: &Renderable, anchor: AnchorId) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.shapes.insert(id, renderable.shape.clone());
        self.log.borrow_mut().push(Call::AttachNode(id, anchor));
        id
    }

    fn detach_node(&mut self, node: NodeId) {
        self.shapes.remove(&node);
        self.log.borrow_mut().push(Call::DetachNode(node));
    }

    fn collision_shape(&self, node: NodeId) -> Option<CollisionShape> {
        self.shapes.get(&node).cloned()
    }

    fn world_scale(&self, _node: NodeId) -> Vec3 {
        self.scale
    }

    fn set_scalable(&mut self, node: NodeId, enabled: bool) {
        self.log.borrow_mut().push(Call::SetScalable(node, enabled));
    }

    fn set_translatable(&mut self, node: NodeId, enabled: bool) {
        self.log.borrow_mut().push(Call::SetTranslatable(node, enabled));
    }

    fn select(&mut self, node: NodeId) {
        self.log.borrow_mut().push(Call::Select(node));
    }
}

pub fn fakes() -> (FakeTracking, FakeScene, CallLog) {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    (
        FakeTracking::new(Rc::clone(&log)),
        FakeScene::new(Rc::clone(&log)),
        log,
    )
}
