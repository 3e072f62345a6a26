#![warn(missing_docs)]
//! Single-anchor placement for tracked spatial scenes.
//!
//! A [`PlacementController`] keeps exactly one authoritative spatial anchor
//! alive at a time. While unlocked it re-anchors a preview object in front of
//! the viewer on every stable tracking frame; a tap locks the object to a
//! surface pose and reports its physical footprint; a release command drops
//! the lock and returns to preview mode.
//!
//! The tracking subsystem and the scene graph are reached only through the
//! [`TrackingSession`] and [`SceneGraph`] traits.

mod anchor;
mod collab;
mod controller;
mod measure;
mod renderable;

#[cfg(test)]
mod test_support;

pub use anchor::{AnchorHandle, AttachedNode};
pub use collab::{SceneGraph, TrackingSession};
pub use controller::{
    FrameOutcome, FrameSkip, PlacementController, PlacementSettings, PlacementState,
    PlacementStats, TapOutcome,
};
pub use measure::{
    BoundingFootprint, GeometryFallback, LogMeasurementSink, MeasurementReporter, MeasurementSink,
};
pub use renderable::Renderable;

pub use anchorplace_core::{
    AnchorId, NodeId, PlacementError, Pose, TrackingFrame, TrackingQuality,
};
pub use anchorplace_physics::CollisionShape;
