#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod error;
pub mod pose;
pub mod tracking;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use error::PlacementError;
pub use pose::Pose;
pub use tracking::{TrackingFrame, TrackingQuality};

/// Rendered frame counter. One tracking update is delivered per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameTick(pub u64);

impl FrameTick {
    /// First frame of any session.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` frames.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Handle to a spatial anchor owned by the tracking subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

/// Handle to a node owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Helper to derive a reproducible RNG seeded by session + frame domains.
pub fn scoped_rng(session_seed: u64, tick: FrameTick) -> StdRng {
    let seed = session_seed ^ tick.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}
