#![warn(missing_docs)]
//! In-process tracking session and scene graph.
//!
//! These back the headless driver and double as recording test fixtures:
//! every collaborator call lands in a shared [`Journal`] in the order it was
//! issued, so callers can check release-before-attach ordering and leaks.

mod journal;
mod scene;
mod tracking;

pub use journal::{Call, Journal, JournalEntry};
pub use scene::{NodeCapabilities, SimNode, SimScene};
pub use tracking::{QualityMode, SimTracking};

/// Tracking session and scene sharing one journal.
pub fn sim_pair(seed: u64) -> (SimTracking, SimScene, Journal) {
    let journal = Journal::default();
    (
        SimTracking::new(seed, journal.clone()),
        SimScene::new(journal.clone()),
        journal,
    )
}
