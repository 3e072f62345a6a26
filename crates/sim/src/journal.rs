//! Ordered record of collaborator calls.

use std::cell::RefCell;
use std::rc::Rc;

use anchorplace_core::{AnchorId, NodeId, Pose};

/// One collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Anchor created at a pose.
    CreateAnchor {
        /// New anchor.
        anchor: AnchorId,
        /// Requested pose.
        pose: Pose,
    },
    /// Anchor creation refused.
    CreateAnchorFailed {
        /// Requested pose.
        pose: Pose,
    },
    /// Anchor detached.
    DetachAnchor {
        /// Detached anchor.
        anchor: AnchorId,
    },
    /// Node attached to the scene on an anchor.
    AttachNode {
        /// New node.
        node: NodeId,
        /// Anchor it is bound to.
        anchor: AnchorId,
    },
    /// Node removed from the scene.
    DetachNode {
        /// Removed node.
        node: NodeId,
    },
    /// Interactive scaling toggled.
    SetScalable {
        /// Target node.
        node: NodeId,
        /// New value.
        enabled: bool,
    },
    /// Interactive translation toggled.
    SetTranslatable {
        /// Target node.
        node: NodeId,
        /// New value.
        enabled: bool,
    },
    /// Node selected.
    Select {
        /// Target node.
        node: NodeId,
    },
}

impl Call {
    /// Whether this call creates an anchor or node.
    pub fn is_attach(&self) -> bool {
        matches!(self, Call::CreateAnchor { .. } | Call::AttachNode { .. })
    }

    /// Whether this call removes an anchor or node.
    pub fn is_release(&self) -> bool {
        matches!(self, Call::DetachAnchor { .. } | Call::DetachNode { .. })
    }
}

/// A call stamped with its position in the global order.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// Monotonic sequence number, starting at 0.
    pub seq: u64,
    /// The call.
    pub call: Call,
}

/// Shared, append-only call log. Cloning shares the same log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Rc<RefCell<Vec<JournalEntry>>>,
}

impl Journal {
    /// Append a call.
    pub fn record(&self, call: Call) {
        let mut entries = self.entries.borrow_mut();
        let seq = entries.len() as u64;
        entries.push(JournalEntry { seq, call });
    }

    /// Copy of every entry so far.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.borrow().clone()
    }

    /// Calls recorded at or after `seq`.
    pub fn calls_since(&self, seq: u64) -> Vec<Call> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.seq >= seq)
            .map(|entry| entry.call.clone())
            .collect()
    }

    /// Number of recorded calls (also the next sequence number).
    pub fn len(&self) -> u64 {
        self.entries.borrow().len() as u64
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_sequence() {
        let journal = Journal::default();
        let other = journal.clone();
        journal.record(Call::DetachNode { node: NodeId(1) });
        other.record(Call::DetachAnchor {
            anchor: AnchorId(2),
        });

        let entries = journal.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 0);
        assert_eq!(entries[1].seq, 1);
        assert!(entries[1].call.is_release());
        assert_eq!(
            journal.calls_since(1),
            vec![Call::DetachAnchor {
                anchor: AnchorId(2)
            }]
        );
    }
}
