//! Bounded undo log for destructive edits.
//!
//! # Responsibility
//! - Record reversible operations as a side effect of graph mutations.
//! - Evict the oldest entry once the fixed capacity is reached.
//!
//! # Invariants
//! - The log never holds more than [`UNDO_CAPACITY`] entries.
//! - Applying an entry never records a new one; undo is single-level replay.

use crate::model::node::{Node, NodeId, Point3};
use std::collections::VecDeque;

/// Maximum number of reversible operations kept in the log.
pub const UNDO_CAPACITY: usize = 10;

/// One reversible operation, captured before the mutation took effect.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    /// A node was deleted; holds the full pre-deletion snapshot.
    DeleteNode { node: Box<Node> },
    /// Reserved for move-undo. Recorded by no current operation.
    MoveNode {
        node_id: NodeId,
        previous_position: Point3,
    },
}

/// Last-in-first-out history of reversible operations.
#[derive(Debug, Default)]
pub struct UndoLog {
    entries: VecDeque<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an entry, evicting the oldest when the log is full.
    pub fn push(&mut self, entry: UndoEntry) {
        if self.entries.len() == UNDO_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Pops the most recent entry, if any.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoEntry, UndoLog, UNDO_CAPACITY};
    use crate::model::node::{Node, Point3};

    fn delete_entry(title: &str) -> UndoEntry {
        UndoEntry::DeleteNode {
            node: Box::new(Node::new(title, Point3::default(), "/moon.jpg", 0)),
        }
    }

    #[test]
    fn pops_in_reverse_push_order() {
        let mut log = UndoLog::new();
        log.push(delete_entry("a"));
        log.push(delete_entry("b"));

        match log.pop() {
            Some(UndoEntry::DeleteNode { node }) => assert_eq!(node.title, "b"),
            other => panic!("unexpected entry: {other:?}"),
        }
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn capacity_evicts_the_oldest_entry() {
        let mut log = UndoLog::new();
        for index in 0..=UNDO_CAPACITY {
            log.push(delete_entry(&format!("node-{index}")));
        }
        assert_eq!(log.len(), UNDO_CAPACITY);

        // Drain to the bottom: entry 0 is gone, entry 1 is now the oldest.
        let mut oldest = None;
        while let Some(entry) = log.pop() {
            oldest = Some(entry);
        }
        match oldest {
            Some(UndoEntry::DeleteNode { node }) => assert_eq!(node.title, "node-1"),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn empty_log_reports_empty() {
        let mut log = UndoLog::new();
        assert!(log.is_empty());
        assert!(log.pop().is_none());
    }
}
