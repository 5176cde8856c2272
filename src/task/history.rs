//! Recency-ordered log of accessed and affected entities. Backed by an
//! arena of doubly linked nodes keyed by entity id in a flat map, which
//! keeps add, dedup and unlink O(1) without raw pointer links.

use crate::task::types::{TaskId, WorkItem};
use std::collections::HashMap;

#[derive(Debug)]
struct HistoryNode {
    item: WorkItem,
    prev: Option<TaskId>,
    next: Option<TaskId>,
}

#[derive(Debug, Default)]
pub struct HistoryTracker {
    nodes: HashMap<TaskId, HistoryNode>,
    head: Option<TaskId>,
    tail: Option<TaskId>,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an access. If the id is already tracked its old position is
    /// unlinked first, so the net effect is dedup plus move-to-end and the
    /// log never holds an id twice. There is no capacity bound.
    pub fn add(&mut self, item: WorkItem) {
        let id = item.id();
        self.remove(id);
        let node = HistoryNode {
            item,
            prev: self.tail,
            next: None,
        };
        if let Some(tail_id) = self.tail {
            if let Some(tail) = self.nodes.get_mut(&tail_id) {
                tail.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        self.nodes.insert(id, node);
    }

    /// Unlink by id. Absent ids are a no-op, never an error.
    pub fn remove(&mut self, id: TaskId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node.prev {
            Some(prev_id) => {
                if let Some(prev) = self.nodes.get_mut(&prev_id) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next_id) => {
                if let Some(next) = self.nodes.get_mut(&next_id) {
                    next.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
    }

    /// Oldest-to-most-recent snapshot.
    pub fn history(&self) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = &self.nodes[&id];
            items.push(node.item.clone());
            cursor = node.next;
        }
        items
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
