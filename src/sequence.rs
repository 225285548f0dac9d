//! Ordered container with O(1) append and O(1) removal of any node
//!
//! Nodes live in an arena owned by the sequence and are linked by index.
//! A [`NodeId`] remembers which sequence issued it, so a handle can only
//! detach nodes from its own sequence.
//!
//! The arena is append-only: a removed node leaves an empty slot behind, so a
//! stale [`NodeId`] can never alias a later node. Memory grows with the number
//! of pushes, not with [`LinkedSequence::len`]; build a fresh sequence with
//! [`LinkedSequence::copy`] to drop the empty slots.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::parser::Token;

/// Token sequence produced by the tokenizer
pub type TokenSequence = LinkedSequence<Token>;

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(0);

fn next_sequence_id() -> u64 {
    NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a node of one particular [`LinkedSequence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    owner: u64,
    slot: usize,
}

struct Node<T> {
    // None once the node has been removed; slots are never reused
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct LinkedSequence<T> {
    id: u64,
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedSequence<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: next_sequence_id(),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append to the end
    pub fn push(&mut self, value: T) -> NodeId {
        let slot = self.nodes.len();
        self.nodes.push(Node {
            value: Some(value),
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        self.handle(slot)
    }

    /// Detach a node, splicing its neighbours together.
    ///
    /// Returns `None` for handles issued by another sequence or already removed.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let slot = self.own_slot(id)?;
        let node = &mut self.nodes[slot];
        let value = node.value.take()?;
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        let slot = self.own_slot(id)?;
        self.nodes[slot].value.as_ref()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(|slot| self.handle(slot))
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(|slot| self.handle(slot))
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let slot = self.live_slot(id)?;
        self.nodes[slot].next.map(|next| self.handle(next))
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        let slot = self.live_slot(id)?;
        self.nodes[slot].prev.map(|prev| self.handle(prev))
    }

    pub fn first(&self) -> Option<&T> {
        self.head.and_then(|slot| self.nodes[slot].value.as_ref())
    }

    pub fn last(&self) -> Option<&T> {
        self.tail.and_then(|slot| self.nodes[slot].value.as_ref())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Handles in order, for callers that want to detach while walking
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            ids.push(self.handle(slot));
            cursor = self.nodes[slot].next;
        }
        ids
    }

    fn handle(&self, slot: usize) -> NodeId {
        NodeId { owner: self.id, slot }
    }

    fn own_slot(&self, id: NodeId) -> Option<usize> {
        (id.owner == self.id && id.slot < self.nodes.len()).then_some(id.slot)
    }

    fn live_slot(&self, id: NodeId) -> Option<usize> {
        self.own_slot(id)
            .filter(|slot| self.nodes[*slot].value.is_some())
    }
}

impl<T: Clone> LinkedSequence<T> {
    /// Equal values in the same order, sharing no node identity with `self`
    pub fn copy(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<T: PartialEq> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedSequence<T> {}

impl<T: fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut sequence = Self::with_capacity(iter.size_hint().0);
        for value in iter {
            sequence.push(value);
        }
        sequence
    }
}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over a [`LinkedSequence`]
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.cursor?];
        self.cursor = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(range: std::ops::Range<i32>) -> LinkedSequence<i32> {
        range.collect()
    }

    #[test]
    fn test_push_keeps_order() {
        let sequence = numbers(1..4);
        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(sequence.first(), Some(&1));
        assert_eq!(sequence.last(), Some(&3));
        assert_eq!(sequence.len(), 3);
    }

    #[test]
    fn test_copy_is_independent() {
        let original = numbers(1..4);
        let mut copy1 = original.copy();
        let copy2 = original.clone();

        assert_eq!(original, copy1);
        copy1.push(4);
        assert_ne!(original, copy1);
        assert_eq!(original, copy2);
    }

    #[test]
    fn test_remove_endpoints_and_middle() {
        let mut sequence = numbers(0..8);
        let ids = sequence.ids();

        for index in [0, 2, 4, 6, 7] {
            assert_eq!(sequence.remove(ids[index]), Some(index as i32));
        }

        let expected: LinkedSequence<i32> = [1, 3, 5].into_iter().collect();
        assert_eq!(sequence, expected);
        assert_eq!(sequence.first(), Some(&1));
        assert_eq!(sequence.last(), Some(&5));
        assert_eq!(sequence.len(), 3);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut sequence = numbers(0..3);
        let middle = sequence.ids()[1];
        assert_eq!(sequence.remove(middle), Some(1));
        assert_eq!(sequence.remove(middle), None);
        assert_eq!(sequence.get(middle), None);
        assert_eq!(sequence.len(), 2);
    }

    #[test]
    fn test_stale_handle_never_aliases_new_node() {
        let mut sequence = numbers(0..2);
        let first = sequence.head().expect("non-empty");
        assert_eq!(sequence.remove(first), Some(0));

        let pushed = sequence.push(7);
        assert_ne!(pushed, first);
        assert_eq!(sequence.get(first), None);
        assert_eq!(sequence.remove(first), None);
        assert_eq!(sequence.iter().copied().collect::<Vec<_>>(), vec![1, 7]);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let original = numbers(0..3);
        let mut copy = original.copy();
        let foreign = original.head().expect("non-empty");

        assert_eq!(copy.remove(foreign), None);
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn test_remove_everything() {
        let mut sequence = numbers(0..2);
        for id in sequence.ids() {
            sequence.remove(id);
        }
        assert!(sequence.is_empty());
        assert_eq!(sequence.head(), None);
        assert_eq!(sequence.tail(), None);
        assert_eq!(sequence.iter().next(), None);

        sequence.push(9);
        assert_eq!(sequence.first(), Some(&9));
    }

    #[test]
    fn test_navigation() {
        let sequence = numbers(0..3);
        let head = sequence.head().expect("non-empty");
        let second = sequence.next(head).expect("two nodes");
        assert_eq!(sequence.get(second), Some(&1));
        assert_eq!(sequence.prev(second), Some(head));
        assert_eq!(sequence.prev(head), None);
        assert_eq!(sequence.next(sequence.tail().expect("non-empty")), None);
    }

    #[test]
    fn test_debug_lists_values() {
        assert_eq!(format!("{:?}", numbers(1..4)), "[1, 2, 3]");
    }
}
