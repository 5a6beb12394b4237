//! Per-node diff metadata and its slab storage.
//!
//! Every node of a participating tree carries one `DiffHeap` holding the
//! attributes only the differ needs: identity, the dual hashes, measurements
//! and the transient assignment state. Attaching it to the tree costs each
//! subtree entry a single optional slot handle.

use crate::share::ShareId;
use std::sync::atomic::{AtomicU32, Ordering};
use treediff_position::Length;
use treediff_tree::{DiffHeapId, NodeId, SubtreeId};

/// Diff metadata attached to one tree node.
#[derive(Debug)]
pub struct DiffHeap {
    /// Logical identity, preserved across edits when the node is reused.
    pub id: NodeId,
    /// Hash over symbol, production id and the children's structural hashes.
    pub structural_hash: [u8; 32],
    /// Hash over declared-literal text and the children's literal hashes.
    pub literal_hash: [u8; 32],
    /// Node count of the subtree, this node included.
    pub treesize: u32,
    /// Height of the subtree; 1 for a leaf.
    pub treeheight: u32,
    /// Absolute start of the node's text.
    pub position: Length,
    /// Padding preceding the node, mirrored from the tree storage.
    pub padding: Length,
    /// Span of the node's text, mirrored from the tree storage.
    pub size: Length,
    /// The share this node is currently a reuse candidate in.
    pub share: Option<ShareId>,
    /// Mutual cross-tree pairing; symmetric at every observation point.
    pub assigned: Option<SubtreeId>,
    /// Tentative pairing carried across incremental parses.
    pub preemptive_assignment: Option<SubtreeId>,
    ref_count: AtomicU32,
}

impl DiffHeap {
    /// Creates a heap with a fresh identity and reference count 1.
    pub fn new(position: Length, padding: Length, size: Length) -> Self {
        Self::with_id(NodeId::mint(), position, padding, size)
    }

    /// Creates a heap with a given identity and reference count 1.
    pub fn with_id(id: NodeId, position: Length, padding: Length, size: Length) -> Self {
        Self {
            id,
            structural_hash: [0; 32],
            literal_hash: [0; 32],
            treesize: 0,
            treeheight: 0,
            position,
            padding,
            size,
            share: None,
            assigned: None,
            preemptive_assignment: None,
            ref_count: AtomicU32::new(1),
        }
    }

    /// Current reference count.
    pub fn ref_count(&self) -> u32 {
        self.ref_count.load(Ordering::Acquire)
    }
}

/// Slab of [`DiffHeap`]s addressed by [`DiffHeapId`].
///
/// One store serves every tree in a diff; reused nodes share their heap
/// between the original and the reconstructed tree, so heaps are reference
/// counted independently of the subtree entries that point at them.
#[derive(Debug, Default)]
pub struct DiffHeapStore {
    slots: Vec<Option<DiffHeap>>,
    free: Vec<u32>,
}

impl DiffHeapStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a heap and returns its slot handle.
    pub fn alloc(&mut self, heap: DiffHeap) -> DiffHeapId {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(heap);
            DiffHeapId::from_raw(index)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(heap));
            DiffHeapId::from_raw(index)
        }
    }

    /// Borrows a heap, if the slot is live.
    #[inline]
    pub fn get(&self, id: DiffHeapId) -> Option<&DiffHeap> {
        self.slots.get(id.raw() as usize).and_then(Option::as_ref)
    }

    /// Mutably borrows a heap, if the slot is live.
    #[inline]
    pub fn get_mut(&mut self, id: DiffHeapId) -> Option<&mut DiffHeap> {
        self.slots.get_mut(id.raw() as usize).and_then(Option::as_mut)
    }

    /// Adds one reference to a heap.
    pub fn inc_ref(&self, id: DiffHeapId) {
        if let Some(heap) = self.get(id) {
            let previous = heap.ref_count.fetch_add(1, Ordering::AcqRel);
            debug_assert!(previous > 0, "revival of dead heap");
        }
    }

    /// Drops one reference; returns the remaining count (0 means the caller
    /// must [`free`](DiffHeapStore::free) the slot).
    pub fn dec_ref(&self, id: DiffHeapId) -> u32 {
        match self.get(id) {
            Some(heap) => {
                let previous = heap.ref_count.fetch_sub(1, Ordering::AcqRel);
                debug_assert!(previous > 0, "double free of heap");
                previous.saturating_sub(1)
            }
            None => 0,
        }
    }

    /// Releases a slot for reuse.
    pub fn free(&mut self, id: DiffHeapId) {
        let index = id.raw() as usize;
        if index < self.slots.len() && self.slots[index].take().is_some() {
            self.free.push(id.raw());
        }
    }

    /// Number of live heaps.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_alloc_get_free() {
        let mut store = DiffHeapStore::new();
        let id = store.alloc(DiffHeap::new(Length::zero(), Length::zero(), Length::zero()));
        assert!(store.get(id).is_some());
        assert_eq!(store.live_count(), 1);
        store.free(id);
        assert!(store.get(id).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_ref_counting() {
        let mut store = DiffHeapStore::new();
        let id = store.alloc(DiffHeap::new(Length::zero(), Length::zero(), Length::zero()));
        store.inc_ref(id);
        assert_eq!(store.get(id).unwrap().ref_count(), 2);
        assert_eq!(store.dec_ref(id), 1);
        assert_eq!(store.dec_ref(id), 0);
    }

    #[test]
    fn test_slot_reuse_after_free() {
        let mut store = DiffHeapStore::new();
        let first = store.alloc(DiffHeap::new(Length::zero(), Length::zero(), Length::zero()));
        store.free(first);
        let second = store.alloc(DiffHeap::new(Length::zero(), Length::zero(), Length::zero()));
        assert_eq!(first.raw(), second.raw());
        assert_eq!(store.live_count(), 1);
    }
}
