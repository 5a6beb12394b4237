//! Identifier types: logical node identity, pool indices, metadata slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, globally unique identity of a logical tree node.
///
/// Identity survives edits whenever a node is reused by the differ; freshly
/// loaded nodes mint new ids. Ids minted by this process never repeat, so
/// two distinct parse trees can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Mints a fresh, never-before-seen id.
    #[inline]
    pub fn mint() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw 64-bit value, for consumers keying external models.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Index of a subtree entry in a [`SubtreePool`](crate::SubtreePool).
///
/// Plain arena index; meaningful only together with the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubtreeId(u32);

impl SubtreeId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        SubtreeId(index)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SubtreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Slot handle for the differ's per-node metadata.
///
/// The tree storage never interprets this; it only keeps one optional slot
/// per subtree entry so the metadata can be found again from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffHeapId(u32);

impl DiffHeapId {
    /// Wraps a raw slot index.
    #[inline]
    pub const fn from_raw(index: u32) -> Self {
        DiffHeapId(index)
    }

    /// The raw slot index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
