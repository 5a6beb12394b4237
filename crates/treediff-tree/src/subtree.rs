//! Reference-counted arena storage for subtree entries.

use crate::id::{DiffHeapId, SubtreeId};
use crate::{ProductionId, StateId, Symbol};
use std::sync::Arc;
use treediff_position::Length;

/// Construction parameters for a leaf entry.
///
/// Mirrors everything a parser knows about a token when it creates one, so
/// that a reconstructed leaf is indistinguishable from a freshly parsed one.
#[derive(Debug, Clone, Default)]
pub struct LeafSpec {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    pub parse_state: StateId,
    pub lookahead_bytes: u32,
    pub has_external_tokens: bool,
    pub depends_on_column: bool,
    pub is_keyword: bool,
    pub is_extra: bool,
    pub is_error: bool,
    pub external_scanner_state: Option<Arc<[u8]>>,
    pub lookahead_char: Option<char>,
}

/// One stored subtree: a node's grammar data, measurements and children.
///
/// Entries are shared across trees by reference count. The `diff_heap` slot
/// carries the differ's per-node metadata handle and is opaque at this layer.
#[derive(Debug, Clone)]
pub struct SubtreeData {
    pub symbol: Symbol,
    pub production_id: ProductionId,
    /// Whitespace-and-extras span preceding the node.
    pub padding: Length,
    /// Span of the node's own text, children included.
    pub size: Length,
    pub parse_state: StateId,
    pub lookahead_bytes: u32,
    pub has_changes: bool,
    pub has_external_tokens: bool,
    pub depends_on_column: bool,
    pub is_keyword: bool,
    pub is_extra: bool,
    pub is_error: bool,
    pub external_scanner_state: Option<Arc<[u8]>>,
    pub lookahead_char: Option<char>,
    children: Vec<SubtreeId>,
    ref_count: u32,
    diff_heap: Option<DiffHeapId>,
    live: bool,
}

impl SubtreeData {
    /// The node's children, visible and invisible alike.
    #[inline]
    pub fn children(&self) -> &[SubtreeId] {
        &self.children
    }

    /// Number of children, invisible children included.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether the node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The differ metadata slot, if one is attached.
    #[inline]
    pub fn diff_heap(&self) -> Option<DiffHeapId> {
        self.diff_heap
    }
}

/// Arena of subtree entries with explicit reference counting.
///
/// A single pool backs every tree participating in a diff, so reusing a
/// subtree in the reconstructed tree is a [`retain`](SubtreePool::retain)
/// rather than a deep copy. Entries are freed (and their children released)
/// when the count returns to zero.
#[derive(Debug, Default)]
pub struct SubtreePool {
    slots: Vec<SubtreeData>,
    free: Vec<u32>,
}

impl SubtreePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, data: SubtreeData) -> SubtreeId {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = data;
            SubtreeId::new(index)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(data);
            SubtreeId::new(index)
        }
    }

    /// Allocates a leaf entry with reference count 1.
    pub fn new_leaf(&mut self, spec: LeafSpec) -> SubtreeId {
        self.alloc(SubtreeData {
            symbol: spec.symbol,
            production_id: 0,
            padding: spec.padding,
            size: spec.size,
            parse_state: spec.parse_state,
            lookahead_bytes: spec.lookahead_bytes,
            has_changes: false,
            has_external_tokens: spec.has_external_tokens,
            depends_on_column: spec.depends_on_column,
            is_keyword: spec.is_keyword,
            is_extra: spec.is_extra,
            is_error: spec.is_error,
            external_scanner_state: spec.external_scanner_state,
            lookahead_char: spec.lookahead_char,
            children: Vec::new(),
            ref_count: 1,
            diff_heap: None,
            live: true,
        })
    }

    /// Allocates an interior entry with reference count 1, taking ownership
    /// of one count on each child.
    ///
    /// Padding is inherited from the first child; size covers the remainder
    /// of the children's concatenated spans.
    pub fn new_node(&mut self, symbol: Symbol, production_id: ProductionId, children: Vec<SubtreeId>) -> SubtreeId {
        let mut total = Length::zero();
        let mut padding = Length::zero();
        for (i, &child) in children.iter().enumerate() {
            let entry = self.get(child);
            if i == 0 {
                padding = entry.padding;
            }
            total = total + entry.padding + entry.size;
        }
        let size = Length {
            bytes: total.bytes - padding.bytes,
            extent: subtract_padding(total, padding),
        };
        self.alloc(SubtreeData {
            symbol,
            production_id,
            padding,
            size,
            parse_state: 0,
            lookahead_bytes: 0,
            has_changes: false,
            has_external_tokens: false,
            depends_on_column: false,
            is_keyword: false,
            is_extra: false,
            is_error: false,
            external_scanner_state: None,
            lookahead_char: None,
            children,
            ref_count: 1,
            diff_heap: None,
            live: true,
        })
    }

    /// Borrows an entry.
    #[inline]
    pub fn get(&self, id: SubtreeId) -> &SubtreeData {
        let entry = &self.slots[id.index()];
        debug_assert!(entry.live, "access to freed subtree {id}");
        entry
    }

    /// Mutably borrows an entry.
    #[inline]
    pub fn get_mut(&mut self, id: SubtreeId) -> &mut SubtreeData {
        let entry = &mut self.slots[id.index()];
        debug_assert!(entry.live, "access to freed subtree {id}");
        entry
    }

    /// The children of `id` (shorthand for `get(id).children()`).
    #[inline]
    pub fn children(&self, id: SubtreeId) -> &[SubtreeId] {
        self.get(id).children()
    }

    /// The `index`-th child of `id`, if present.
    #[inline]
    pub fn child(&self, id: SubtreeId, index: usize) -> Option<SubtreeId> {
        self.get(id).children.get(index).copied()
    }

    /// Attaches or clears the differ metadata slot of `id`.
    #[inline]
    pub fn set_diff_heap(&mut self, id: SubtreeId, heap: Option<DiffHeapId>) {
        self.get_mut(id).diff_heap = heap;
    }

    /// Adds one reference to `id`.
    pub fn retain(&mut self, id: SubtreeId) {
        let entry = self.get_mut(id);
        debug_assert!(entry.ref_count > 0);
        entry.ref_count += 1;
    }

    /// Drops one reference to `id`; frees the entry and releases its
    /// children when the count reaches zero.
    pub fn release(&mut self, id: SubtreeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let entry = &mut self.slots[current.index()];
            debug_assert!(entry.live && entry.ref_count > 0, "release of freed subtree {current}");
            entry.ref_count -= 1;
            if entry.ref_count == 0 {
                entry.live = false;
                entry.diff_heap = None;
                entry.external_scanner_state = None;
                pending.extend(std::mem::take(&mut entry.children));
                self.free.push(current.index() as u32);
            }
        }
    }

    /// Current reference count of `id`.
    #[inline]
    pub fn ref_count(&self, id: SubtreeId) -> u32 {
        self.get(id).ref_count
    }

    /// Number of live entries.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|entry| entry.live).count()
    }
}

/// Extent of `total` minus a leading `padding` span.
fn subtract_padding(total: Length, padding: Length) -> treediff_position::Point {
    use treediff_position::Point;
    let rows = total.extent.row - padding.extent.row;
    if rows == 0 {
        Point::new(0, total.extent.column - padding.extent.column)
    } else {
        Point::new(rows, total.extent.column)
    }
}
