//! Mutable state threaded through one diff invocation.

use crate::error::{DiffError, DiffResult};
use crate::heap::{DiffHeap, DiffHeapStore};
use treediff_edit::ChildLink;
use treediff_position::Length;
use treediff_tree::{DiffHeapId, Language, LiteralMap, NodeId, ProductionId, SubtreeId, SubtreePool};

/// Everything one `compare_to` call owns while it runs.
///
/// The session borrows the pool and heap store exclusively for the duration
/// of the diff; phases are methods on it (share assignment, subtree
/// assignment, edit-script computation live in their own modules).
pub(crate) struct DiffSession<'a> {
    pub(crate) pool: &'a mut SubtreePool,
    pub(crate) heaps: &'a mut DiffHeapStore,
    pub(crate) language: &'a Language,
    pub(crate) literal_map: &'a LiteralMap,
    /// Source text of the original tree.
    pub(crate) self_code: &'a str,
    /// Source text of the changed tree.
    pub(crate) other_code: &'a str,
}

impl DiffSession<'_> {
    /// The metadata slot handle of a node, or the uninitialized error.
    pub(crate) fn heap_id(&self, subtree: SubtreeId) -> DiffResult<DiffHeapId> {
        self.pool.get(subtree).diff_heap().ok_or(DiffError::Uninitialized(subtree))
    }

    /// The heap of a node.
    pub(crate) fn heap(&self, subtree: SubtreeId) -> DiffResult<&DiffHeap> {
        let id = self.heap_id(subtree)?;
        self.heaps.get(id).ok_or(DiffError::Uninitialized(subtree))
    }

    /// The heap of a node, mutably.
    pub(crate) fn heap_mut(&mut self, subtree: SubtreeId) -> DiffResult<&mut DiffHeap> {
        let id = self.heap_id(subtree)?;
        self.heaps.get_mut(id).ok_or(DiffError::Uninitialized(subtree))
    }

    /// The logical identity of a node.
    pub(crate) fn node_id(&self, subtree: SubtreeId) -> DiffResult<NodeId> {
        Ok(self.heap(subtree)?.id)
    }

    /// A node is relevant iff it is visible and either named or a declared
    /// unnamed token. Only relevant nodes appear in edit scripts.
    pub(crate) fn relevant(&self, subtree: SubtreeId) -> bool {
        let symbol = self.pool.get(subtree).symbol;
        self.language.is_visible(symbol)
            && (self.language.is_named(symbol) || self.literal_map.is_unnamed_token(symbol))
    }

    /// Signature equality: same symbol, same child count, same production.
    pub(crate) fn signature_equal(&self, this: SubtreeId, that: SubtreeId) -> bool {
        let this_entry = self.pool.get(this);
        let that_entry = self.pool.get(that);
        this_entry.symbol == that_entry.symbol
            && this_entry.child_count() == that_entry.child_count()
            && this_entry.production_id == that_entry.production_id
    }

    /// The link a child hangs off: the declared field, or its raw index.
    pub(crate) fn child_link(&self, production_id: ProductionId, child_index: u32) -> ChildLink {
        match self.language.field_for_child(production_id, child_index) {
            Some(field) => ChildLink::Field(field),
            None => ChildLink::Index(child_index),
        }
    }

    /// The text a node spans in `code`.
    pub(crate) fn text_at<'c>(&self, code: &'c str, position: Length, size: Length) -> DiffResult<&'c [u8]> {
        let start = position.bytes as usize;
        let end = start + size.bytes as usize;
        code.as_bytes().get(start..end).ok_or(DiffError::CodeRange { start, end, len: code.len() })
    }

    /// The literal text contributed to a node's literal hash: its span in
    /// `code` when its symbol is a declared literal, empty otherwise.
    pub(crate) fn literal_text<'c>(
        &self,
        code: &'c str,
        subtree: SubtreeId,
        position: Length,
    ) -> DiffResult<&'c [u8]> {
        let entry = self.pool.get(subtree);
        if self.literal_map.is_literal(entry.symbol) {
            self.text_at(code, position, entry.size)
        } else {
            Ok(&[])
        }
    }
}
