//! Explicit-stack traversal over all children of a tree.
//!
//! Grammar-aware cursors usually skip invisible nodes; the differ must see
//! every stored child, so this cursor walks the raw child lists and keeps
//! absolute positions by accumulating padding and size as it moves.

use crate::id::SubtreeId;
use crate::subtree::SubtreePool;
use treediff_position::Length;

#[derive(Debug, Clone, Copy)]
struct Frame {
    id: SubtreeId,
    /// Absolute start of the node's own text (its padding already skipped).
    position: Length,
    /// Index of this node within its parent's child list.
    child_index: usize,
}

/// A depth-first cursor over every stored child, invisible nodes included.
///
/// The cursor holds no borrow of the pool; each movement takes the pool as
/// an argument so callers may interleave traversal with unrelated mutation.
#[derive(Debug)]
pub struct TreeCursor {
    stack: Vec<Frame>,
}

impl TreeCursor {
    /// Positions the cursor on `root`.
    pub fn new(pool: &SubtreePool, root: SubtreeId) -> Self {
        let position = pool.get(root).padding;
        Self { stack: vec![Frame { id: root, position, child_index: 0 }] }
    }

    /// The current node.
    #[inline]
    pub fn node(&self) -> SubtreeId {
        self.top().id
    }

    /// Absolute start position of the current node's text.
    #[inline]
    pub fn position(&self) -> Length {
        self.top().position
    }

    /// Depth of the cursor (1 at the root).
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&self) -> &Frame {
        debug_assert!(!self.stack.is_empty());
        &self.stack[self.stack.len() - 1]
    }

    /// Descends to the first child. Returns false on a leaf.
    pub fn goto_first_child(&mut self, pool: &SubtreePool) -> bool {
        let current = *self.top();
        let Some(child) = pool.child(current.id, 0) else {
            return false;
        };
        // The parent's padding is its first child's padding, so the first
        // child's text starts exactly where the parent's does.
        self.stack.push(Frame { id: child, position: current.position, child_index: 0 });
        true
    }

    /// Moves to the next sibling. Returns false on the last child or root.
    pub fn goto_next_sibling(&mut self, pool: &SubtreePool) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        let current = *self.top();
        let parent = self.stack[self.stack.len() - 2];
        let Some(next) = pool.child(parent.id, current.child_index + 1) else {
            return false;
        };
        let end = current.position + pool.get(current.id).size;
        let position = end + pool.get(next).padding;
        let top = self.stack.len() - 1;
        self.stack[top] = Frame { id: next, position, child_index: current.child_index + 1 };
        true
    }

    /// Ascends to the parent. Returns false at the root.
    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.stack.pop();
        true
    }
}

/// Iterator over `(child, absolute_position)` pairs of one node.
///
/// `start` is the absolute start position of the parent's text.
pub struct ChildWalk<'a> {
    pool: &'a SubtreePool,
    children: &'a [SubtreeId],
    next: usize,
    position: Length,
}

impl<'a> ChildWalk<'a> {
    /// Walks the children of `parent`, whose text starts at `start`.
    pub fn new(pool: &'a SubtreePool, parent: SubtreeId, start: Length) -> Self {
        Self { pool, children: pool.children(parent), next: 0, position: start }
    }
}

impl Iterator for ChildWalk<'_> {
    type Item = (SubtreeId, Length);

    fn next(&mut self) -> Option<Self::Item> {
        let &child = self.children.get(self.next)?;
        let entry = self.pool.get(child);
        if self.next > 0 {
            self.position = self.position + entry.padding;
        }
        let start = self.position;
        self.position = self.position + entry.size;
        self.next += 1;
        Some((child, start))
    }
}
