//! A parse tree: a root entry plus its grammar.

use crate::id::SubtreeId;
use crate::language::Language;
use std::sync::Arc;

/// A parse tree over entries stored in a shared
/// [`SubtreePool`](crate::SubtreePool).
///
/// The tree owns one reference count on its root; dropping that count is the
/// caller's responsibility via [`SubtreePool::release`](crate::SubtreePool::release)
/// since the pool is external to the tree.
#[derive(Debug, Clone)]
pub struct Tree {
    root: SubtreeId,
    language: Arc<Language>,
}

impl Tree {
    /// Wraps a root entry and its grammar as a tree.
    pub fn new(root: SubtreeId, language: Arc<Language>) -> Self {
        Self { root, language }
    }

    /// The root entry.
    #[inline]
    pub fn root(&self) -> SubtreeId {
        self.root
    }

    /// The grammar this tree was parsed with.
    #[inline]
    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }
}
