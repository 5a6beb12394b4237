//! Dual per-node hash contexts.

use crate::heap::DiffHeap;
use sha2::{Digest, Sha256};
use treediff_tree::{ProductionId, Symbol};

/// The pair of SHA-256 contexts absorbed per node.
///
/// The structural context identifies the node's shape (symbol, production
/// and child structure); the literal context additionally identifies
/// declared-literal text. Children are absorbed in order as their hashes
/// become final, so both hashes are pure functions of the subtree.
pub(crate) struct NodeHasher {
    structural: Sha256,
    literal: Sha256,
}

impl NodeHasher {
    /// Starts both contexts for a node.
    ///
    /// `literal_text` is the node's own text iff its symbol is a declared
    /// literal, empty otherwise.
    pub(crate) fn new(symbol: Symbol, production_id: ProductionId, literal_text: &[u8]) -> Self {
        let mut structural = Sha256::new();
        structural.update(symbol.to_le_bytes());
        structural.update(production_id.to_le_bytes());
        let mut literal = Sha256::new();
        literal.update(literal_text);
        Self { structural, literal }
    }

    /// Absorbs one child's final hashes into both contexts.
    pub(crate) fn absorb_child(&mut self, child: &DiffHeap) {
        self.structural.update(child.structural_hash);
        self.literal.update(child.literal_hash);
    }

    /// Finishes both contexts, returning `(structural, literal)`.
    pub(crate) fn finish(self) -> ([u8; 32], [u8; 32]) {
        (self.structural.finalize().into(), self.literal.finalize().into())
    }
}
