//! Per-hash buckets of reuse candidates.

use std::collections::BTreeMap;
use treediff_tree::{NodeId, SubtreeId};

/// Index of a share in the registry's share arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareId(u32);

impl ShareId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        ShareId(index)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The bucket of still-reusable original subtrees sharing one structural
/// hash.
///
/// `available` is keyed by node identity; ordered maps keep candidate
/// selection reproducible within a run. The `preferred` index by literal
/// hash is only built once the first preferred lookup asks for it, since
/// most shares are consumed structurally or not at all.
#[derive(Debug, Default)]
pub(crate) struct SubtreeShare {
    available: BTreeMap<NodeId, SubtreeId>,
    preferred: Option<BTreeMap<[u8; 32], SubtreeId>>,
}

impl SubtreeShare {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes `subtree` available, indexing it by literal hash as well when
    /// the preferred index already exists.
    pub(crate) fn register(&mut self, node_id: NodeId, literal_hash: [u8; 32], subtree: SubtreeId) {
        self.available.insert(node_id, subtree);
        if let Some(preferred) = &mut self.preferred {
            preferred.insert(literal_hash, subtree);
        }
    }

    /// Removes `subtree` from both maps. The preferred entry is only
    /// removed when it still points at this subtree (another candidate with
    /// the same literal hash may have overwritten it).
    pub(crate) fn unregister(&mut self, node_id: NodeId, literal_hash: [u8; 32], subtree: SubtreeId) {
        self.available.remove(&node_id);
        if let Some(preferred) = &mut self.preferred
            && preferred.get(&literal_hash) == Some(&subtree)
        {
            preferred.remove(&literal_hash);
        }
    }

    /// Whether the literal-hash index has been built yet.
    pub(crate) fn preferred_built(&self) -> bool {
        self.preferred.is_some()
    }

    /// Installs the lazily-built literal-hash index.
    pub(crate) fn set_preferred(&mut self, preferred: BTreeMap<[u8; 32], SubtreeId>) {
        self.preferred = Some(preferred);
    }

    /// Looks up a candidate by literal hash. Only meaningful after the
    /// preferred index was built.
    pub(crate) fn preferred_get(&self, literal_hash: &[u8; 32]) -> Option<SubtreeId> {
        self.preferred.as_ref().and_then(|preferred| preferred.get(literal_hash).copied())
    }

    /// Any available candidate (the lowest node id, i.e. the oldest).
    pub(crate) fn first_available(&self) -> Option<SubtreeId> {
        self.available.first_key_value().map(|(_, &subtree)| subtree)
    }

    /// The available candidates, for building the preferred index.
    pub(crate) fn available(&self) -> impl Iterator<Item = SubtreeId> + '_ {
        self.available.values().copied()
    }

    /// Number of available candidates.
    #[cfg(test)]
    pub(crate) fn available_len(&self) -> usize {
        self.available.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    use treediff_tree::{LeafSpec, SubtreePool};

    fn two_subtrees() -> (SubtreeId, SubtreeId) {
        let mut pool = SubtreePool::new();
        (pool.new_leaf(LeafSpec::default()), pool.new_leaf(LeafSpec::default()))
    }

    #[test]
    fn test_first_available_is_oldest() {
        let (s0, s1) = two_subtrees();
        let a = NodeId::mint();
        let b = NodeId::mint();
        let mut share = SubtreeShare::new();
        share.register(b, [2; 32], s1);
        share.register(a, [1; 32], s0);
        // `a` was minted first, so it sorts first.
        assert_eq!(share.first_available(), Some(s0));
        assert_eq!(share.available_len(), 2);
    }

    #[test]
    fn test_unregister_preserves_overwritten_preferred_entry() {
        let (s0, s1) = two_subtrees();
        let a = NodeId::mint();
        let b = NodeId::mint();
        let mut share = SubtreeShare::new();
        share.set_preferred(BTreeMap::new());
        share.register(a, [7; 32], s0);
        share.register(b, [7; 32], s1); // same literal hash, overwrites
        share.unregister(a, [7; 32], s0);
        assert_eq!(share.preferred_get(&[7; 32]), Some(s1));
    }
}
