//! Shared setup for the diff integration suites.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use treediff_core::{compare_to, initialize, DiffHeapStore, DiffOutcome};
use treediff_testkit::Arith;
use treediff_tree::{NodeId, NodeSpec, SubtreeId, SubtreePool, Tree};

/// A diffed pair of fixture trees plus everything needed to inspect them.
pub struct Diffed {
    pub pool: SubtreePool,
    pub heaps: DiffHeapStore,
    pub arith: Arith,
    pub old_tree: Tree,
    pub new_tree: Tree,
    pub old_code: String,
    pub new_code: String,
    pub outcome: DiffOutcome,
}

/// Builds both fixtures, initializes them and runs the pipeline.
pub fn diff_arith(old_spec: &NodeSpec, new_spec: &NodeSpec) -> Diffed {
    let arith = treediff_testkit::arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (old_tree, old_code) = treediff_testkit::build(&mut pool, &arith.language, old_spec);
    let (new_tree, new_code) = treediff_testkit::build(&mut pool, &arith.language, new_spec);
    initialize(&mut pool, &mut heaps, &old_tree, &old_code, &arith.literal_map).unwrap();
    initialize(&mut pool, &mut heaps, &new_tree, &new_code, &arith.literal_map).unwrap();
    let outcome = compare_to(
        &mut pool,
        &mut heaps,
        &old_tree,
        &new_tree,
        &old_code,
        &new_code,
        &arith.literal_map,
    )
    .unwrap();
    Diffed { pool, heaps, arith, old_tree, new_tree, old_code, new_code, outcome }
}

impl Diffed {
    /// The logical identity of a node reached by a child-index path.
    pub fn node_id_at(&self, root: SubtreeId, path: &[usize]) -> NodeId {
        let subtree = self.subtree_at(root, path);
        let heap_id = self.pool.get(subtree).diff_heap().unwrap();
        self.heaps.get(heap_id).unwrap().id
    }

    /// The subtree reached by a child-index path.
    pub fn subtree_at(&self, root: SubtreeId, path: &[usize]) -> SubtreeId {
        let mut current = root;
        for &index in path {
            current = self.pool.child(current, index).unwrap();
        }
        current
    }

    /// Every subtree of the given tree, preorder.
    pub fn subtrees_of(&self, root: SubtreeId) -> Vec<SubtreeId> {
        let mut out = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            out.push(id);
            pending.extend_from_slice(self.pool.children(id));
        }
        out
    }
}
