//! Metadata initialization: hashes, measurements, idempotency, teardown.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use treediff_core::{delete_heaps, initialize, DiffHeapStore};
use treediff_testkit::arith;
use treediff_tree::{NodeSpec, SubtreeId, SubtreePool};

fn sample_spec(arith: &treediff_testkit::Arith) -> NodeSpec {
    NodeSpec::node(
        arith.expr,
        vec![NodeSpec::node(
            arith.add,
            vec![
                NodeSpec::leaf(arith.integer, "1"),
                NodeSpec::padded_leaf(arith.plus, " ", "+"),
                NodeSpec::padded_leaf(arith.integer, " ", "2"),
            ],
        )],
    )
}

fn all_subtrees(pool: &SubtreePool, root: SubtreeId) -> Vec<SubtreeId> {
    let mut out = Vec::new();
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        out.push(id);
        pending.extend_from_slice(pool.children(id));
    }
    out
}

#[test]
fn test_size_and_height_law() {
    let arith = arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (tree, code) = treediff_testkit::build(&mut pool, &arith.language, &sample_spec(&arith));
    initialize(&mut pool, &mut heaps, &tree, &code, &arith.literal_map).unwrap();

    for id in all_subtrees(&pool, tree.root()) {
        let heap = heaps.get(pool.get(id).diff_heap().unwrap()).unwrap();
        let children = pool.children(id);
        let child_sizes: u32 = children
            .iter()
            .map(|&c| heaps.get(pool.get(c).diff_heap().unwrap()).unwrap().treesize)
            .sum();
        let child_height: u32 = children
            .iter()
            .map(|&c| heaps.get(pool.get(c).diff_heap().unwrap()).unwrap().treeheight)
            .max()
            .unwrap_or(0);
        assert_eq!(heap.treesize, 1 + child_sizes);
        assert_eq!(heap.treeheight, 1 + child_height);
    }
}

#[test]
fn test_hashes_deterministic_across_identical_trees() {
    let arith = arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (first, code_a) = treediff_testkit::build(&mut pool, &arith.language, &sample_spec(&arith));
    let (second, code_b) = treediff_testkit::build(&mut pool, &arith.language, &sample_spec(&arith));
    initialize(&mut pool, &mut heaps, &first, &code_a, &arith.literal_map).unwrap();
    initialize(&mut pool, &mut heaps, &second, &code_b, &arith.literal_map).unwrap();

    let lhs = all_subtrees(&pool, first.root());
    let rhs = all_subtrees(&pool, second.root());
    assert_eq!(lhs.len(), rhs.len());
    for (a, b) in lhs.into_iter().zip(rhs) {
        let heap_a = heaps.get(pool.get(a).diff_heap().unwrap()).unwrap();
        let heap_b = heaps.get(pool.get(b).diff_heap().unwrap()).unwrap();
        assert_eq!(heap_a.structural_hash, heap_b.structural_hash);
        assert_eq!(heap_a.literal_hash, heap_b.literal_hash);
        // Distinct trees never share identities.
        assert_ne!(heap_a.id, heap_b.id);
    }
}

#[test]
fn test_literal_text_reaches_only_literal_hash() {
    let arith = arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let spec_one = NodeSpec::node(arith.add, vec![NodeSpec::leaf(arith.integer, "1")]);
    let spec_two = NodeSpec::node(arith.add, vec![NodeSpec::leaf(arith.integer, "2")]);
    let (one, code_one) = treediff_testkit::build(&mut pool, &arith.language, &spec_one);
    let (two, code_two) = treediff_testkit::build(&mut pool, &arith.language, &spec_two);
    initialize(&mut pool, &mut heaps, &one, &code_one, &arith.literal_map).unwrap();
    initialize(&mut pool, &mut heaps, &two, &code_two, &arith.literal_map).unwrap();

    let heap_one = heaps.get(pool.get(one.root()).diff_heap().unwrap()).unwrap();
    let heap_two = heaps.get(pool.get(two.root()).diff_heap().unwrap()).unwrap();
    assert_eq!(heap_one.structural_hash, heap_two.structural_hash);
    assert_ne!(heap_one.literal_hash, heap_two.literal_hash);
}

#[test]
fn test_reinitialize_refreshes_without_new_identity() {
    let arith = arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (tree, code) = treediff_testkit::build(&mut pool, &arith.language, &sample_spec(&arith));
    initialize(&mut pool, &mut heaps, &tree, &code, &arith.literal_map).unwrap();

    let before: Vec<_> = all_subtrees(&pool, tree.root())
        .into_iter()
        .map(|id| {
            let heap = heaps.get(pool.get(id).diff_heap().unwrap()).unwrap();
            (heap.id, heap.structural_hash, heap.literal_hash)
        })
        .collect();

    initialize(&mut pool, &mut heaps, &tree, &code, &arith.literal_map).unwrap();

    let after: Vec<_> = all_subtrees(&pool, tree.root())
        .into_iter()
        .map(|id| {
            let heap = heaps.get(pool.get(id).diff_heap().unwrap()).unwrap();
            (heap.id, heap.structural_hash, heap.literal_hash)
        })
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_delete_heaps_frees_everything() {
    let arith = arith().unwrap();
    let mut pool = SubtreePool::new();
    let mut heaps = DiffHeapStore::new();
    let (tree, code) = treediff_testkit::build(&mut pool, &arith.language, &sample_spec(&arith));
    initialize(&mut pool, &mut heaps, &tree, &code, &arith.literal_map).unwrap();
    assert_eq!(heaps.live_count(), all_subtrees(&pool, tree.root()).len());

    delete_heaps(&mut pool, &mut heaps, &tree);
    assert_eq!(heaps.live_count(), 0);
    assert!(pool.get(tree.root()).diff_heap().is_none());
}
