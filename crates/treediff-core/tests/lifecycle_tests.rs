//! Assignment-state and storage lifecycle invariants after a diff.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::diff_arith;
use treediff_core::delete_heaps;
use treediff_tree::NodeSpec;

fn fixtures(arith: &treediff_testkit::Arith) -> (NodeSpec, NodeSpec) {
    let a = NodeSpec::node(
        arith.add,
        vec![
            NodeSpec::leaf(arith.integer, "1"),
            NodeSpec::padded_leaf(arith.integer, " ", "2"),
        ],
    );
    let b = NodeSpec::node(
        arith.call,
        vec![
            NodeSpec::leaf(arith.identifier, "f"),
            NodeSpec::node(arith.args, vec![NodeSpec::padded_leaf(arith.integer, " ", "3")]),
        ],
    );
    let old = NodeSpec::node(arith.seq, vec![a.clone(), b.clone()]);
    let new = NodeSpec::node(arith.seq, vec![b, a]);
    (old, new)
}

#[test]
fn test_reconstructed_tree_carries_no_assignment_state() {
    let arith = treediff_testkit::arith().unwrap();
    let (old, new) = fixtures(&arith);
    let diffed = diff_arith(&old, &new);

    for subtree in diffed.subtrees_of(diffed.outcome.tree.root()) {
        let heap = diffed.heaps.get(diffed.pool.get(subtree).diff_heap().unwrap()).unwrap();
        assert!(heap.assigned.is_none(), "leaked pairing on {subtree}");
        assert!(heap.share.is_none(), "leaked share on {subtree}");
    }
}

#[test]
fn test_reused_nodes_hash_equal_to_their_counterparts() {
    let arith = treediff_testkit::arith().unwrap();
    let (old, new) = fixtures(&arith);
    let diffed = diff_arith(&old, &new);

    // The swapped children are reused: each reconstructed child has the
    // structural and literal hashes of its changed-tree counterpart.
    for index in 0..2 {
        let rebuilt = diffed.subtree_at(diffed.outcome.tree.root(), &[index]);
        let wanted = diffed.subtree_at(diffed.new_tree.root(), &[index]);
        let rebuilt_heap = diffed.heaps.get(diffed.pool.get(rebuilt).diff_heap().unwrap()).unwrap();
        let wanted_heap = diffed.heaps.get(diffed.pool.get(wanted).diff_heap().unwrap()).unwrap();
        assert_eq!(rebuilt_heap.structural_hash, wanted_heap.structural_hash);
        assert_eq!(rebuilt_heap.literal_hash, wanted_heap.literal_hash);
    }
}

#[test]
fn test_heap_storage_drains_after_all_trees_are_deleted() {
    let arith = treediff_testkit::arith().unwrap();
    let (old, new) = fixtures(&arith);
    let mut diffed = diff_arith(&old, &new);

    assert!(diffed.heaps.live_count() > 0);
    let old_tree = diffed.old_tree.clone();
    let new_tree = diffed.new_tree.clone();
    let rebuilt = diffed.outcome.tree.clone();
    delete_heaps(&mut diffed.pool, &mut diffed.heaps, &old_tree);
    delete_heaps(&mut diffed.pool, &mut diffed.heaps, &new_tree);
    delete_heaps(&mut diffed.pool, &mut diffed.heaps, &rebuilt);
    assert_eq!(diffed.heaps.live_count(), 0);

    diffed.pool.release(old_tree.root());
    diffed.pool.release(new_tree.root());
    diffed.pool.release(rebuilt.root());
    assert_eq!(diffed.pool.live_count(), 0);
}
