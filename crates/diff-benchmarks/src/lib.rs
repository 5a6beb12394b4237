//! Fixture generation shared by the diff benchmarks.

use treediff_testkit::Arith;
use treediff_tree::NodeSpec;

/// A statement list of `n` alternating arithmetic and call statements, with
/// literals derived from the index so every leaf is distinct.
pub fn statement_list(arith: &Arith, n: usize) -> NodeSpec {
    let children = (0..n).map(|i| statement(arith, i)).collect();
    NodeSpec::node(arith.seq, children)
}

fn statement(arith: &Arith, index: usize) -> NodeSpec {
    if index % 2 == 0 {
        NodeSpec::node(
            arith.add,
            vec![
                NodeSpec::padded_leaf(arith.integer, " ", format!("{index}")),
                NodeSpec::padded_leaf(arith.integer, " ", format!("{}", index + 1)),
            ],
        )
    } else {
        NodeSpec::node(
            arith.call,
            vec![
                NodeSpec::padded_leaf(arith.identifier, " ", format!("fn{index}")),
                NodeSpec::node(
                    arith.args,
                    vec![NodeSpec::padded_leaf(arith.integer, " ", format!("{index}"))],
                ),
            ],
        )
    }
}

/// The same list with one literal edited in the middle.
pub fn with_literal_edit(arith: &Arith, n: usize) -> NodeSpec {
    let mut children: Vec<NodeSpec> = (0..n).map(|i| statement(arith, i)).collect();
    let middle = n / 2 - (n / 2 % 2);
    children[middle] = NodeSpec::node(
        arith.add,
        vec![
            NodeSpec::padded_leaf(arith.integer, " ", "424242"),
            NodeSpec::padded_leaf(arith.integer, " ", format!("{}", middle + 1)),
        ],
    );
    NodeSpec::node(arith.seq, children)
}

/// The same list with the first and last statements exchanged.
pub fn with_reorder(arith: &Arith, n: usize) -> NodeSpec {
    let mut children: Vec<NodeSpec> = (0..n).map(|i| statement(arith, i)).collect();
    children.swap(0, n - 1);
    NodeSpec::node(arith.seq, children)
}
