//! Identity-preserving incremental syntax-tree diff engine.
//!
//! Given two parse trees of the same grammar (an *original* tree and a
//! *changed* tree parsed from edited source), this crate computes a minimal
//! edit script over a fixed vocabulary of node-level operations, and a
//! reconstructed tree that reuses as much of the original tree's storage as
//! possible. Node identities survive edits whenever structural (and
//! preferably literal) content is reused, so consumers can mirror the tree
//! in external models and replay only what changed.
//!
//! ## Pipeline
//!
//! 1. [`initialize`] both trees: every node gets a [`DiffHeap`] with a
//!    fresh identity, dual SHA-256 hashes, size, height and position.
//! 2. Share assignment: a simultaneous walk indexes reusable original
//!    subtrees by structural hash and commits obvious whole-subtree reuses.
//! 3. Subtree assignment: a height-first scan pairs changed-tree nodes with
//!    candidates, preferring literal-equal matches.
//! 4. Edit-script computation: a bottom-up walk emits edits into the fusing
//!    buffer and builds the reconstructed tree.
//!
//! ```text
//! initialize(T1) -> initialize(T2) -> assign_shares -> assign_subtrees
//!     -> compute_edit_script -> (EditScript, reconstructed Tree)
//! ```
//!
//! The whole pipeline runs to completion inside one [`compare_to`] call;
//! nothing is retained between invocations except the heaps attached to the
//! trees themselves.

mod assign;
mod error;
mod graph;
mod hashing;
mod heap;
mod init;
mod pqueue;
mod registry;
mod script;
mod session;
mod share;

pub use error::{DiffError, DiffResult};
pub use graph::tree_diff_graph;
pub use heap::{DiffHeap, DiffHeapStore};
pub use init::{delete_heaps, initialize};
pub use share::ShareId;

use crate::registry::SubtreeRegistry;
use crate::session::DiffSession;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};
use treediff_edit::{EditScript, EditScriptBuffer};
use treediff_tree::{LiteralMap, SubtreeId, SubtreePool, Tree};

/// What a diff invocation hands back to the caller.
#[derive(Debug)]
pub struct DiffOutcome {
    /// The reconstructed tree, sharing storage with the original wherever
    /// nodes were reused.
    pub tree: Tree,
    /// The finalised edit script (negative edits before positive ones).
    pub edit_script: EditScript,
    /// Whether the reconstructed root's structural hash matches the changed
    /// tree's root. When false, the script is still well-formed and
    /// returned for inspection.
    pub success: bool,
}

/// Diffs `this_tree` against `that_tree` and returns the edit script plus
/// the reconstructed tree.
///
/// Both trees must have been [`initialize`]d against their source texts.
/// The registry and every share created along the way live and die inside
/// this call.
pub fn compare_to(
    pool: &mut SubtreePool,
    heaps: &mut DiffHeapStore,
    this_tree: &Tree,
    that_tree: &Tree,
    self_code: &str,
    other_code: &str,
    literal_map: &LiteralMap,
) -> DiffResult<DiffOutcome> {
    run_pipeline(pool, heaps, this_tree, that_tree, self_code, other_code, literal_map, None)
}

/// As [`compare_to`], additionally writing the assignment visualisation as
/// a DOT document to `graph_out` between the assignment phases and the
/// edit-script computation.
pub fn compare_to_with_graph(
    pool: &mut SubtreePool,
    heaps: &mut DiffHeapStore,
    this_tree: &Tree,
    that_tree: &Tree,
    self_code: &str,
    other_code: &str,
    literal_map: &LiteralMap,
    graph_out: &mut dyn Write,
) -> DiffResult<DiffOutcome> {
    run_pipeline(
        pool,
        heaps,
        this_tree,
        that_tree,
        self_code,
        other_code,
        literal_map,
        Some(graph_out),
    )
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline(
    pool: &mut SubtreePool,
    heaps: &mut DiffHeapStore,
    this_tree: &Tree,
    that_tree: &Tree,
    self_code: &str,
    other_code: &str,
    literal_map: &LiteralMap,
    graph_out: Option<&mut dyn Write>,
) -> DiffResult<DiffOutcome> {
    if this_tree.language().name() != that_tree.language().name() {
        return Err(DiffError::LanguageMismatch {
            left: this_tree.language().name().to_string(),
            right: that_tree.language().name().to_string(),
        });
    }
    let language = Arc::clone(this_tree.language());
    let mut session = DiffSession {
        pool,
        heaps,
        language: language.as_ref(),
        literal_map,
        self_code,
        other_code,
    };
    let this_root = this_tree.root();
    let that_root = that_tree.root();

    let mut registry = SubtreeRegistry::new();
    debug!("assigning shares");
    session.assign_shares(&mut registry, this_root, that_root)?;
    debug!("assigning subtrees");
    session.assign_subtrees(&mut registry, that_root)?;

    if let Some(out) = graph_out {
        tree_diff_graph(session.pool, session.heaps, this_tree, that_tree, &language, out)?;
    }

    debug!("computing edit script");
    let mut buffer = EditScriptBuffer::new();
    let root = session.compute_edit_script(&mut buffer, this_root, that_root, None)?;
    let edit_script = buffer.finalize();

    let success =
        session.heap(root)?.structural_hash == session.heap(that_root)?.structural_hash;
    if !success {
        warn!("reconstructed tree does not hash-match the changed tree");
    }
    debug!(edits = edit_script.len(), success, "edit script finalized");

    Ok(DiffOutcome { tree: Tree::new(root, language), edit_script, success })
}

/// Records a preemptive pairing hint between a node of one tree and a node
/// of another, as a host parser does when it preserves metadata across
/// reparses.
///
/// The hint is not a commitment: share assignment promotes it to a real
/// pairing only when both endpoints are reached in the same diff.
pub fn set_preemptive_assignment(
    pool: &SubtreePool,
    heaps: &mut DiffHeapStore,
    this: SubtreeId,
    that: SubtreeId,
) -> DiffResult<()> {
    let this_heap_id = pool.get(this).diff_heap().ok_or(DiffError::Uninitialized(this))?;
    let that_heap_id = pool.get(that).diff_heap().ok_or(DiffError::Uninitialized(that))?;
    heaps
        .get_mut(this_heap_id)
        .ok_or(DiffError::Uninitialized(this))?
        .preemptive_assignment = Some(that);
    heaps
        .get_mut(that_heap_id)
        .ok_or(DiffError::Uninitialized(that))?
        .preemptive_assignment = Some(this);
    Ok(())
}
