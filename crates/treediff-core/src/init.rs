//! Attaching and detaching per-node diff metadata.

use crate::error::{DiffError, DiffResult};
use crate::hashing::NodeHasher;
use crate::heap::{DiffHeap, DiffHeapStore};
use treediff_position::Length;
use treediff_tree::{DiffHeapId, LiteralMap, SubtreeId, SubtreePool, Tree};

struct InitFrame {
    id: SubtreeId,
    /// Absolute start of the node's text.
    start: Length,
    /// Running end position, for placing the next child.
    run: Length,
    next_child: usize,
    /// `None` when the node already carries a heap (refresh only).
    hasher: Option<NodeHasher>,
    height: u32,
    size: u32,
}

/// Attaches a `DiffHeap` to every node of `tree`, post-order.
///
/// Idempotent: a node that already carries metadata (from a previous diff or
/// an incremental reparse) keeps its identity and hashes and only has its
/// position, padding and size refreshed. Fresh nodes get a new identity and
/// full dual-hash computation. The walk uses explicit frames, so arbitrarily
/// deep trees cannot exhaust the call stack.
pub fn initialize(
    pool: &mut SubtreePool,
    heaps: &mut DiffHeapStore,
    tree: &Tree,
    code: &str,
    literal_map: &LiteralMap,
) -> DiffResult<()> {
    let root = tree.root();
    let root_start = pool.get(root).padding;
    let mut stack = vec![make_frame(pool, heaps, literal_map, code, root, root_start)?];

    loop {
        let (top_id, next_child, top_start, top_run) = match stack.last() {
            Some(top) => (top.id, top.next_child, top.start, top.run),
            None => break,
        };
        if let Some(child) = pool.child(top_id, next_child) {
            let child_entry = pool.get(child);
            let child_start = if next_child == 0 { top_start } else { top_run + child_entry.padding };
            let child_end = child_start + child_entry.size;
            let frame = make_frame(pool, heaps, literal_map, code, child, child_start)?;
            if let Some(top) = stack.last_mut() {
                top.run = child_end;
                top.next_child += 1;
            }
            stack.push(frame);
        } else {
            let Some(finished) = stack.pop() else {
                break;
            };
            let finished_id = finished.id;
            let heap_id = finish_frame(pool, heaps, finished)?;
            if let Some(parent) = stack.last_mut()
                && parent.hasher.is_some()
            {
                let child_heap = heaps.get(heap_id).ok_or(DiffError::Uninitialized(finished_id))?;
                parent.height = parent.height.max(child_heap.treeheight);
                parent.size += child_heap.treesize;
                if let Some(hasher) = &mut parent.hasher {
                    hasher.absorb_child(child_heap);
                }
            }
        }
    }
    Ok(())
}

fn make_frame(
    pool: &SubtreePool,
    heaps: &mut DiffHeapStore,
    literal_map: &LiteralMap,
    code: &str,
    id: SubtreeId,
    start: Length,
) -> DiffResult<InitFrame> {
    let entry = pool.get(id);
    let hasher = match entry.diff_heap() {
        Some(heap_id) => {
            let heap = heaps.get_mut(heap_id).ok_or(DiffError::Uninitialized(id))?;
            heap.position = start;
            heap.padding = entry.padding;
            heap.size = entry.size;
            None
        }
        None => {
            let literal_text = if literal_map.is_literal(entry.symbol) {
                let begin = start.bytes as usize;
                let end = begin + entry.size.bytes as usize;
                code.as_bytes().get(begin..end).ok_or(DiffError::CodeRange {
                    start: begin,
                    end,
                    len: code.len(),
                })?
            } else {
                &[]
            };
            Some(NodeHasher::new(entry.symbol, entry.production_id, literal_text))
        }
    };
    Ok(InitFrame { id, start, run: start, next_child: 0, hasher, height: 0, size: 0 })
}

fn finish_frame(pool: &mut SubtreePool, heaps: &mut DiffHeapStore, frame: InitFrame) -> DiffResult<DiffHeapId> {
    match frame.hasher {
        None => pool.get(frame.id).diff_heap().ok_or(DiffError::Uninitialized(frame.id)),
        Some(hasher) => {
            let entry = pool.get(frame.id);
            let mut heap = DiffHeap::new(frame.start, entry.padding, entry.size);
            heap.treesize = 1 + frame.size;
            heap.treeheight = 1 + frame.height;
            let (structural, literal) = hasher.finish();
            heap.structural_hash = structural;
            heap.literal_hash = literal;
            let heap_id = heaps.alloc(heap);
            pool.set_diff_heap(frame.id, Some(heap_id));
            Ok(heap_id)
        }
    }
}

/// Drops the metadata of every node of `tree`.
///
/// Heaps are reference counted: a heap shared with a reconstructed tree
/// survives until the last tree carrying it is deleted.
pub fn delete_heaps(pool: &mut SubtreePool, heaps: &mut DiffHeapStore, tree: &Tree) {
    let mut pending = vec![tree.root()];
    while let Some(id) = pending.pop() {
        pending.extend_from_slice(pool.children(id));
        if let Some(heap_id) = pool.get(id).diff_heap()
            && heaps.dec_ref(heap_id) == 0
        {
            heaps.free(heap_id);
            pool.set_diff_heap(id, None);
        }
    }
}
