//! DOT visualisation of assignment state.
//!
//! Renders both trees as two `digraph` documents into one stream. Paired
//! nodes share a fill color from a fixed 63-entry palette, so reuse is
//! visible at a glance when the output is rendered.

use crate::error::{DiffError, DiffResult};
use crate::heap::{DiffHeap, DiffHeapStore};
use std::io::Write;
use treediff_tree::{Language, NodeId, SubtreeId, SubtreePool, Tree};

const COLORS: [[u8; 3]; 63] = [
    [213, 255, 0],
    [255, 0, 86],
    [158, 0, 142],
    [14, 76, 161],
    [255, 229, 2],
    [0, 95, 57],
    [0, 255, 0],
    [149, 0, 58],
    [255, 147, 126],
    [164, 36, 0],
    [0, 21, 68],
    [145, 208, 203],
    [98, 14, 0],
    [107, 104, 130],
    [0, 0, 255],
    [0, 125, 181],
    [106, 130, 108],
    [0, 174, 126],
    [194, 140, 159],
    [190, 153, 112],
    [0, 143, 156],
    [95, 173, 78],
    [255, 0, 0],
    [255, 0, 246],
    [255, 2, 157],
    [104, 61, 59],
    [255, 116, 163],
    [150, 138, 232],
    [152, 255, 82],
    [167, 87, 64],
    [1, 255, 254],
    [255, 238, 232],
    [254, 137, 0],
    [189, 198, 255],
    [1, 208, 255],
    [187, 136, 0],
    [117, 68, 177],
    [165, 255, 210],
    [255, 166, 254],
    [119, 77, 0],
    [122, 71, 130],
    [38, 52, 0],
    [0, 71, 84],
    [67, 0, 44],
    [181, 0, 255],
    [255, 177, 103],
    [255, 219, 102],
    [144, 251, 146],
    [126, 45, 210],
    [189, 211, 147],
    [229, 111, 254],
    [222, 255, 116],
    [0, 255, 120],
    [0, 155, 255],
    [0, 100, 1],
    [0, 118, 255],
    [133, 169, 0],
    [0, 185, 23],
    [120, 130, 49],
    [0, 255, 198],
    [255, 110, 65],
    [232, 94, 190],
    [1, 0, 103],
];

struct ColorMapping {
    one: NodeId,
    two: NodeId,
    color: usize,
}

/// Writes the DOT document visualising the current assignment of both
/// trees.
///
/// Meaningful between the assignment phases and edit-script emission; at
/// other times nodes simply render uncolored.
pub fn tree_diff_graph(
    pool: &SubtreePool,
    heaps: &DiffHeapStore,
    this_tree: &Tree,
    that_tree: &Tree,
    language: &Language,
    out: &mut dyn Write,
) -> DiffResult<()> {
    let mut table = Vec::new();
    for root in [this_tree.root(), that_tree.root()] {
        writeln!(out, "digraph tree {{")?;
        writeln!(out, "edge [arrowhead=none]")?;
        graph_node(pool, heaps, language, out, root, None, &mut table)?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

fn heap_of<'h>(pool: &SubtreePool, heaps: &'h DiffHeapStore, id: SubtreeId) -> DiffResult<&'h DiffHeap> {
    pool.get(id).diff_heap().and_then(|slot| heaps.get(slot)).ok_or(DiffError::Uninitialized(id))
}

fn find_color(table: &mut Vec<ColorMapping>, id: NodeId) -> Option<usize> {
    let index = table.iter().position(|mapping| mapping.one == id || mapping.two == id)?;
    Some(table.swap_remove(index).color)
}

fn graph_node(
    pool: &SubtreePool,
    heaps: &DiffHeapStore,
    language: &Language,
    out: &mut dyn Write,
    id: SubtreeId,
    inherited: Option<usize>,
    table: &mut Vec<ColorMapping>,
) -> DiffResult<()> {
    let entry = pool.get(id);
    let heap = heap_of(pool, heaps, id)?;
    write!(out, "tree_{} [label=\"", heap.id)?;
    write_dot_string(out, language.symbol_name(entry.symbol).unwrap_or("<unknown>"))?;
    write!(out, "\"")?;
    if entry.is_leaf() {
        write!(out, ", shape=plaintext")?;
    }

    let mut color = inherited;
    if color.is_none()
        && let Some(assigned) = heap.assigned
    {
        let assigned_id = heap_of(pool, heaps, assigned)?.id;
        color = find_color(table, heap.id).or_else(|| find_color(table, assigned_id)).or_else(|| {
            let next = table.len() % COLORS.len();
            table.push(ColorMapping { one: heap.id, two: assigned_id, color: next });
            Some(next)
        });
    }
    if let Some(color) = color {
        let [r, g, b] = COLORS[color];
        write!(out, ", style=filled, fillcolor=\"#{r:02X}{g:02X}{b:02X}\"")?;
    }
    writeln!(out, "]")?;

    let parent_id = heap.id;
    for (index, &child) in pool.children(id).iter().enumerate() {
        graph_node(pool, heaps, language, out, child, color, table)?;
        let child_id = heap_of(pool, heaps, child)?.id;
        writeln!(out, "tree_{parent_id} -> tree_{child_id} [tooltip={index}]")?;
    }
    Ok(())
}

fn write_dot_string(out: &mut dyn Write, text: &str) -> DiffResult<()> {
    for ch in text.chars() {
        match ch {
            '"' => write!(out, "\\\"")?,
            '\n' => write!(out, "\\n")?,
            other => write!(out, "{other}")?,
        }
    }
    Ok(())
}
