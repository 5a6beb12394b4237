//! The node-level edit operations.

use serde::{Deserialize, Serialize};
use treediff_position::Length;
use treediff_tree::{FieldId, NodeId, ProductionId, StateId, Symbol};

/// How a child hangs off its parent: by grammar field or by child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildLink {
    /// Attached under a declared grammar field.
    Field(FieldId),
    /// Attached at a plain child index.
    Index(u32),
}

/// A child slot as consumers see it in load/unload kid lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildPrototype {
    pub child_id: NodeId,
    pub link: ChildLink,
}

/// The parent context of an attach/detach target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: NodeId,
    pub tag: Symbol,
    pub link: ChildLink,
}

/// Everything a consumer needs to materialise a loaded leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafData {
    pub padding: Length,
    pub size: Length,
    pub lookahead_bytes: u32,
    pub parse_state: StateId,
    pub has_external_tokens: bool,
    pub depends_on_column: bool,
    pub is_keyword: bool,
    /// Opaque external-scanner snapshot, present iff the leaf carries
    /// external tokens.
    pub external_scanner_state: Option<Vec<u8>>,
    /// Lookahead character for column-dependent leaves, when recorded.
    pub lookahead_char: Option<char>,
}

/// Payload of a `LOAD`: leaf data, or the child prototypes of an interior
/// node plus its production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPayload {
    Leaf(LeafData),
    Interior { kids: Vec<ChildPrototype>, production_id: ProductionId },
}

impl LoadPayload {
    /// Whether this payload loads a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, LoadPayload::Leaf(_))
    }
}

/// Literal text of a node changed in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: NodeId,
    pub tag: Symbol,
    pub old_start: Length,
    pub old_size: Length,
    pub new_start: Length,
    pub new_size: Length,
}

/// A new node enters the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    pub id: NodeId,
    pub tag: Symbol,
    pub payload: LoadPayload,
}

/// An existing node gains a parent. `parent` is `None` for the tree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attach {
    pub id: NodeId,
    pub tag: Symbol,
    pub parent: Option<ParentRef>,
}

/// An existing node loses its parent. `parent` is `None` for the tree root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detach {
    pub id: NodeId,
    pub tag: Symbol,
    pub parent: Option<ParentRef>,
}

/// A node leaves the model for good, listing the child slots it released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unload {
    pub id: NodeId,
    pub tag: Symbol,
    pub kids: Vec<ChildPrototype>,
}

/// Fusion of a `LOAD` and an `ATTACH` of the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadAttach {
    pub id: NodeId,
    pub tag: Symbol,
    pub payload: LoadPayload,
    pub parent: Option<ParentRef>,
}

/// Fusion of a `DETACH` and an `UNLOAD` of the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachUnload {
    pub id: NodeId,
    pub tag: Symbol,
    pub kids: Vec<ChildPrototype>,
    pub parent: Option<ParentRef>,
}

/// The sugared edit vocabulary the differ emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edit {
    Update(Update),
    Load(Load),
    Attach(Attach),
    Detach(Detach),
    Unload(Unload),
    LoadAttach(LoadAttach),
    DetachUnload(DetachUnload),
}

/// The five-operation subset consumers replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreEdit {
    Update(Update),
    Load(Load),
    Attach(Attach),
    Detach(Detach),
    Unload(Unload),
}

impl Edit {
    /// The id of the node the edit operates on.
    pub fn id(&self) -> NodeId {
        match self {
            Edit::Update(e) => e.id,
            Edit::Load(e) => e.id,
            Edit::Attach(e) => e.id,
            Edit::Detach(e) => e.id,
            Edit::Unload(e) => e.id,
            Edit::LoadAttach(e) => e.id,
            Edit::DetachUnload(e) => e.id,
        }
    }

    /// Whether the edit removes structure (applied before all positive
    /// edits).
    pub fn is_negative(&self) -> bool {
        matches!(self, Edit::Detach(_) | Edit::Unload(_) | Edit::DetachUnload(_))
    }

    /// Appends this edit's core form to `out`, splitting fusions.
    ///
    /// A fused `DETACH_UNLOAD` splits into detach then unload; a fused
    /// `LOAD_ATTACH` splits into load then attach, preserving replay order.
    pub fn push_core_into(&self, out: &mut Vec<CoreEdit>) {
        match self {
            Edit::Update(e) => out.push(CoreEdit::Update(*e)),
            Edit::Load(e) => out.push(CoreEdit::Load(e.clone())),
            Edit::Attach(e) => out.push(CoreEdit::Attach(*e)),
            Edit::Detach(e) => out.push(CoreEdit::Detach(*e)),
            Edit::Unload(e) => out.push(CoreEdit::Unload(e.clone())),
            Edit::LoadAttach(e) => {
                out.push(CoreEdit::Load(Load { id: e.id, tag: e.tag, payload: e.payload.clone() }));
                out.push(CoreEdit::Attach(Attach { id: e.id, tag: e.tag, parent: e.parent }));
            }
            Edit::DetachUnload(e) => {
                out.push(CoreEdit::Detach(Detach { id: e.id, tag: e.tag, parent: e.parent }));
                out.push(CoreEdit::Unload(Unload { id: e.id, tag: e.tag, kids: e.kids.clone() }));
            }
        }
    }
}
