//! A minimal edit-script consumer.
//!
//! Mirrors a tree's structure keyed by node identity and replays edit
//! scripts against it, the way an external model (database, compiled view)
//! would. Tests build a mirror of the original tree, apply the script, and
//! compare the result against the changed tree's shape.

use std::collections::HashMap;
use treediff_edit::{ChildLink, CoreEdit, EditScript, LoadPayload};
use treediff_tree::{Language, NodeId, SubtreeId, SubtreePool, Symbol, Tree};

#[derive(Debug, Clone)]
struct MirrorNode {
    tag: Symbol,
    children: Vec<NodeId>,
}

/// A consumer-side replica of a tree's relevant structure.
#[derive(Debug, Default, Clone)]
pub struct MirrorModel {
    nodes: HashMap<NodeId, MirrorNode>,
    root: Option<NodeId>,
}

impl MirrorModel {
    /// Mirrors `tree`, resolving node identities through `id_of` (normally
    /// a lookup into the diff metadata store).
    pub fn from_tree(
        pool: &SubtreePool,
        tree: &Tree,
        id_of: &dyn Fn(SubtreeId) -> Option<NodeId>,
    ) -> Self {
        let mut mirror = MirrorModel::default();
        let mut pending = vec![tree.root()];
        while let Some(subtree) = pending.pop() {
            let Some(id) = id_of(subtree) else {
                continue;
            };
            let entry = pool.get(subtree);
            let children: Vec<NodeId> =
                entry.children().iter().filter_map(|&child| id_of(child)).collect();
            mirror.nodes.insert(id, MirrorNode { tag: entry.symbol, children });
            pending.extend_from_slice(entry.children());
        }
        mirror.root = id_of(tree.root());
        mirror
    }

    /// Replays a finalised script: core edits in order, negative before
    /// positive by construction.
    pub fn apply(&mut self, script: &EditScript) {
        for edit in script.to_core() {
            match edit {
                CoreEdit::Detach(detach) => match detach.parent {
                    None => {
                        if self.root == Some(detach.id) {
                            self.root = None;
                        }
                    }
                    Some(parent) => {
                        if let Some(entry) = self.nodes.get_mut(&parent.id) {
                            entry.children.retain(|&child| child != detach.id);
                        }
                    }
                },
                CoreEdit::Unload(unload) => {
                    self.nodes.remove(&unload.id);
                }
                CoreEdit::Load(load) => {
                    let children = match &load.payload {
                        LoadPayload::Interior { kids, .. } =>
                            kids.iter().map(|kid| kid.child_id).collect(),
                        LoadPayload::Leaf(_) => Vec::new(),
                    };
                    self.nodes.insert(load.id, MirrorNode { tag: load.tag, children });
                }
                CoreEdit::Attach(attach) => match attach.parent {
                    None => self.root = Some(attach.id),
                    Some(parent) => {
                        if let Some(entry) = self.nodes.get_mut(&parent.id) {
                            let index = match parent.link {
                                ChildLink::Index(index) =>
                                    (index as usize).min(entry.children.len()),
                                ChildLink::Field(_) => entry.children.len(),
                            };
                            entry.children.insert(index, attach.id);
                        }
                    }
                },
                // Literal moves do not change the mirrored shape.
                CoreEdit::Update(_) => {}
            }
        }
    }

    /// Number of mirrored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the mirror holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The current root identity.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Renders the shape as a symbol s-expression, e.g. `seq(a, b(x))`.
    ///
    /// Dangling child references render as `?`, so structural breakage shows
    /// up in test diffs instead of panicking.
    pub fn render(&self, language: &Language) -> String {
        let mut out = String::new();
        match self.root {
            Some(root) => self.render_node(language, root, &mut out),
            None => out.push_str("<empty>"),
        }
        out
    }

    fn render_node(&self, language: &Language, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            out.push('?');
            return;
        };
        out.push_str(language.symbol_name(node.tag).unwrap_or("<unknown>"));
        if !node.children.is_empty() {
            out.push('(');
            for (index, &child) in node.children.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                self.render_node(language, child, out);
            }
            out.push(')');
        }
    }
}

/// Renders a tree's shape with the same syntax as [`MirrorModel::render`],
/// for equality assertions against a replayed mirror.
pub fn render_tree(pool: &SubtreePool, tree: &Tree, language: &Language) -> String {
    let mut out = String::new();
    render_subtree(pool, language, tree.root(), &mut out);
    out
}

fn render_subtree(pool: &SubtreePool, language: &Language, subtree: SubtreeId, out: &mut String) {
    let entry = pool.get(subtree);
    out.push_str(language.symbol_name(entry.symbol).unwrap_or("<unknown>"));
    if !entry.is_leaf() {
        out.push('(');
        for (index, &child) in entry.children().iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            render_subtree(pool, language, child, out);
        }
        out.push(')');
    }
}
