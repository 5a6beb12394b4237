//! Edit-script computation and tree reconstruction.
//!
//! Walks the two trees bottom-up after the assignment phases, emitting edits
//! into the buffer while building the reconstructed tree. Reused nodes carry
//! their heaps (and thus identities) into the new tree; replaced regions are
//! unloaded on the original side and loaded fresh on the changed side.

use crate::error::{DiffError, DiffResult};
use crate::hashing::NodeHasher;
use crate::heap::DiffHeap;
use crate::session::DiffSession;
use treediff_edit::{
    Attach, ChildPrototype, Detach, Edit, EditScriptBuffer, LeafData, Load, LoadPayload, ParentRef,
    Unload, Update,
};
use treediff_tree::{LeafSpec, ProductionId, SubtreeId};

/// Whether a node's removal still needs announcing with a `DETACH`.
///
/// `Covered` means an emitted detach or an ancestor's unload already told
/// consumers; `CascadeNext` marks the child level of an irrelevant subtree
/// root as the (single) level where deferred detaches are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetachCover {
    Covered,
    CascadeNext,
    CascadeNow,
}

impl DiffSession<'_> {
    /// Computes the edit script for `(this, that)` and returns the root of
    /// the reconstructed subtree.
    ///
    /// `parent` is the attachment context shared by the outgoing and the
    /// incoming node (`None` at the tree root).
    pub(crate) fn compute_edit_script(
        &mut self,
        buffer: &mut EditScriptBuffer,
        this: SubtreeId,
        that: SubtreeId,
        parent: Option<ParentRef>,
    ) -> DiffResult<SubtreeId> {
        let that_node_id = self.heap(that)?.id;
        let this_assigned = self.heap(this)?.assigned;
        let that_assigned = self.heap(that)?.assigned;

        let paired = match this_assigned {
            Some(counterpart) => self.heap(counterpart)?.id == that_node_id,
            None => false,
        };
        if paired {
            // The subtree survives as-is; only literals may have moved.
            self.update_literals_deep(buffer, this, that)?;
            self.pool.retain(this);
            self.heap_mut(this)?.assigned = None;
            return Ok(this);
        }

        if this_assigned.is_none()
            && that_assigned.is_none()
            && let Some(rebuilt) = self.compute_edit_script_recurse(buffer, this, that)?
        {
            return Ok(rebuilt);
        }

        // Replace: detach and unload the original side, then load (or
        // reuse) the changed side and attach it in the same slot.
        let this_symbol = self.pool.get(this).symbol;
        let cover = if self.relevant(this) {
            let id = self.node_id(this)?;
            buffer.add(Edit::Detach(Detach { id, tag: this_symbol, parent }));
            DetachCover::Covered
        } else {
            DetachCover::CascadeNext
        };
        self.unload_unassigned(buffer, this, parent, cover)?;
        let loaded = self.load_unassigned(buffer, that)?;
        self.emit_attach(buffer, loaded, parent)?;
        Ok(loaded)
    }

    /// Rebuilds a signature-equal pair in place: children are diffed
    /// pairwise and a fresh parent entry is built over the reconstructed
    /// children, inheriting the original node's heap (and so its identity).
    fn compute_edit_script_recurse(
        &mut self,
        buffer: &mut EditScriptBuffer,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<Option<SubtreeId>> {
        if !self.signature_equal(this, that) {
            return Ok(None);
        }
        let this_heap_id = self.heap_id(this)?;
        let parent_node_id = self.heap(this)?.id;
        let (that_position, symbol, production_id, that_padding, that_size) = {
            let heap = self.heap(that)?;
            let entry = self.pool.get(that);
            (heap.position, entry.symbol, entry.production_id, entry.padding, entry.size)
        };

        // The new parent shares the original heap between the old and the
        // reconstructed entry.
        self.heaps.inc_ref(this_heap_id);

        let literal = self.literal_text(self.other_code, that, that_position)?;
        let mut hasher = NodeHasher::new(symbol, production_id, literal);

        let this_children = self.pool.children(this).to_vec();
        let that_children = self.pool.children(that).to_vec();
        let mut rebuilt = Vec::with_capacity(this_children.len());
        for (index, (&this_child, &that_child)) in
            this_children.iter().zip(that_children.iter()).enumerate()
        {
            let context = ParentRef {
                id: parent_node_id,
                tag: symbol,
                link: self.child_link(production_id, index as u32),
            };
            let child = self.compute_edit_script(buffer, this_child, that_child, Some(context))?;
            hasher.absorb_child(self.heap(child)?);
            rebuilt.push(child);
        }

        let new_node = self.pool.new_node(symbol, production_id, rebuilt);
        let (structural, literal_hash) = hasher.finish();
        let heap = self.heaps.get_mut(this_heap_id).ok_or(DiffError::Uninitialized(this))?;
        heap.structural_hash = structural;
        heap.literal_hash = literal_hash;
        heap.position = that_position;
        heap.padding = that_padding;
        heap.size = that_size;
        heap.share = None;
        self.pool.set_diff_heap(new_node, Some(this_heap_id));
        Ok(Some(new_node))
    }

    /// Unloads every unassigned node of an outgoing original subtree.
    ///
    /// Assigned descendants are merely unpaired on this side (their subtree
    /// lives on elsewhere in the reconstructed tree); when their nearest
    /// relevant ancestor never announced the removal, the deferred `DETACH`
    /// is emitted here, one level below the irrelevant root.
    fn unload_unassigned(
        &mut self,
        buffer: &mut EditScriptBuffer,
        node: SubtreeId,
        parent: Option<ParentRef>,
        cover: DetachCover,
    ) -> DiffResult<()> {
        let assigned = self.heap(node)?.assigned;
        let node_relevant = self.relevant(node);
        let (symbol, production_id) = {
            let entry = self.pool.get(node);
            (entry.symbol, entry.production_id)
        };
        let id = self.node_id(node)?;

        if cover == DetachCover::CascadeNow && node_relevant {
            buffer.add(Edit::Detach(Detach { id, tag: symbol, parent }));
        }
        if assigned.is_some() {
            self.heap_mut(node)?.assigned = None;
            return Ok(());
        }
        if node_relevant {
            let kids = self.child_prototypes(node, production_id)?;
            buffer.add(Edit::Unload(Unload { id, tag: symbol, kids }));
        }

        let child_cover = if node_relevant {
            DetachCover::Covered
        } else if cover == DetachCover::CascadeNext {
            DetachCover::CascadeNow
        } else {
            DetachCover::Covered
        };
        for (index, child) in self.pool.children(node).to_vec().into_iter().enumerate() {
            let context = if node_relevant {
                Some(ParentRef { id, tag: symbol, link: self.child_link(production_id, index as u32) })
            } else {
                // Irrelevant nodes are transparent: children keep the
                // nearest relevant ancestor as their parent context.
                parent
            };
            self.unload_unassigned(buffer, child, context, child_cover)?;
        }
        Ok(())
    }

    /// Loads every unassigned node of an incoming changed subtree with a
    /// fresh identity, reusing assigned subtrees (refreshing their literals)
    /// where the assignment phases paired them.
    fn load_unassigned(&mut self, buffer: &mut EditScriptBuffer, that: SubtreeId) -> DiffResult<SubtreeId> {
        if let Some(reused) = self.heap(that)?.assigned {
            self.update_literals_deep(buffer, reused, that)?;
            self.pool.retain(reused);
            return Ok(reused);
        }

        let (position, treesize, treeheight) = {
            let heap = self.heap(that)?;
            (heap.position, heap.treesize, heap.treeheight)
        };
        let that_relevant = self.relevant(that);
        let entry = self.pool.get(that);
        let symbol = entry.symbol;
        let production_id = entry.production_id;
        let spec = LeafSpec {
            symbol,
            padding: entry.padding,
            size: entry.size,
            parse_state: entry.parse_state,
            lookahead_bytes: entry.lookahead_bytes,
            has_external_tokens: entry.has_external_tokens,
            depends_on_column: entry.depends_on_column,
            is_keyword: entry.is_keyword,
            is_extra: entry.is_extra,
            is_error: entry.is_error,
            external_scanner_state: entry.external_scanner_state.clone(),
            lookahead_char: entry.lookahead_char,
        };
        let is_leaf = entry.is_leaf();

        let mut heap = DiffHeap::new(position, spec.padding, spec.size);
        heap.treesize = treesize;
        heap.treeheight = treeheight;
        let new_id = heap.id;

        let literal = self.literal_text(self.other_code, that, position)?;
        let mut hasher = NodeHasher::new(symbol, production_id, literal);

        let new_subtree = if is_leaf {
            if that_relevant {
                buffer.add(Edit::Load(Load {
                    id: new_id,
                    tag: symbol,
                    payload: LoadPayload::Leaf(LeafData {
                        padding: spec.padding,
                        size: spec.size,
                        lookahead_bytes: spec.lookahead_bytes,
                        parse_state: spec.parse_state,
                        has_external_tokens: spec.has_external_tokens,
                        depends_on_column: spec.depends_on_column,
                        is_keyword: spec.is_keyword,
                        external_scanner_state: spec
                            .external_scanner_state
                            .as_ref()
                            .map(|state| state.to_vec()),
                        lookahead_char: spec.lookahead_char,
                    }),
                }));
            }
            self.pool.new_leaf(spec)
        } else {
            let mut children = Vec::new();
            let mut prototypes = Vec::new();
            for (index, that_child) in self.pool.children(that).to_vec().into_iter().enumerate() {
                let child = self.load_unassigned(buffer, that_child)?;
                let child_relevant = self.relevant(that_child);
                let child_heap = self.heap(child)?;
                hasher.absorb_child(child_heap);
                if child_relevant {
                    prototypes.push(ChildPrototype {
                        child_id: child_heap.id,
                        link: self.child_link(production_id, index as u32),
                    });
                }
                children.push(child);
            }
            if that_relevant {
                buffer.add(Edit::Load(Load {
                    id: new_id,
                    tag: symbol,
                    payload: LoadPayload::Interior { kids: prototypes, production_id },
                }));
            }
            self.pool.new_node(symbol, production_id, children)
        };

        let (structural, literal_hash) = hasher.finish();
        heap.structural_hash = structural;
        heap.literal_hash = literal_hash;
        let heap_id = self.heaps.alloc(heap);
        self.pool.set_diff_heap(new_subtree, Some(heap_id));
        Ok(new_subtree)
    }

    /// Attaches the reconstructed subtree in its slot, cascading one level
    /// down when the subtree root itself is irrelevant.
    fn emit_attach(
        &mut self,
        buffer: &mut EditScriptBuffer,
        loaded: SubtreeId,
        parent: Option<ParentRef>,
    ) -> DiffResult<()> {
        if self.relevant(loaded) {
            let id = self.node_id(loaded)?;
            let tag = self.pool.get(loaded).symbol;
            buffer.add(Edit::Attach(Attach { id, tag, parent }));
            return Ok(());
        }
        for child in self.pool.children(loaded).to_vec() {
            if self.relevant(child) {
                let id = self.node_id(child)?;
                let tag = self.pool.get(child).symbol;
                buffer.add(Edit::Attach(Attach { id, tag, parent }));
            }
        }
        Ok(())
    }

    /// Walks a reused subtree pair positionally, refreshing literals and
    /// measurements.
    pub(crate) fn update_literals_deep(
        &mut self,
        buffer: &mut EditScriptBuffer,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<()> {
        let mut pending = vec![(this, that)];
        while let Some((this_node, that_node)) = pending.pop() {
            self.update_literal(buffer, this_node, that_node)?;
            let this_children = self.pool.children(this_node).to_vec();
            let that_children = self.pool.children(that_node).to_vec();
            for pair in this_children.into_iter().zip(that_children).rev() {
                pending.push(pair);
            }
        }
        Ok(())
    }

    /// Emits an `UPDATE` iff the node is a declared literal whose bytes
    /// changed. Padding and size are refreshed in place regardless, and the
    /// node's change flag is cleared.
    fn update_literal(
        &mut self,
        buffer: &mut EditScriptBuffer,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<()> {
        let this_position = self.heap(this)?.position;
        let that_position = self.heap(that)?.position;
        let (this_symbol, old_padding, old_size) = {
            let entry = self.pool.get(this);
            (entry.symbol, entry.padding, entry.size)
        };
        let (that_symbol, new_padding, new_size) = {
            let entry = self.pool.get(that);
            (entry.symbol, entry.padding, entry.size)
        };

        let is_literal = self.literal_map.is_literal(this_symbol)
            && self.literal_map.is_literal(that_symbol);
        if is_literal {
            let changed = old_size.bytes != new_size.bytes
                || self.text_at(self.self_code, this_position, old_size)?
                    != self.text_at(self.other_code, that_position, new_size)?;
            if changed {
                let id = self.node_id(this)?;
                buffer.add(Edit::Update(Update {
                    id,
                    tag: this_symbol,
                    old_start: this_position,
                    old_size,
                    new_start: that_position,
                    new_size,
                }));
            }
        }

        if old_size != new_size || old_padding != new_padding {
            let entry = self.pool.get_mut(this);
            entry.padding = new_padding;
            entry.size = new_size;
        }
        self.pool.get_mut(this).has_changes = false;

        let heap_id = self.heap_id(this)?;
        if let Some(heap) = self.heaps.get_mut(heap_id) {
            heap.position = that_position;
            heap.padding = new_padding;
            heap.size = new_size;
        }
        self.heaps.inc_ref(heap_id);
        Ok(())
    }

    /// The relevant children of `node` as consumer-facing prototypes.
    fn child_prototypes(
        &self,
        node: SubtreeId,
        production_id: ProductionId,
    ) -> DiffResult<Vec<ChildPrototype>> {
        let mut kids = Vec::new();
        for (index, &child) in self.pool.children(node).iter().enumerate() {
            if self.relevant(child) {
                kids.push(ChildPrototype {
                    child_id: self.node_id(child)?,
                    link: self.child_link(production_id, index as u32),
                });
            }
        }
        Ok(kids)
    }
}
