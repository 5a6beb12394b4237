//! The fusing edit-script buffer.

use crate::edit::{DetachUnload, Edit, LoadAttach};
use crate::script::EditScript;

/// Collects edits during diffing, fusing adjacent pairs as they arrive.
///
/// Negative edits (detach/unload) and positive edits (load/attach/update)
/// accumulate separately; [`finalize`](EditScriptBuffer::finalize) emits
/// negative before positive. Fusion only ever inspects the trailing edit of
/// the respective buffer, so adding is O(1) and fusing twice changes
/// nothing.
#[derive(Debug, Default)]
pub struct EditScriptBuffer {
    negative: Vec<Edit>,
    positive: Vec<Edit>,
}

impl EditScriptBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edit, fusing it with the trailing edit where the vocabulary
    /// allows:
    ///
    /// - `ATTACH` after a `LOAD` of the same id becomes `LOAD_ATTACH`
    /// - `UNLOAD` after a `DETACH` of the same id becomes `DETACH_UNLOAD`
    pub fn add(&mut self, edit: Edit) {
        match edit {
            Edit::Update(_) | Edit::Load(_) | Edit::LoadAttach(_) => self.positive.push(edit),
            Edit::Detach(_) | Edit::DetachUnload(_) => self.negative.push(edit),
            Edit::Attach(attach) => match self.positive.pop() {
                Some(Edit::Load(load)) if load.id == attach.id => {
                    self.positive.push(Edit::LoadAttach(LoadAttach {
                        id: load.id,
                        tag: load.tag,
                        payload: load.payload,
                        parent: attach.parent,
                    }));
                }
                trailing => {
                    if let Some(trailing) = trailing {
                        self.positive.push(trailing);
                    }
                    self.positive.push(Edit::Attach(attach));
                }
            },
            Edit::Unload(unload) => match self.negative.pop() {
                Some(Edit::Detach(detach)) if detach.id == unload.id => {
                    self.negative.push(Edit::DetachUnload(DetachUnload {
                        id: unload.id,
                        tag: unload.tag,
                        kids: unload.kids,
                        parent: detach.parent,
                    }));
                }
                trailing => {
                    if let Some(trailing) = trailing {
                        self.negative.push(trailing);
                    }
                    self.negative.push(Edit::Unload(unload));
                }
            },
        }
    }

    /// Number of buffered edits so far.
    pub fn len(&self) -> usize {
        self.negative.len() + self.positive.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }

    /// Concatenates negative then positive edits into the final script.
    pub fn finalize(self) -> EditScript {
        let mut edits = self.negative;
        edits.extend(self.positive);
        EditScript::new(edits)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::edit::{Attach, ChildLink, Detach, Load, LoadPayload, ParentRef, Unload};
    use treediff_tree::NodeId;

    fn parent(link: u32) -> Option<ParentRef> {
        Some(ParentRef { id: NodeId::mint(), tag: 1, link: ChildLink::Index(link) })
    }

    fn interior_load(id: NodeId) -> Edit {
        Edit::Load(Load {
            id,
            tag: 2,
            payload: LoadPayload::Interior { kids: vec![], production_id: 0 },
        })
    }

    #[test]
    fn test_attach_fuses_with_trailing_load() {
        let mut buffer = EditScriptBuffer::new();
        let id = NodeId::mint();
        buffer.add(interior_load(id));
        buffer.add(Edit::Attach(Attach { id, tag: 2, parent: parent(0) }));
        let script = buffer.finalize();
        assert_eq!(script.len(), 1);
        assert!(matches!(script.edits()[0], Edit::LoadAttach(ref la) if la.id == id));
    }

    #[test]
    fn test_attach_does_not_fuse_across_ids() {
        let mut buffer = EditScriptBuffer::new();
        let load_id = NodeId::mint();
        let attach_id = NodeId::mint();
        buffer.add(interior_load(load_id));
        buffer.add(Edit::Attach(Attach { id: attach_id, tag: 2, parent: parent(0) }));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_unload_fuses_with_trailing_detach() {
        let mut buffer = EditScriptBuffer::new();
        let id = NodeId::mint();
        buffer.add(Edit::Detach(Detach { id, tag: 3, parent: parent(1) }));
        buffer.add(Edit::Unload(Unload { id, tag: 3, kids: vec![] }));
        let script = buffer.finalize();
        assert_eq!(script.len(), 1);
        assert!(matches!(script.edits()[0], Edit::DetachUnload(ref du) if du.id == id));
    }

    #[test]
    fn test_finalize_orders_negative_before_positive() {
        let mut buffer = EditScriptBuffer::new();
        let load_id = NodeId::mint();
        let detach_id = NodeId::mint();
        buffer.add(interior_load(load_id));
        buffer.add(Edit::Detach(Detach { id: detach_id, tag: 3, parent: parent(0) }));
        let script = buffer.finalize();
        assert!(script.edits()[0].is_negative());
        assert!(!script.edits()[1].is_negative());
    }

    #[test]
    fn test_interleaved_unload_does_not_fuse() {
        let mut buffer = EditScriptBuffer::new();
        let first = NodeId::mint();
        let second = NodeId::mint();
        buffer.add(Edit::Detach(Detach { id: first, tag: 3, parent: parent(0) }));
        buffer.add(Edit::Detach(Detach { id: second, tag: 3, parent: parent(1) }));
        // The detach of `second` now trails, so `first`'s unload stays bare.
        buffer.add(Edit::Unload(Unload { id: first, tag: 3, kids: vec![] }));
        assert_eq!(buffer.len(), 3);
    }
}
