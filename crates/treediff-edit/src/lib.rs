//! Edit vocabulary and edit-script plumbing for the tree differ.
//!
//! An edit script is the differ's product: an ordered sequence of node-level
//! operations that transforms the original tree's structure into the changed
//! tree's structure while preserving reused node identities. Consumers apply
//! the same script to any model mirroring the tree (databases, compiled
//! views, incremental analyses).
//!
//! Two layers of vocabulary exist:
//!
//! - [`Edit`]: the sugared, seven-variant form the differ emits, with
//!   [`LoadAttach`]/[`DetachUnload`] fusions for the common load-then-attach
//!   and detach-then-unload pairs;
//! - [`CoreEdit`]: the five-variant form consumers replay; fused edits
//!   split back into core edits via [`Edit::push_core_into`].
//!
//! [`EditScriptBuffer`] performs the fusion while the differ emits, and its
//! [`finalize`](EditScriptBuffer::finalize) step fixes the documented order:
//! all negative edits (detach/unload) strictly before all positive edits
//! (load/attach/update).

pub mod buffer;
pub mod edit;
pub mod script;

pub use buffer::EditScriptBuffer;
pub use edit::{
    Attach, ChildLink, ChildPrototype, CoreEdit, Detach, DetachUnload, Edit, LeafData, Load,
    LoadAttach, LoadPayload, ParentRef, Unload, Update,
};
pub use script::EditScript;
