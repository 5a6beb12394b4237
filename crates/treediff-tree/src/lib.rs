//! Host parse-tree storage for the tree differ.
//!
//! This crate owns everything the diff engine consumes from "the tree side":
//!
//! - [`Language`]: symbol and field tables built with [`LanguageBuilder`]
//! - [`LiteralMap`]: the per-grammar bit-sets declaring literal symbols and
//!   relevant unnamed tokens
//! - [`SubtreePool`]: a reference-counted arena of subtree entries addressed
//!   by [`SubtreeId`], shared by original, changed and reconstructed trees so
//!   that reuse is a retain, not a copy
//! - [`TreeCursor`]: an explicit-stack walk over *all* children, including
//!   invisible and extra nodes, with absolute positions
//! - [`TreeBuilder`]: text-measuring construction of trees for parsers,
//!   fixtures and tests
//!
//! The differ's per-node metadata lives in its own store; each subtree entry
//! only carries an opaque [`DiffHeapId`] annotation slot for it.

pub mod builder;
pub mod cursor;
pub mod error;
pub mod id;
pub mod language;
pub mod literal_map;
pub mod subtree;
pub mod tree;

pub use builder::{NodeSpec, TreeBuilder};
pub use cursor::{ChildWalk, TreeCursor};
pub use error::TreeError;
pub use id::{DiffHeapId, NodeId, SubtreeId};
pub use language::{Language, LanguageBuilder, SymbolInfo};
pub use literal_map::LiteralMap;
pub use subtree::{LeafSpec, SubtreeData, SubtreePool};
pub use tree::Tree;

/// Grammar symbol identifier.
pub type Symbol = u16;
/// Field identifier within a grammar; field ids start at 1.
pub type FieldId = u16;
/// Production (alternative) identifier within a grammar.
pub type ProductionId = u16;
/// Parser state identifier carried on leaves.
pub type StateId = u16;

/// Result alias for tree-side operations.
pub type TreeResult<T> = Result<T, TreeError>;
