//! Test support for the tree differ.
//!
//! Provides the toy grammars the integration suites diff against, a thin
//! fixture layer over [`TreeBuilder`], and [`MirrorModel`], a minimal
//! consumer that replays edit scripts against a mirrored structure so
//! round-trip properties can be asserted end-to-end.

pub mod grammars;
pub mod mirror;

pub use grammars::{arith, tokens, Arith, Tokens};
pub use mirror::{render_tree, MirrorModel};

use std::sync::Arc;
use treediff_tree::{Language, NodeSpec, SubtreePool, Tree, TreeBuilder};

/// Builds a fixture tree, returning it together with its source text.
pub fn build(pool: &mut SubtreePool, language: &Arc<Language>, spec: &NodeSpec) -> (Tree, String) {
    TreeBuilder::new(pool, Arc::clone(language)).build(spec)
}
