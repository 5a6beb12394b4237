//! Text-measuring construction of trees.
//!
//! Parsers build trees token by token; fixtures and tests want to state a
//! whole tree at once, together with the source text it spans. `NodeSpec`
//! describes that shape declaratively and [`TreeBuilder`] lowers it into
//! pool entries while concatenating the source text.

use crate::id::SubtreeId;
use crate::language::Language;
use crate::subtree::{LeafSpec, SubtreePool};
use crate::tree::Tree;
use crate::{ProductionId, Symbol};
use std::sync::Arc;
use treediff_position::Length;

/// Declarative description of a node for [`TreeBuilder`].
#[derive(Debug, Clone)]
pub enum NodeSpec {
    /// A token: leading padding text plus the token's own text.
    Leaf { symbol: Symbol, padding: String, text: String, extra: bool },
    /// An interior node over child specs.
    Node { symbol: Symbol, production_id: ProductionId, children: Vec<NodeSpec> },
}

impl NodeSpec {
    /// A leaf with no leading padding.
    pub fn leaf(symbol: Symbol, text: impl Into<String>) -> Self {
        NodeSpec::Leaf { symbol, padding: String::new(), text: text.into(), extra: false }
    }

    /// A leaf preceded by padding text (whitespace, typically).
    pub fn padded_leaf(symbol: Symbol, padding: impl Into<String>, text: impl Into<String>) -> Self {
        NodeSpec::Leaf { symbol, padding: padding.into(), text: text.into(), extra: false }
    }

    /// An extra (comment-like) leaf preceded by padding text.
    pub fn extra_leaf(symbol: Symbol, padding: impl Into<String>, text: impl Into<String>) -> Self {
        NodeSpec::Leaf { symbol, padding: padding.into(), text: text.into(), extra: true }
    }

    /// An interior node using production 0.
    pub fn node(symbol: Symbol, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Node { symbol, production_id: 0, children }
    }

    /// An interior node with an explicit production id.
    pub fn production(symbol: Symbol, production_id: ProductionId, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Node { symbol, production_id, children }
    }
}

/// Lowers [`NodeSpec`] trees into pool entries plus their source text.
#[derive(Debug)]
pub struct TreeBuilder<'pool> {
    pool: &'pool mut SubtreePool,
    language: Arc<Language>,
}

impl<'pool> TreeBuilder<'pool> {
    /// Creates a builder over `pool` for `language`.
    pub fn new(pool: &'pool mut SubtreePool, language: Arc<Language>) -> Self {
        Self { pool, language }
    }

    /// Builds `spec` into the pool, returning the tree and the source text
    /// it measures.
    pub fn build(&mut self, spec: &NodeSpec) -> (Tree, String) {
        let mut code = String::new();
        let root = self.lower(spec, &mut code);
        (Tree::new(root, Arc::clone(&self.language)), code)
    }

    fn lower(&mut self, spec: &NodeSpec, code: &mut String) -> SubtreeId {
        match spec {
            NodeSpec::Leaf { symbol, padding, text, extra } => {
                code.push_str(padding);
                code.push_str(text);
                self.pool.new_leaf(LeafSpec {
                    symbol: *symbol,
                    padding: Length::of_text(padding),
                    size: Length::of_text(text),
                    is_extra: *extra,
                    ..Default::default()
                })
            }
            NodeSpec::Node { symbol, production_id, children } => {
                let lowered: Vec<SubtreeId> =
                    children.iter().map(|child| self.lower(child, code)).collect();
                self.pool.new_node(*symbol, *production_id, lowered)
            }
        }
    }
}
