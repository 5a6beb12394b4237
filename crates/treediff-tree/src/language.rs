//! Grammar symbol and field tables.

use crate::error::TreeError;
use crate::{FieldId, ProductionId, Symbol, TreeResult};
use std::collections::HashMap;

/// Per-symbol grammar metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Human-readable symbol name, as printed in scripts and graphs.
    pub name: String,
    /// Whether the symbol is a named rule (as opposed to an anonymous token).
    pub named: bool,
    /// Whether nodes of this symbol appear in the visible tree.
    pub visible: bool,
}

/// A grammar's symbol table, field table and field map.
///
/// The differ only ever queries this table; it is constructed once per
/// grammar with [`LanguageBuilder`] and shared behind an `Arc` by every tree
/// of that grammar.
#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    symbols: Vec<SymbolInfo>,
    field_names: Vec<String>,
    field_map: HashMap<(ProductionId, u32), FieldId>,
}

impl Language {
    /// The grammar's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared symbols.
    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Name of a symbol, if declared.
    #[inline]
    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.get(symbol as usize).map(|info| info.name.as_str())
    }

    /// Whether a symbol is a named rule. Undeclared symbols are unnamed.
    #[inline]
    pub fn is_named(&self, symbol: Symbol) -> bool {
        self.symbols.get(symbol as usize).is_some_and(|info| info.named)
    }

    /// Whether a symbol is visible in the tree. Undeclared symbols are not.
    #[inline]
    pub fn is_visible(&self, symbol: Symbol) -> bool {
        self.symbols.get(symbol as usize).is_some_and(|info| info.visible)
    }

    /// Name of a field id, if declared. Field ids start at 1.
    #[inline]
    pub fn field_name(&self, field: FieldId) -> Option<&str> {
        if field == 0 {
            return None;
        }
        self.field_names.get(field as usize - 1).map(String::as_str)
    }

    /// The field attached to the `child_index`-th child of a node produced by
    /// `production_id`, if the grammar declares one.
    #[inline]
    pub fn field_for_child(&self, production_id: ProductionId, child_index: u32) -> Option<FieldId> {
        self.field_map.get(&(production_id, child_index)).copied()
    }
}

/// Incremental construction of a [`Language`].
///
/// Symbols and fields are handed out in declaration order, so callers can
/// capture the returned ids as constants for their grammar.
#[derive(Debug, Default)]
pub struct LanguageBuilder {
    name: String,
    symbols: Vec<SymbolInfo>,
    field_names: Vec<String>,
    field_map: HashMap<(ProductionId, u32), FieldId>,
}

impl LanguageBuilder {
    /// Starts a builder for a grammar called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Declares a symbol and returns its id.
    pub fn symbol(&mut self, name: impl Into<String>, named: bool, visible: bool) -> TreeResult<Symbol> {
        if self.symbols.len() >= usize::from(Symbol::MAX) {
            return Err(TreeError::TooManySymbols { limit: usize::from(Symbol::MAX) });
        }
        let id = self.symbols.len() as Symbol;
        self.symbols.push(SymbolInfo { name: name.into(), named, visible });
        Ok(id)
    }

    /// Declares a named, visible symbol and returns its id.
    pub fn named_symbol(&mut self, name: impl Into<String>) -> TreeResult<Symbol> {
        self.symbol(name, true, true)
    }

    /// Declares an anonymous, visible token symbol and returns its id.
    pub fn token_symbol(&mut self, name: impl Into<String>) -> TreeResult<Symbol> {
        self.symbol(name, false, true)
    }

    /// Declares a field and returns its id (ids start at 1).
    pub fn field(&mut self, name: impl Into<String>) -> TreeResult<FieldId> {
        if self.field_names.len() >= usize::from(FieldId::MAX) - 1 {
            return Err(TreeError::TooManyFields { limit: usize::from(FieldId::MAX) - 1 });
        }
        self.field_names.push(name.into());
        Ok(self.field_names.len() as FieldId)
    }

    /// Attaches `field` to the `child_index`-th child of `production_id`.
    pub fn map_field(&mut self, production_id: ProductionId, child_index: u32, field: FieldId) -> TreeResult<()> {
        if field == 0 || usize::from(field) > self.field_names.len() {
            return Err(TreeError::UnknownField { field });
        }
        self.field_map.insert((production_id, child_index), field);
        Ok(())
    }

    /// Finishes the table.
    pub fn build(self) -> Language {
        Language {
            name: self.name,
            symbols: self.symbols,
            field_names: self.field_names,
            field_map: self.field_map,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample() -> Language {
        let mut builder = LanguageBuilder::new("sample");
        builder.named_symbol("expr").unwrap();
        builder.token_symbol("+").unwrap();
        builder.symbol("_hidden", true, false).unwrap();
        let left = builder.field("left").unwrap();
        builder.map_field(3, 0, left).unwrap();
        builder.build()
    }

    #[test]
    fn test_symbol_metadata() {
        let lang = sample();
        assert_eq!(lang.symbol_count(), 3);
        assert_eq!(lang.symbol_name(0), Some("expr"));
        assert!(lang.is_named(0));
        assert!(lang.is_visible(0));
        assert!(!lang.is_named(1));
        assert!(lang.is_visible(1));
        assert!(!lang.is_visible(2));
        assert_eq!(lang.symbol_name(9), None);
        assert!(!lang.is_named(9));
    }

    #[test]
    fn test_field_lookup() {
        let lang = sample();
        let field = lang.field_for_child(3, 0).unwrap();
        assert_eq!(lang.field_name(field), Some("left"));
        assert_eq!(lang.field_for_child(3, 1), None);
        assert_eq!(lang.field_name(0), None);
    }

    #[test]
    fn test_map_field_rejects_undeclared() {
        let mut builder = LanguageBuilder::new("bad");
        assert_eq!(builder.map_field(0, 0, 7), Err(TreeError::UnknownField { field: 7 }));
    }
}
