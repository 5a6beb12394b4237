//! Literal-symbol declarations for a grammar.

use crate::language::Language;
use crate::{Symbol, TreeResult};
use crate::error::TreeError;

/// Bit-sets over a grammar's symbol ids declaring which symbols carry
/// identity-relevant text and which unnamed tokens still matter to edits.
///
/// Grammars do not record whether a token's text is part of a node's
/// identity (an integer literal is, a `+` keyword is not), so callers
/// declare it per symbol. A second set marks unnamed tokens that should
/// survive the relevance filter despite being anonymous.
#[derive(Debug, Clone)]
pub struct LiteralMap {
    symbol_count: usize,
    literals: Vec<u64>,
    unnamed_tokens: Vec<u64>,
}

const WORD_BITS: usize = 64;

impl LiteralMap {
    /// Creates an empty map sized for `language`'s symbol table.
    pub fn new(language: &Language) -> Self {
        let words = language.symbol_count().div_ceil(WORD_BITS);
        Self {
            symbol_count: language.symbol_count(),
            literals: vec![0; words],
            unnamed_tokens: vec![0; words],
        }
    }

    /// Declares `symbol` a literal: its text contributes to node identity.
    pub fn add_literal(&mut self, symbol: Symbol) -> TreeResult<()> {
        let index = self.check(symbol)?;
        self.literals[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        Ok(())
    }

    /// Declares `symbol` a relevant unnamed token.
    pub fn add_unnamed_token(&mut self, symbol: Symbol) -> TreeResult<()> {
        let index = self.check(symbol)?;
        self.unnamed_tokens[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        Ok(())
    }

    fn check(&self, symbol: Symbol) -> TreeResult<usize> {
        let index = symbol as usize;
        if index >= self.symbol_count {
            return Err(TreeError::SymbolOutOfRange { symbol, count: self.symbol_count });
        }
        Ok(index)
    }

    /// Whether `symbol` is a declared literal.
    #[inline]
    pub fn is_literal(&self, symbol: Symbol) -> bool {
        let index = symbol as usize;
        index < self.symbol_count && self.literals[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Whether `symbol` is a declared relevant unnamed token.
    #[inline]
    pub fn is_unnamed_token(&self, symbol: Symbol) -> bool {
        let index = symbol as usize;
        index < self.symbol_count && self.unnamed_tokens[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::language::LanguageBuilder;

    fn language_with(symbols: usize) -> Language {
        let mut builder = LanguageBuilder::new("lits");
        for i in 0..symbols {
            builder.named_symbol(format!("sym{i}")).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_literal_bits() {
        let lang = language_with(70);
        let mut map = LiteralMap::new(&lang);
        map.add_literal(0).unwrap();
        map.add_literal(69).unwrap();
        assert!(map.is_literal(0));
        assert!(map.is_literal(69));
        assert!(!map.is_literal(1));
        assert!(!map.is_unnamed_token(0));
    }

    #[test]
    fn test_unnamed_token_bits() {
        let lang = language_with(3);
        let mut map = LiteralMap::new(&lang);
        map.add_unnamed_token(2).unwrap();
        assert!(map.is_unnamed_token(2));
        assert!(!map.is_literal(2));
    }

    #[test]
    fn test_out_of_range() {
        let lang = language_with(2);
        let mut map = LiteralMap::new(&lang);
        assert!(map.add_literal(5).is_err());
        assert!(!map.is_literal(5));
    }
}
