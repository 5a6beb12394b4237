//! Error types for tree construction and language-table lookups.

use crate::Symbol;
use thiserror::Error;

/// Errors raised by the tree storage and language tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("grammar declares too many symbols (limit {limit})")]
    TooManySymbols { limit: usize },

    #[error("grammar declares too many fields (limit {limit})")]
    TooManyFields { limit: usize },

    #[error("symbol {symbol} out of range for language with {count} symbols")]
    SymbolOutOfRange { symbol: Symbol, count: usize },

    #[error("field {field} is not declared by the language")]
    UnknownField { field: u16 },
}
