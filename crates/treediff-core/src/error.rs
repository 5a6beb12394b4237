//! Error types for the diff engine.

use thiserror::Error;
use treediff_tree::SubtreeId;

/// Result alias for diff operations.
pub type DiffResult<T> = Result<T, DiffError>;

/// Errors that can occur while diffing two trees.
#[derive(Error, Debug)]
pub enum DiffError {
    /// A tree handed to the pipeline was never initialized (or its metadata
    /// was deleted). Initialization must precede diffing.
    #[error("subtree {0} carries no diff metadata; run initialize first")]
    Uninitialized(SubtreeId),

    /// The two trees were parsed with different grammars.
    #[error("cannot diff trees of different languages ({left} vs {right})")]
    LanguageMismatch { left: String, right: String },

    /// A node's recorded span does not fit the source text it was
    /// initialized against, which is a contract violation by the tree producer.
    #[error("node span {start}..{end} out of bounds for source of {len} bytes")]
    CodeRange { start: usize, end: usize, len: usize },

    /// Writing the DOT visualisation failed.
    #[error("graph output failed: {0}")]
    Io(#[from] std::io::Error),
}
