//! Byte-based length and point types for source location tracking.
//!
//! This crate provides the foundational measurement types used throughout the
//! tree differ. Spans are measured as byte offset plus row and column,
//! because edit-script consumers need all of them to relocate a node
//! without re-scanning the source text.

pub mod length;
pub mod point;

pub use length::Length;
pub use point::Point;
