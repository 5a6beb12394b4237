//! Row/column coordinates within source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based row/column position in source text.
///
/// Columns count bytes within the row, not characters, so that point
/// arithmetic stays exact for multi-byte text.
///
/// # Invariants
///
/// - Adding a point that spans rows resets the column to the added point's
///   column; adding a same-row point accumulates columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Zero-based row index.
    pub row: u32,
    /// Zero-based byte column within the row.
    pub column: u32,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// The origin point (row 0, column 0).
    #[inline]
    pub const fn zero() -> Self {
        Self { row: 0, column: 0 }
    }

    /// Adds a relative extent to this point.
    ///
    /// If `rhs` spans at least one row, the result lands on `rhs`'s column of
    /// the advanced row; otherwise the columns accumulate on the same row.
    #[inline]
    pub const fn add(self, rhs: Point) -> Point {
        if rhs.row > 0 {
            Point { row: self.row + rhs.row, column: rhs.column }
        } else {
            Point { row: self.row, column: self.column + rhs.column }
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

impl From<(u32, u32)> for Point {
    #[inline]
    fn from((row, column): (u32, u32)) -> Self {
        Self { row, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_same_row() {
        let a = Point::new(2, 5);
        let b = Point::new(0, 3);
        assert_eq!(a.add(b), Point::new(2, 8));
    }

    #[test]
    fn test_add_spanning_rows() {
        let a = Point::new(2, 5);
        let b = Point::new(3, 1);
        assert_eq!(a.add(b), Point::new(5, 1));
    }

    #[test]
    fn test_ordering() {
        assert!(Point::new(1, 0) > Point::new(0, 99));
        assert!(Point::new(1, 2) < Point::new(1, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Point::new(4, 7)), "(4, 7)");
    }
}
