//! Text coordinates.
//!
//! Lines and columns are 0-indexed and columns count chars (Unicode scalar
//! values), which is how `ropey` indexes. The status line is the only place
//! that shows them 1-indexed, through `Display`.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A (line, column) pair in the document.
///
/// Field order makes the derived `Ord` lexicographic: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

/// The status-line form: `Ln 3, Col 7`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ln {}, Col {}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open span `[start, end)` with `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range from two positions in either order, e.g. a selection
    /// anchor and the cursor after the user dragged backwards.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range({:?} .. {:?})", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_line_then_col() {
        let positions = [
            Position::ZERO,
            Position::new(0, 1),
            Position::new(0, 100),
            Position::new(1, 0),
            Position::new(10, 0),
        ];
        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should be < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::ZERO.to_string(), "Ln 1, Col 1");
        assert_eq!(Position::new(9, 14).to_string(), "Ln 10, Col 15");
    }

    #[test]
    fn debug_is_compact() {
        assert_eq!(format!("{:?}", Position::new(2, 5)), "Pos(2:5)");
        assert_eq!(
            format!("{:?}", Range::point(Position::new(1, 1))),
            "Range(Pos(1:1) .. Pos(1:1))"
        );
    }

    #[test]
    fn ordered_swaps_backwards_input() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let r = Range::ordered(a, b);
        assert_eq!(r.start, b);
        assert_eq!(r.end, a);
        assert_eq!(Range::ordered(b, a), r);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Range::ordered(Position::new(1, 0), Position::new(3, 0));
        assert!(r.contains(Position::new(1, 0)));
        assert!(r.contains(Position::new(2, 50)));
        assert!(!r.contains(Position::new(0, 100)));
        assert!(!r.contains(Position::new(3, 0)));
    }

    #[test]
    fn point_is_empty_and_contains_nothing() {
        let r = Range::point(Position::new(5, 5));
        assert!(r.is_empty());
        assert!(!r.contains(Position::new(5, 5)));
        assert!(!Range::ordered(Position::ZERO, Position::new(0, 1)).is_empty());
    }
}
