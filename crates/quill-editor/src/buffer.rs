//! Text buffer — the rope behind the text area.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and converts between [`Position`]s and
//! rope char indices. It holds text only: the file path and the dirty flag
//! belong to the document session, undo to [`History`](crate::history).
//!
//! Text is stored verbatim, so what was read is what gets written. The line
//! ending found on load is remembered and used when Enter inserts a new one.
//! Only LF, CR and CRLF break lines; form feeds and Unicode separators are
//! ordinary chars (ropey is built without `unicode_lines`).
//!
//! Editing never panics on a stale position: out-of-range positions are
//! clamped to the nearest valid one first.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line ending style, detected from the first line break in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line break in `text`, `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\n' => Self::Lf,
            Some(i) if bytes.get(i + 1) == Some(&b'\n') => Self::CrLf,
            Some(_) => Self::Cr,
            None => Self::Lf,
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
}

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::default(),
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            line_ending: LineEnding::detect(text),
        }
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Number of lines. Empty text has one (empty) line, and text ending in
    /// a line break has a trailing empty line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its line break, or `None` past the end.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.rope.len_lines()).then(|| self.rope.line(line))
    }

    /// Chars in a line excluding its line break (`\n`, `\r\n` or `\r`).
    /// This is also the last valid cursor column on that line. Zero for a
    /// line that doesn't exist.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> usize {
        let Some(slice) = self.line(line) else {
            return 0;
        };
        let total = slice.len_chars();
        let before_last = total.checked_sub(2).map(|i| slice.char(i));
        let last = total.checked_sub(1).map(|i| slice.char(i));
        match (before_last, last) {
            (Some('\r'), Some('\n')) => total - 2,
            (_, Some('\n' | '\r')) => total - 1,
            _ => total,
        }
    }

    /// The whole text. Allocates.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// The text covered by `range`, after clamping both ends.
    #[must_use]
    pub fn slice_text(&self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        self.rope.slice(start.min(end)..end.max(start)).to_string()
    }

    // -- Coordinates --------------------------------------------------------

    /// Char index of `pos`, or `None` if the line doesn't exist or the column
    /// is past the line's content.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() || pos.col > self.line_content_len(pos.line) {
            return None;
        }
        Some(self.rope.line_to_char(pos.line) + pos.col)
    }

    /// Position of a char index. Indexes past the end map to the end.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Position {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        let col = idx - self.rope.line_to_char(line);
        // An index inside a `\r\n` pair belongs to the end of the line.
        Position::new(line, col.min(self.line_content_len(line)))
    }

    /// The nearest valid cursor position: line clamped to the last line,
    /// column clamped to the line's content length.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        Position::new(line, pos.col.min(self.line_content_len(line)))
    }

    /// The position just past the last char.
    #[must_use]
    pub fn end_position(&self) -> Position {
        self.char_idx_to_pos(self.rope.len_chars())
    }

    fn char_idx(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos` and return the position just after it.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let idx = self.char_idx(pos);
        self.rope.insert(idx, text);
        self.char_idx_to_pos(idx + text.chars().count())
    }

    /// Remove the text in `range` and return it.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        if start >= end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        removed
    }

    /// Replace everything, re-detecting the line ending.
    pub fn set_text(&mut self, text: &str) {
        *self = Self::from_text(text);
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
