//! Cursor — position, sticky column and selection anchor.
//!
//! Quill is not modal: the cursor may always sit after the last char of a
//! line, so every valid column is `0..=line_content_len`.
//!
//! Vertical movement remembers the column it started from (the *sticky*
//! column) so moving through a short line and back onto a long one returns
//! to where the cursor was. Horizontal movement resets it.
//!
//! A selection is the span between the optional `anchor` and the cursor.
//! Shift+movement sets the anchor on the first press; plain movement drops
//! it. See [`Cursor::prepare_move`].

use crate::buffer::Buffer;
use crate::position::{Position, Range};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
    anchor: Option<Position>,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// The selected span, or `None` when there is no anchor or the anchor
    /// sits on the cursor.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.anchor
            .map(|anchor| Range::ordered(anchor, self.pos))
            .filter(|range| !range.is_empty())
    }

    // -- Selection ----------------------------------------------------------

    /// Call before a movement. `extend` keeps or starts a selection anchored
    /// at the current position; otherwise any selection is dropped.
    pub const fn prepare_move(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.pos);
            }
        } else {
            self.anchor = None;
        }
    }

    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Select the whole buffer, leaving the cursor at the end.
    pub fn select_all(&mut self, buf: &Buffer) {
        self.anchor = Some(Position::ZERO);
        self.set_position(buf.end_position(), buf);
    }

    // -- Positioning --------------------------------------------------------

    /// Jump to `pos` (clamped). Resets the sticky column, keeps the anchor.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer) {
        self.pos = buf.clamp_position(pos);
        self.sticky_col = self.pos.col;
    }

    /// Re-clamp after the text changed underneath the cursor.
    pub fn clamp(&mut self, buf: &Buffer) {
        self.pos = buf.clamp_position(self.pos);
        if let Some(anchor) = &mut self.anchor {
            *anchor = buf.clamp_position(*anchor);
        }
    }

    // -- Horizontal ---------------------------------------------------------

    /// One char left, wrapping to the end of the previous line.
    pub fn move_left(&mut self, buf: &Buffer) {
        let pos = if self.pos.col > 0 {
            Position::new(self.pos.line, self.pos.col - 1)
        } else if self.pos.line > 0 {
            let line = self.pos.line - 1;
            Position::new(line, buf.line_content_len(line))
        } else {
            self.pos
        };
        self.set_position(pos, buf);
    }

    /// One char right, wrapping to the start of the next line.
    pub fn move_right(&mut self, buf: &Buffer) {
        let pos = if self.pos.col < buf.line_content_len(self.pos.line) {
            Position::new(self.pos.line, self.pos.col + 1)
        } else if self.pos.line + 1 < buf.line_count() {
            Position::new(self.pos.line + 1, 0)
        } else {
            self.pos
        };
        self.set_position(pos, buf);
    }

    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    pub fn move_to_line_end(&mut self, buf: &Buffer) {
        self.pos.col = buf.line_content_len(self.pos.line);
        self.sticky_col = self.pos.col;
    }

    // -- Vertical -----------------------------------------------------------

    /// Up `count` lines. On the first line, go to its start instead.
    pub fn move_up(&mut self, count: usize, buf: &Buffer) {
        if self.pos.line == 0 {
            self.move_to_line_start();
            return;
        }
        self.pos.line = self.pos.line.saturating_sub(count);
        self.pos.col = self.sticky_col.min(buf.line_content_len(self.pos.line));
    }

    /// Down `count` lines. On the last line, go to its end instead.
    pub fn move_down(&mut self, count: usize, buf: &Buffer) {
        let last = buf.line_count() - 1;
        if self.pos.line == last {
            self.move_to_line_end(buf);
            return;
        }
        self.pos.line = (self.pos.line + count).min(last);
        self.pos.col = self.sticky_col.min(buf.line_content_len(self.pos.line));
    }

    pub const fn move_to_start(&mut self) {
        self.pos = Position::ZERO;
        self.sticky_col = 0;
    }

    pub fn move_to_end(&mut self, buf: &Buffer) {
        self.set_position(buf.end_position(), buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
