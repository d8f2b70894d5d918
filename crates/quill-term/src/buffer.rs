// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid that everything paints to.
//
// The editor paints its menu bar, text area, status line and any open
// dialog into a frame buffer. The diff renderer then compares the frame
// against the previous one and emits escape sequences for the changes.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are contiguous,
//     so the renderer's left-to-right scan is a linear walk.
//
//   - Paint operations clip to a `Rect`. Widgets paint freely inside their
//     region and never spill into their neighbours.
//
//   - Wide characters occupy two columns. The first cell holds the char,
//     the second is a continuation cell. Overwriting either half of a wide
//     char blanks the other half so no orphan is ever rendered.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};

// ─── Rect ────────────────────────────────────────────────────────────────────

/// A screen region in cells.
///
/// # Examples
///
/// ```
/// use quill_term::buffer::Rect;
///
/// let r = Rect::new(10, 5, 20, 4);
/// assert!(r.contains(10, 5));
/// assert!(r.contains(29, 8));
/// assert!(!r.contains(30, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, px: u16, py: u16) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// A rectangle of `width × height` centred inside `self`, shrunk to fit.
    #[must_use]
    pub fn centered(self, width: u16, height: u16) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Self {
            x: self.x + (self.width - width) / 2,
            y: self.y + (self.height - height) / 2,
            width,
            height,
        }
    }

    /// Shrink by `n` cells on every side.
    #[must_use]
    pub const fn inset(self, n: u16) -> Self {
        let w = self.width.saturating_sub(n * 2);
        let h = self.height.saturating_sub(n * 2);
        Self {
            x: self.x.saturating_add(n),
            y: self.y.saturating_add(n),
            width: w,
            height: h,
        }
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A 2D buffer of terminal cells.
///
/// # Examples
///
/// ```
/// use quill_term::buffer::FrameBuffer;
/// use quill_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).map(|c| c.ch), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The whole buffer as a [`Rect`].
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of a row as a `String`, continuation cells skipped.
    ///
    /// Mostly useful in tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| {
                row.iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy another buffer's contents, adopting its size.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
    }

    // ─── Cell Writes ─────────────────────────────────────────────────────

    /// Write a cell directly. No clipping, no wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Blank the other half of any wide char touching `(x, y)`.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = ' ';
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next].ch = ' ';
            }
        }
    }

    /// Paint one character cell, clipped to `clip`.
    ///
    /// Returns `true` if the cell was written.
    pub fn paint_cell(&mut self, x: u16, y: u16, ch: char, style: Style, clip: Rect) -> bool {
        if !self.in_bounds(x, y) || !clip.contains(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = Cell::styled(ch, style);
        true
    }

    /// Fill a rectangle with `ch` in `style`.
    pub fn fill_rect(&mut self, rect: Rect, ch: char, style: Style) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                self.paint_cell(x, y, ch, style, rect);
            }
        }
    }

    /// Paint a string left-to-right from `(x, y)`, clipped to `clip`.
    ///
    /// Wide characters get a continuation cell; a wide char that would be cut
    /// by the clip edge is painted as a space instead. Zero-width characters
    /// are skipped.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style, clip: Rect) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = clip.right().min(self.width);
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if w == 2 && col + 1 >= limit {
                self.paint_cell(col, y, ' ', style, clip);
                col += 1;
                break;
            }
            if self.paint_cell(col, y, ch, style, clip) && w == 2 {
                self.break_wide_char_at(col + 1, y);
                let idx = self.index(col + 1, y);
                self.cells[idx] = Cell::continuation(style);
            }
            // w is 1 or 2.
            #[allow(clippy::cast_possible_truncation)]
            let step = w as u16;
            col = col.saturating_add(step);
        }

        col.saturating_sub(x)
    }

    /// Draw a single-line box border around `rect`.
    pub fn draw_border(&mut self, rect: Rect, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        let bounds = self.bounds();
        for x in rect.x + 1..right {
            self.paint_cell(x, rect.y, '─', style, bounds);
            self.paint_cell(x, bottom, '─', style, bounds);
        }
        for y in rect.y + 1..bottom {
            self.paint_cell(rect.x, y, '│', style, bounds);
            self.paint_cell(right, y, '│', style, bounds);
        }
        self.paint_cell(rect.x, rect.y, '┌', style, bounds);
        self.paint_cell(right, rect.y, '┐', style, bounds);
        self.paint_cell(rect.x, bottom, '└', style, bounds);
        self.paint_cell(right, bottom, '┘', style, bounds);
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// ```
/// use quill_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
