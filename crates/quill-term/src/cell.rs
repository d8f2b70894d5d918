// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A cell holds a character, a foreground and background color and a small
// set of SGR attributes. The frame buffer is a grid of these; the diff
// renderer compares two grids cell by cell and only emits output for the
// cells that changed.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell holds
// the character, the second is a continuation cell (`ch == '\0'`) that only
// carries colors so the background fills correctly.

// ─── Color ───────────────────────────────────────────────────────────────────

/// Terminal color for a cell.
///
/// `Default` defers to the user's terminal theme, which is what a plain text
/// editor wants for the text area. UI chrome (menus, dialogs, status line)
/// uses palette indices or the `INVERSE` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / 49).
    #[default]
    Default,
    /// ANSI 256-color palette index.
    Ansi(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Ansi(0);
    pub const RED: Self = Self::Ansi(1);
    pub const GREEN: Self = Self::Ansi(2);
    pub const YELLOW: Self = Self::Ansi(3);
    pub const BLUE: Self = Self::Ansi(4);
    pub const CYAN: Self = Self::Ansi(6);
    pub const WHITE: Self = Self::Ansi(7);
    pub const GRAY: Self = Self::Ansi(8);
    pub const BRIGHT_WHITE: Self = Self::Ansi(15);

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter:
    ///
    /// ```
    /// use quill_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 3.
        const ITALIC    = 1 << 2;
        /// SGR 4.
        const UNDERLINE = 1 << 3;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Colors plus attributes, without a character.
///
/// Paint helpers take a `Style` so call sites don't have to thread three
/// separate arguments through every function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Terminal default colors, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// Create a style from colors and attributes.
    #[inline]
    #[must_use]
    pub const fn new(fg: Color, bg: Color, attrs: Attr) -> Self {
        Self { fg, bg, attrs }
    }

    /// Default colors with the given attributes.
    #[inline]
    #[must_use]
    pub const fn attrs(attrs: Attr) -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs,
        }
    }

    /// Add attributes on top of the current ones.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Character used for continuation cells.
const CONTINUATION: char = '\0';

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character to display. `'\0'` marks a continuation cell.
    pub ch: char,
    /// Foreground (text) color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// SGR attributes.
    pub attrs: Attr,
}

impl Cell {
    /// A space with default colors and no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// A cell with default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attr::empty(),
        }
    }

    /// A cell with the given style.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, style: Style) -> Self {
        Self {
            ch,
            fg: style.fg,
            bg: style.bg,
            attrs: style.attrs,
        }
    }

    /// The second half of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self::styled(CONTINUATION, style)
    }

    /// Whether this cell continues the wide character to its left.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The style part of the cell.
    #[inline]
    #[must_use]
    pub const fn style(self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
        }
    }

    /// Whether two cells would need the same SGR state to render.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
