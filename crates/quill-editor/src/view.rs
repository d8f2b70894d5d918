//! View — painting the editor into a quill-term [`FrameBuffer`].
//!
//! The screen is three bands:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ File  Edit  Help          *Quill - a.txt   │ ← menu bar (row 0)
//! │hello world                                 │
//! │                                            │ ← text area
//! │                                            │
//! │ Saved /tmp/a.txt              Ln 1, Col 12 │ ← status line (last row)
//! └────────────────────────────────────────────┘
//! ```
//!
//! Open menus and dialogs paint on top as bordered boxes.
//!
//! [`TextView`] holds only the scroll offsets; the text, cursor and selection
//! come from the [`TextArea`] passed to [`render`](TextView::render). Tabs
//! expand to the next tab stop and wide characters take two columns, so char
//! columns and display columns differ; [`char_col_to_display_col`] is the
//! mapping.

use quill_term::buffer::{FrameBuffer, Rect, char_width, string_width};
use quill_term::cell::{Attr, Color, Style};

use crate::menu::{MENUS, MenuItem, MenuState, title_spans};
use crate::position::Position;
use crate::surface::TextArea;

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

pub const BAR: Style = Style::new(Color::BLACK, Color::WHITE, Attr::empty());
pub const HIGHLIGHT: Style = Style::new(Color::BRIGHT_WHITE, Color::BLUE, Attr::empty());
pub const SELECTION: Style = Style::attrs(Attr::INVERSE);
pub const DIALOG: Style = Style::new(Color::BLACK, Color::WHITE, Attr::empty());
pub const DIALOG_TITLE: Style = Style::new(Color::BLACK, Color::WHITE, Attr::BOLD);
pub const ERROR_TITLE: Style = Style::new(Color::RED, Color::WHITE, Attr::BOLD);
pub const INPUT: Style = Style::new(Color::BLACK, Color::CYAN, Attr::empty());
pub const DIM: Style = Style::new(Color::GRAY, Color::WHITE, Attr::empty());

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub menu_bar: Rect,
    pub text: Rect,
    pub status: Rect,
}

impl Layout {
    /// Split a `width × height` screen. Tiny screens lose the text area
    /// first, then the status line.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        let status_y = if height >= 2 { height - 1 } else { height };
        let status_h = if height >= 2 { 1 } else { 0 };
        Self {
            menu_bar: Rect::new(0, 0, width, if height >= 1 { 1 } else { 0 }),
            text: Rect::new(0, 1, width, height.saturating_sub(2)),
            status: Rect::new(0, status_y, width, status_h),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Display width of `ch` when it starts at display column `col`.
fn cell_width(ch: char, col: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        tab_width - col % tab_width
    } else {
        char_width(ch)
    }
}

/// The display column of char column `char_col`, expanding tabs and
/// counting wide characters twice. Stops at a line break.
#[must_use]
pub fn char_col_to_display_col<I: Iterator<Item = char>>(chars: I, char_col: usize, tab_width: u8) -> usize {
    let tab_w = usize::from(tab_width.max(1));
    let mut display_col = 0;
    for ch in chars.take(char_col) {
        if ch == '\n' || ch == '\r' {
            break;
        }
        display_col += cell_width(ch, display_col, tab_w);
    }
    display_col
}

/// The char column whose cell covers display column `target`, or the end of
/// the line if `target` is past it.
#[must_use]
pub fn display_col_to_char_col<I: Iterator<Item = char>>(chars: I, target: usize, tab_width: u8) -> usize {
    let tab_w = usize::from(tab_width.max(1));
    let mut display_col = 0;
    let mut char_col = 0;
    for ch in chars {
        if ch == '\n' || ch == '\r' {
            break;
        }
        let w = cell_width(ch, display_col, tab_w);
        if target < display_col + w.max(1) {
            return char_col;
        }
        display_col += w;
        char_col += 1;
    }
    char_col
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// TextView
// ---------------------------------------------------------------------------

/// Scroll state of the text area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextView {
    top_line: usize,
    left_col: usize,
}

impl TextView {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top_line: 0,
            left_col: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    /// Scroll so the cursor is inside `rect`, keeping `margin` lines of
    /// context above and below where the height allows.
    pub fn scroll_to_cursor(&mut self, area: &TextArea, rect: Rect, tab_width: u8, margin: usize) {
        let height = usize::from(rect.height);
        let width = usize::from(rect.width);
        if height == 0 || width == 0 {
            return;
        }
        let margin = margin.min((height - 1) / 2);
        let cursor = area.cursor().position();

        if cursor.line < self.top_line + margin {
            self.top_line = cursor.line.saturating_sub(margin);
        }
        if cursor.line + margin >= self.top_line + height {
            self.top_line = cursor.line + margin + 1 - height;
        }
        let last = area.buffer().line_count() - 1;
        self.top_line = self.top_line.min(last);

        let display_col = area
            .buffer()
            .line(cursor.line)
            .map_or(0, |line| char_col_to_display_col(line.chars(), cursor.col, tab_width));
        if display_col < self.left_col {
            self.left_col = display_col;
        }
        if display_col >= self.left_col + width {
            self.left_col = display_col + 1 - width;
        }
    }

    /// Paint the visible lines into `rect` and return the cursor's screen
    /// cell, or `None` if it's outside the rect.
    pub fn render(&mut self, fb: &mut FrameBuffer, area: &TextArea, rect: Rect, tab_width: u8, margin: usize) -> Option<(u16, u16)> {
        self.scroll_to_cursor(area, rect, tab_width, margin);
        let buffer = area.buffer();
        let selection = area.selection();
        let tab_w = usize::from(tab_width.max(1));
        let right = usize::from(rect.right());

        for row in 0..rect.height {
            let line_idx = self.top_line + usize::from(row);
            let Some(line) = buffer.line(line_idx) else {
                break;
            };
            let y = rect.y + row;
            let content_len = buffer.line_content_len(line_idx);
            let mut display_col = 0usize;

            for (col, ch) in line.chars().take(content_len).enumerate() {
                let w = cell_width(ch, display_col, tab_w);
                let start = display_col;
                display_col += w;
                if display_col <= self.left_col || w == 0 {
                    continue;
                }
                let x = usize::from(rect.x) + start.saturating_sub(self.left_col);
                if x >= right {
                    break;
                }
                let selected = selection.is_some_and(|s| s.contains(Position::new(line_idx, col)));
                let style = if selected { SELECTION } else { Style::PLAIN };
                if ch == '\t' || start < self.left_col {
                    // Tabs and wide chars cut by the left edge become blanks.
                    let visible = display_col - start.max(self.left_col);
                    for dx in 0..visible {
                        fb.paint_cell(to_u16(x + dx), y, ' ', style, rect);
                    }
                } else {
                    fb.paint_text(to_u16(x), y, ch.encode_utf8(&mut [0; 4]), style, rect);
                }
            }

            // A selected line break shows as one selected cell.
            let eol = Position::new(line_idx, content_len);
            if selection.is_some_and(|s| s.contains(eol)) && display_col >= self.left_col {
                let x = usize::from(rect.x) + display_col - self.left_col;
                fb.paint_cell(to_u16(x), y, ' ', SELECTION, rect);
            }
        }

        let cursor = area.cursor().position();
        if cursor.line < self.top_line {
            return None;
        }
        let row = cursor.line - self.top_line;
        let display_col = buffer
            .line(cursor.line)
            .map_or(0, |line| char_col_to_display_col(line.chars(), cursor.col, tab_width));
        let col = display_col.checked_sub(self.left_col)?;
        (row < usize::from(rect.height) && col < usize::from(rect.width))
            .then(|| (rect.x + to_u16(col), rect.y + to_u16(row)))
    }

    /// The text position under screen cell `(x, y)`, for mouse clicks.
    #[must_use]
    pub fn position_at(&self, area: &TextArea, rect: Rect, x: u16, y: u16, tab_width: u8) -> Option<Position> {
        if !rect.contains(x, y) {
            return None;
        }
        let buffer = area.buffer();
        let line = (self.top_line + usize::from(y - rect.y)).min(buffer.line_count() - 1);
        let target = self.left_col + usize::from(x - rect.x);
        let col = buffer
            .line(line)
            .map_or(0, |l| display_col_to_char_col(l.chars(), target, tab_width));
        Some(Position::new(line, col))
    }
}

// ---------------------------------------------------------------------------
// Menu bar
// ---------------------------------------------------------------------------

/// Paint menu titles on the left and the window title on the right.
pub fn render_menu_bar(fb: &mut FrameBuffer, rect: Rect, menus: &MenuState, title: &str) {
    if rect.is_empty() {
        return;
    }
    fb.fill_rect(rect, ' ', BAR);
    let open = menus.selected().map(|(m, _)| m);
    let spans = title_spans();

    for (index, (menu, &(x, _))) in MENUS.iter().zip(&spans).enumerate() {
        let style = if open == Some(index) { HIGHLIGHT } else { BAR };
        paint_label(fb, x, rect.y, menu.label, style, rect, true);
    }

    let menus_end = spans.last().map_or(0, |&(x, w)| x + w);
    let width = to_u16(string_width(title));
    let x = rect.right().saturating_sub(width + 1).max(menus_end + 2);
    fb.paint_text(x, rect.y, title, BAR, rect);
}

/// Paint `label` with padding, underlining its mnemonic letter.
fn paint_label(fb: &mut FrameBuffer, x: u16, y: u16, label: &str, style: Style, clip: Rect, padded: bool) {
    let mut col = x;
    if padded {
        col += fb.paint_text(col, y, " ", style, clip);
    }
    let mut chars = label.chars();
    while let Some(ch) = chars.next() {
        if ch == '&' {
            if let Some(next) = chars.next() {
                col += fb.paint_text(col, y, next.encode_utf8(&mut [0; 4]), style.with_attrs(Attr::UNDERLINE), clip);
            }
            continue;
        }
        col += fb.paint_text(col, y, ch.encode_utf8(&mut [0; 4]), style, clip);
    }
    if padded {
        fb.paint_text(col, y, " ", style, clip);
    }
}

/// Paint the open menu's drop-down box, if any.
pub fn render_menu_dropdown(fb: &mut FrameBuffer, menus: &MenuState) {
    let Some((menu, selected)) = menus.selected() else {
        return;
    };
    let rect = MenuState::dropdown_rect(menu);
    fb.fill_rect(rect, ' ', DIALOG);
    fb.draw_border(rect, DIALOG);
    let inner = rect.inset(1);

    for (i, item) in MENUS[menu].items.iter().enumerate() {
        let y = inner.y + to_u16(i);
        match item {
            MenuItem::Separator => {
                let bounds = fb.bounds();
                fb.paint_cell(rect.x, y, '├', DIALOG, bounds);
                for x in inner.x..inner.right() {
                    fb.paint_cell(x, y, '─', DIALOG, bounds);
                }
                fb.paint_cell(inner.right(), y, '┤', DIALOG, bounds);
            }
            MenuItem::Command { label, shortcut, .. } => {
                let style = if i == selected { HIGHLIGHT } else { DIALOG };
                let row = Rect::new(inner.x, y, inner.width, 1);
                fb.fill_rect(row, ' ', style);
                paint_label(fb, inner.x + 1, y, label, style, row, false);
                let sx = inner.right().saturating_sub(to_u16(string_width(shortcut)) + 1);
                fb.paint_text(sx, y, shortcut, style, row);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Transient message on the left, cursor position on the right.
pub fn render_status(fb: &mut FrameBuffer, rect: Rect, message: Option<&str>, cursor: Position) {
    if rect.is_empty() {
        return;
    }
    fb.fill_rect(rect, ' ', BAR);
    let position = cursor.to_string();
    let px = rect.right().saturating_sub(to_u16(string_width(&position)) + 1);
    if let Some(message) = message {
        let clip = Rect::new(rect.x, rect.y, px.saturating_sub(rect.x + 1), 1);
        fb.paint_text(rect.x + 1, rect.y, message, BAR, clip);
    }
    fb.paint_text(px, rect.y, &position, BAR, rect);
}

// ---------------------------------------------------------------------------
// Dialog boxes
// ---------------------------------------------------------------------------

/// Paint a bordered box of `width × height` centred on screen with `title`
/// on its top edge. Returns the inner rect (inside the border, one column of
/// padding on each side).
pub fn render_dialog_frame(fb: &mut FrameBuffer, width: u16, height: u16, title: &str, title_style: Style) -> Rect {
    let rect = fb.bounds().centered(width, height);
    fb.fill_rect(rect, ' ', DIALOG);
    fb.draw_border(rect, DIALOG);
    let label = format!(" {title} ");
    let tx = rect.x + rect.width.saturating_sub(to_u16(string_width(&label))) / 2;
    fb.paint_text(tx, rect.y, &label, title_style, rect.inset(0));
    let inner = rect.inset(1);
    Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height)
}

/// Split `text` into lines of at most `width` columns, breaking at spaces
/// where possible and always at `\n`.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_w = 0;
        for word in paragraph.split(' ') {
            let word_w = string_width(word);
            let sep = usize::from(!line.is_empty());
            if line_w + sep + word_w > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_w = 0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_w += 1;
            }
            // Words longer than a line are hard-split.
            for ch in word.chars() {
                let w = char_width(ch);
                if line_w + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_w = 0;
                }
                line.push(ch);
                line_w += w;
            }
        }
        lines.push(line);
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TextSurface;
    use pretty_assertions::assert_eq;
    use quill_term::input::{KeyCode, KeyEvent, Modifiers};

    fn area_with(text: &str) -> TextArea {
        let mut area = TextArea::new();
        area.set_text(text);
        area
    }

    #[test]
    fn layout_bands() {
        let l = Layout::new(80, 24);
        assert_eq!(l.menu_bar, Rect::new(0, 0, 80, 1));
        assert_eq!(l.text, Rect::new(0, 1, 80, 22));
        assert_eq!(l.status, Rect::new(0, 23, 80, 1));

        let tiny = Layout::new(10, 1);
        assert!(tiny.text.is_empty());
        assert!(tiny.status.is_empty());
    }

    #[test]
    fn display_col_mapping() {
        assert_eq!(char_col_to_display_col("a\tb".chars(), 2, 4), 4);
        assert_eq!(char_col_to_display_col("ab\tc".chars(), 3, 4), 4);
        assert_eq!(char_col_to_display_col("中文x".chars(), 2, 4), 4);
        assert_eq!(char_col_to_display_col("ab\n".chars(), 5, 4), 2);
    }

    #[test]
    fn display_to_char_col() {
        assert_eq!(display_col_to_char_col("a\tb".chars(), 0, 4), 0);
        assert_eq!(display_col_to_char_col("a\tb".chars(), 2, 4), 1);
        assert_eq!(display_col_to_char_col("a\tb".chars(), 4, 4), 2);
        assert_eq!(display_col_to_char_col("中x".chars(), 1, 4), 0);
        assert_eq!(display_col_to_char_col("ab\n".chars(), 30, 4), 2);
    }

    #[test]
    fn renders_text_and_cursor() {
        let mut area = area_with("hello\n\tworld");
        area.handle_key(KeyEvent::plain(KeyCode::Down));
        area.handle_key(KeyEvent::plain(KeyCode::End));
        let mut fb = FrameBuffer::new(20, 5);
        let rect = Rect::new(0, 1, 20, 3);
        let cursor = TextView::new().render(&mut fb, &area, rect, 4, 0);

        assert_eq!(fb.row_text(1).trim_end(), "hello");
        assert_eq!(fb.row_text(2).trim_end(), "    world");
        assert_eq!(cursor, Some((9, 2)));
    }

    #[test]
    fn scrolls_vertically_with_margin() {
        let text = (0..30).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut area = area_with(&text);
        for _ in 0..10 {
            area.handle_key(KeyEvent::plain(KeyCode::Down));
        }
        let mut view = TextView::new();
        let rect = Rect::new(0, 0, 20, 5);
        view.scroll_to_cursor(&area, rect, 4, 1);
        assert_eq!(view.top_line(), 7);

        area.handle_key(KeyEvent::new(KeyCode::Home, Modifiers::CTRL));
        view.scroll_to_cursor(&area, rect, 4, 1);
        assert_eq!(view.top_line(), 0);
    }

    #[test]
    fn scrolls_horizontally() {
        let mut area = area_with(&"x".repeat(50));
        area.handle_key(KeyEvent::plain(KeyCode::End));
        let mut fb = FrameBuffer::new(10, 1);
        let mut view = TextView::new();
        let rect = fb.bounds();
        let cursor = view.render(&mut fb, &area, rect, 4, 0);
        assert_eq!(view.left_col(), 41);
        assert_eq!(cursor, Some((9, 0)));
    }

    #[test]
    fn selection_renders_inverse() {
        let mut area = area_with("abc");
        area.handle_key(KeyEvent::new(KeyCode::Right, Modifiers::SHIFT));
        let mut fb = FrameBuffer::new(10, 1);
        let rect = fb.bounds();
        TextView::new().render(&mut fb, &area, rect, 4, 0);
        assert!(fb.get(0, 0).unwrap().attrs.contains(Attr::INVERSE));
        assert!(!fb.get(1, 0).unwrap().attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn click_maps_to_position() {
        let area = area_with("ab\n\tcd");
        let view = TextView::new();
        let rect = Rect::new(0, 1, 20, 5);
        assert_eq!(view.position_at(&area, rect, 1, 1, 4), Some(Position::new(0, 1)));
        assert_eq!(view.position_at(&area, rect, 5, 2, 4), Some(Position::new(1, 2)));
        assert_eq!(view.position_at(&area, rect, 3, 4, 4), Some(Position::new(1, 0)));
        assert_eq!(view.position_at(&area, rect, 3, 0, 4), None);
    }

    #[test]
    fn menu_bar_shows_titles_and_window_title() {
        let mut fb = FrameBuffer::new(40, 3);
        render_menu_bar(&mut fb, Rect::new(0, 0, 40, 1), &MenuState::new(), "*Quill - a.txt");
        let row = fb.row_text(0);
        assert!(row.starts_with(" File  Edit  Help "));
        assert!(row.trim_end().ends_with("*Quill - a.txt"));
        assert!(fb.get(1, 0).unwrap().attrs.contains(Attr::UNDERLINE));
    }

    #[test]
    fn dropdown_lists_items_and_shortcuts() {
        let mut menus = MenuState::new();
        menus.open(0);
        let mut fb = FrameBuffer::new(40, 12);
        render_menu_dropdown(&mut fb, &menus);
        assert!(fb.row_text(2).contains("New"));
        assert!(fb.row_text(2).contains("Ctrl+N"));
        assert!(fb.row_text(4).contains('├'));
        assert!(fb.row_text(6).contains("Ctrl+Shift+S"));
        assert_eq!(fb.get(2, 2).unwrap().bg, HIGHLIGHT.bg);
    }

    #[test]
    fn status_shows_message_and_position() {
        let mut fb = FrameBuffer::new(30, 1);
        let rect = fb.bounds();
        render_status(&mut fb, rect, Some("Ready"), Position::new(2, 4));
        let row = fb.row_text(0);
        assert!(row.starts_with(" Ready"));
        assert!(row.trim_end().ends_with("Ln 3, Col 5"));
    }

    #[test]
    fn dialog_frame_is_centred() {
        let mut fb = FrameBuffer::new(40, 10);
        let inner = render_dialog_frame(&mut fb, 20, 6, "Error", ERROR_TITLE);
        assert_eq!(inner, Rect::new(12, 3, 16, 4));
        assert!(fb.row_text(2).contains(" Error "));
    }

    #[test]
    fn wrap_breaks_at_spaces_and_newlines() {
        assert_eq!(wrap_text("Could not open file:\nno such file", 12), [
            "Could not",
            "open file:",
            "no such file"
        ]);
        assert_eq!(wrap_text("abcdefgh", 3), ["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 5), [""]);
    }
}
