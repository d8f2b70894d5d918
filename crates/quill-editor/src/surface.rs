//! Text surface — the editable area of the window.
//!
//! [`TextSurface`] is the contract the document session relies on: whole-text
//! get and set, the Edit-menu operations, and a change signal. [`TextArea`] is
//! the implementation, built from a rope [`Buffer`], a [`Cursor`], undo
//! [`History`] and a [`Clipboard`].
//!
//! # Change signal
//!
//! Every user edit that changes the text (typing, paste, cut, undo, redo)
//! raises a flag that [`take_change`](TextSurface::take_change) reads and
//! clears. Programmatic replacement through `set_text` or `clear` never
//! raises it: loading a file must not make the document dirty.

use quill_term::input::{KeyCode, KeyEvent, Modifiers};

use crate::buffer::Buffer;
use crate::clipboard::Clipboard;
use crate::cursor::Cursor;
use crate::history::{Edit, EditKind, History};
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

pub trait TextSurface {
    /// The full document text.
    fn text(&self) -> String;

    /// Replace the text without raising the change signal. Resets the
    /// cursor, selection and undo history.
    fn set_text(&mut self, text: &str);

    /// Empty the text without raising the change signal.
    fn clear(&mut self) {
        self.set_text("");
    }

    fn undo(&mut self);
    fn redo(&mut self);

    /// Move the selection to the clipboard. No-op without a selection.
    fn cut(&mut self);

    /// Copy the selection to the clipboard. No-op without a selection.
    fn copy(&mut self);

    /// Replace the selection (or insert at the cursor) with the clipboard.
    fn paste(&mut self);

    /// Whether the user changed the text since the last call.
    fn take_change(&mut self) -> bool;
}

// ---------------------------------------------------------------------------
// TextArea
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TextArea {
    buffer: Buffer,
    cursor: Cursor,
    history: History,
    clipboard: Clipboard,
    changed: bool,
    /// Rows moved by PageUp/PageDown; the view updates it on resize.
    page_rows: usize,
}

impl TextArea {
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_rows: 20,
            ..Self::default()
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.cursor.selection()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_page_rows(&mut self, rows: usize) {
        self.page_rows = rows.max(1);
    }

    // -- Input --------------------------------------------------------------

    /// Apply an editing or navigation key. Returns `false` for keys the text
    /// area doesn't handle, which the caller may treat as commands.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(ch) = key.text_char() {
            self.insert_char(ch);
            return true;
        }

        let extend = key.has(Modifiers::SHIFT);
        let ctrl = key.has(Modifiers::CTRL);
        if key.modifiers.intersects(Modifiers::ALT | Modifiers::SUPER) {
            return false;
        }

        match key.code {
            KeyCode::Enter if !ctrl => {
                let newline = self.buffer.line_ending().as_str();
                self.replace_selection(newline, EditKind::Other);
            }
            KeyCode::Tab if !ctrl && !extend => self.replace_selection("\t", EditKind::Typing),
            KeyCode::Backspace if !ctrl => self.backspace(),
            KeyCode::Delete if !ctrl => self.delete_forward(),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down
            | KeyCode::PageUp | KeyCode::PageDown
            | KeyCode::Home | KeyCode::End => self.navigate(key.code, extend, ctrl),
            _ => return false,
        }
        true
    }

    /// Place the cursor, e.g. from a mouse click. `extend` keeps a selection.
    pub fn click(&mut self, pos: Position, extend: bool) {
        self.cursor.prepare_move(extend);
        self.cursor.set_position(pos, &self.buffer);
        self.history.seal();
    }

    pub fn select_all(&mut self) {
        self.cursor.select_all(&self.buffer);
        self.history.seal();
    }

    // -- Editing ------------------------------------------------------------

    pub fn insert_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.replace_selection(ch.encode_utf8(&mut utf8), EditKind::Typing);
    }

    /// Insert a block of text, e.g. a terminal paste. Line breaks of any
    /// style are converted to the document's.
    pub fn insert_text(&mut self, text: &str) {
        let newline = self.buffer.line_ending().as_str();
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let converted = if newline == "\n" {
            normalized
        } else {
            normalized.replace('\n', newline)
        };
        self.replace_selection(&converted, EditKind::Other);
    }

    fn backspace(&mut self) {
        if let Some(sel) = self.cursor.selection() {
            self.delete_range(sel);
            return;
        }
        let end = self.cursor.position();
        let mut probe = self.cursor.clone();
        probe.move_left(&self.buffer);
        self.delete_range(Range::ordered(probe.position(), end));
    }

    fn delete_forward(&mut self) {
        if let Some(sel) = self.cursor.selection() {
            self.delete_range(sel);
            return;
        }
        let start = self.cursor.position();
        let mut probe = self.cursor.clone();
        probe.move_right(&self.buffer);
        self.delete_range(Range::ordered(start, probe.position()));
    }

    /// Replace the selection, if any, with `text` at the cursor.
    fn replace_selection(&mut self, text: &str, kind: EditKind) {
        let before = self.cursor.position();
        let mut edits = Vec::new();
        let mut at = before;
        let mut kind = kind;

        if let Some(sel) = self.cursor.selection() {
            let removed = self.buffer.delete(sel);
            edits.push(Edit::Delete {
                at: sel.start,
                text: removed,
            });
            at = sel.start;
            kind = EditKind::Other;
        }

        let after = if text.is_empty() {
            at
        } else {
            edits.push(Edit::Insert {
                at,
                text: text.to_string(),
            });
            self.buffer.insert(at, text)
        };
        self.finish_edit(kind, edits, before, after);
    }

    fn delete_range(&mut self, range: Range) {
        if range.is_empty() {
            return;
        }
        let before = self.cursor.position();
        let removed = self.buffer.delete(range);
        let edits = vec![Edit::Delete {
            at: range.start,
            text: removed,
        }];
        self.finish_edit(EditKind::Other, edits, before, range.start);
    }

    fn finish_edit(&mut self, kind: EditKind, edits: Vec<Edit>, before: Position, after: Position) {
        if edits.is_empty() {
            return;
        }
        self.history.record(kind, edits, before, after);
        self.cursor.clear_selection();
        self.cursor.set_position(after, &self.buffer);
        self.changed = true;
    }

    // -- Navigation ---------------------------------------------------------

    fn navigate(&mut self, code: KeyCode, extend: bool, ctrl: bool) {
        self.history.seal();

        // Plain Left/Right collapse a selection to its edge.
        if !extend {
            if let Some(sel) = self.cursor.selection() {
                match code {
                    KeyCode::Left => {
                        self.cursor.clear_selection();
                        self.cursor.set_position(sel.start, &self.buffer);
                        return;
                    }
                    KeyCode::Right => {
                        self.cursor.clear_selection();
                        self.cursor.set_position(sel.end, &self.buffer);
                        return;
                    }
                    _ => {}
                }
            }
        }

        self.cursor.prepare_move(extend);
        let buf = &self.buffer;
        match code {
            KeyCode::Left => self.cursor.move_left(buf),
            KeyCode::Right => self.cursor.move_right(buf),
            KeyCode::Up => self.cursor.move_up(1, buf),
            KeyCode::Down => self.cursor.move_down(1, buf),
            KeyCode::PageUp => self.cursor.move_up(self.page_rows, buf),
            KeyCode::PageDown => self.cursor.move_down(self.page_rows, buf),
            KeyCode::Home if ctrl => self.cursor.move_to_start(),
            KeyCode::End if ctrl => self.cursor.move_to_end(buf),
            KeyCode::Home => self.cursor.move_to_line_start(),
            KeyCode::End => self.cursor.move_to_line_end(buf),
            _ => {}
        }
    }
}

impl TextSurface for TextArea {
    fn text(&self) -> String {
        self.buffer.contents()
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.cursor = Cursor::new();
        self.history.clear();
        self.changed = false;
    }

    fn undo(&mut self) {
        if let Some(pos) = self.history.undo(&mut self.buffer) {
            self.cursor.clear_selection();
            self.cursor.set_position(pos, &self.buffer);
            self.changed = true;
        }
    }

    fn redo(&mut self) {
        if let Some(pos) = self.history.redo(&mut self.buffer) {
            self.cursor.clear_selection();
            self.cursor.set_position(pos, &self.buffer);
            self.changed = true;
        }
    }

    fn cut(&mut self) {
        if let Some(sel) = self.cursor.selection() {
            self.clipboard.store(self.buffer.slice_text(sel));
            self.delete_range(sel);
        }
    }

    fn copy(&mut self) {
        if let Some(sel) = self.cursor.selection() {
            self.clipboard.store(self.buffer.slice_text(sel));
        }
    }

    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let text = self.clipboard.content().to_string();
        self.replace_selection(&text, EditKind::Other);
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, Modifiers::SHIFT)
    }

    fn type_str(area: &mut TextArea, s: &str) {
        for ch in s.chars() {
            assert!(area.handle_key(key(KeyCode::Char(ch))));
        }
    }

    fn area_with(text: &str) -> TextArea {
        let mut area = TextArea::new();
        area.set_text(text);
        area
    }

    #[test]
    fn typing_inserts_and_signals() {
        let mut area = TextArea::new();
        type_str(&mut area, "hi");
        assert_eq!(area.text(), "hi");
        assert!(area.take_change());
        assert!(!area.take_change());
    }

    #[test]
    fn set_text_and_clear_do_not_signal() {
        let mut area = TextArea::new();
        area.set_text("loaded");
        assert!(!area.take_change());
        assert_eq!(area.cursor().position(), Position::ZERO);
        area.clear();
        assert_eq!(area.text(), "");
        assert!(!area.take_change());
    }

    #[test]
    fn set_text_resets_history() {
        let mut area = TextArea::new();
        type_str(&mut area, "abc");
        area.set_text("fresh");
        assert!(!area.can_undo());
        area.undo();
        assert_eq!(area.text(), "fresh");
        assert!(!area.take_change());
    }

    #[test]
    fn enter_uses_document_line_ending() {
        let mut area = area_with("a\r\nb");
        area.handle_key(key(KeyCode::End));
        area.handle_key(key(KeyCode::Enter));
        assert_eq!(area.text(), "a\r\n\r\nb");
        assert_eq!(area.cursor().position(), Position::new(1, 0));
    }

    #[test]
    fn backspace_joins_crlf_lines() {
        let mut area = area_with("ab\r\ncd");
        area.handle_key(key(KeyCode::Down));
        area.handle_key(key(KeyCode::Home));
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "abcd");
        assert_eq!(area.cursor().position(), Position::new(0, 2));
    }

    #[test]
    fn form_feed_is_an_ordinary_char() {
        let mut area = area_with("a\x0Cb");
        assert_eq!(area.buffer().line_count(), 1);
        area.handle_key(key(KeyCode::End));
        area.handle_key(key(KeyCode::Char('x')));
        assert_eq!(area.text(), "a\x0Cbx");
        assert_eq!(area.cursor().position(), Position::new(0, 4));
    }

    #[test]
    fn backspace_after_unicode_separator_line() {
        let mut area = area_with("ab\u{2028}cd");
        assert_eq!(area.buffer().line_count(), 1);
        area.handle_key(key(KeyCode::End));
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "ab\u{2028}c");
        assert_eq!(area.cursor().position(), Position::new(0, 4));
    }

    #[test]
    fn delete_forward_and_at_end() {
        let mut area = area_with("xy");
        area.handle_key(key(KeyCode::Delete));
        assert_eq!(area.text(), "y");
        area.handle_key(key(KeyCode::End));
        area.handle_key(key(KeyCode::Delete));
        assert_eq!(area.text(), "y");
        assert!(area.take_change());
    }

    #[test]
    fn backspace_at_origin_changes_nothing() {
        let mut area = area_with("x");
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "x");
        assert!(!area.take_change());
    }

    #[test]
    fn typing_replaces_selection() {
        let mut area = area_with("hello world");
        area.handle_key(shift(KeyCode::End));
        type_str(&mut area, "bye");
        assert_eq!(area.text(), "bye");
    }

    #[test]
    fn typed_run_undoes_in_one_step() {
        let mut area = TextArea::new();
        type_str(&mut area, "hello");
        area.handle_key(key(KeyCode::Enter));
        type_str(&mut area, "world");

        area.undo();
        assert_eq!(area.text(), "hello\n");
        area.undo();
        assert_eq!(area.text(), "hello");
        area.undo();
        assert_eq!(area.text(), "");

        area.redo();
        assert_eq!(area.text(), "hello");
        assert!(area.take_change());
    }

    #[test]
    fn cursor_move_splits_undo_steps() {
        let mut area = TextArea::new();
        type_str(&mut area, "ab");
        area.handle_key(key(KeyCode::Left));
        area.handle_key(key(KeyCode::Right));
        type_str(&mut area, "c");
        area.undo();
        assert_eq!(area.text(), "ab");
    }

    #[test]
    fn undo_with_empty_history_does_not_signal() {
        let mut area = area_with("x");
        area.undo();
        area.redo();
        assert!(!area.take_change());
    }

    #[test]
    fn cut_copy_paste() {
        let mut area = area_with("hello world");
        for _ in 0..5 {
            area.handle_key(shift(KeyCode::Right));
        }
        area.copy();
        assert!(!area.take_change());

        area.cut();
        assert_eq!(area.text(), " world");
        assert!(area.take_change());

        area.handle_key(key(KeyCode::End));
        area.paste();
        assert_eq!(area.text(), " worldhello");
        assert!(area.take_change());
    }

    #[test]
    fn cut_and_copy_without_selection_are_noops() {
        let mut area = area_with("abc");
        area.cut();
        area.copy();
        area.paste();
        assert_eq!(area.text(), "abc");
        assert!(!area.take_change());
    }

    #[test]
    fn paste_replaces_selection() {
        let mut area = area_with("one two");
        area.handle_key(shift(KeyCode::Right));
        area.handle_key(shift(KeyCode::Right));
        area.handle_key(shift(KeyCode::Right));
        area.copy();
        area.select_all();
        area.paste();
        assert_eq!(area.text(), "one");
    }

    #[test]
    fn insert_text_normalizes_breaks() {
        let mut area = TextArea::new();
        area.insert_text("a\rb\r\nc");
        assert_eq!(area.text(), "a\nb\nc");
        assert_eq!(area.cursor().position(), Position::new(2, 1));
    }

    #[test]
    fn plain_arrow_collapses_selection() {
        let mut area = area_with("abcdef");
        area.handle_key(key(KeyCode::Right));
        area.handle_key(shift(KeyCode::Right));
        area.handle_key(shift(KeyCode::Right));
        area.handle_key(key(KeyCode::Left));
        assert_eq!(area.selection(), None);
        assert_eq!(area.cursor().position(), Position::new(0, 1));
    }

    #[test]
    fn ctrl_home_end_and_paging() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut area = area_with(&text);
        area.set_page_rows(10);
        area.handle_key(key(KeyCode::PageDown));
        assert_eq!(area.cursor().position().line, 10);
        area.handle_key(KeyEvent::new(KeyCode::End, Modifiers::CTRL));
        assert_eq!(area.cursor().position(), Position::new(49, 2));
        area.handle_key(KeyEvent::new(KeyCode::Home, Modifiers::CTRL));
        assert_eq!(area.cursor().position(), Position::ZERO);
    }

    #[test]
    fn command_keys_are_not_consumed() {
        let mut area = TextArea::new();
        assert!(!area.handle_key(KeyEvent::ctrl('s')));
        assert!(!area.handle_key(KeyEvent::alt('f')));
        assert!(!area.handle_key(key(KeyCode::F(1))));
        assert!(!area.handle_key(key(KeyCode::Escape)));
        assert!(!area.take_change());
    }

    #[test]
    fn click_places_cursor() {
        let mut area = area_with("one\ntwo");
        area.click(Position::new(1, 9), false);
        assert_eq!(area.cursor().position(), Position::new(1, 3));
        area.click(Position::new(0, 1), true);
        assert_eq!(area.selection(), Some(Range::ordered(Position::new(0, 1), Position::new(1, 3))));
    }
}
