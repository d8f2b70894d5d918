//! Undo/redo history.
//!
//! Every change to the text area is recorded as one [`Transaction`]: the
//! reversible [`Edit`]s it made plus the cursor before and after. Undo and
//! redo move whole transactions between two stacks.
//!
//! Consecutive typed characters coalesce: a [`EditKind::Typing`] transaction
//! that starts where the previous typing transaction left the cursor extends
//! it instead of pushing a new one, so undo removes a run of typing at once.
//! Moving the cursor (or any other kind of edit) [`seal`](History::seal)s
//! the run.
//!
//! Any new edit clears the redo stack. There is no branching history.

use crate::buffer::Buffer;
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// One reversible change, recorded after it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// `text` was inserted at `at`.
    Insert { at: Position, text: String },
    /// `text` was removed starting at `at`.
    Delete { at: Position, text: String },
}

impl Edit {
    fn apply(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { at, text } => {
                buf.insert(*at, text);
            }
            Self::Delete { at, text } => {
                buf.delete(Range::ordered(*at, end_after_insert(*at, text)));
            }
        }
    }

    fn revert(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { at, text } => {
                buf.delete(Range::ordered(*at, end_after_insert(*at, text)));
            }
            Self::Delete { at, text } => {
                buf.insert(*at, text);
            }
        }
    }
}

/// What produced a transaction. Only typing coalesces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Typing,
    Other,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Transaction {
    kind: EditKind,
    edits: Vec<Edit>,
    cursor_before: Position,
    cursor_after: Position,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    /// Set when the last undo transaction must not be extended by typing.
    sealed: bool,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            sealed: false,
        }
    }

    /// Record edits that were just applied to the buffer.
    ///
    /// `before` and `after` are the cursor positions around the change. An
    /// empty `edits` list records nothing.
    pub fn record(&mut self, kind: EditKind, edits: Vec<Edit>, before: Position, after: Position) {
        if edits.is_empty() {
            return;
        }
        self.redo_stack.clear();

        if kind == EditKind::Typing && !self.sealed {
            if let Some(last) = self.undo_stack.last_mut() {
                if last.kind == EditKind::Typing && last.cursor_after == before {
                    last.edits.extend(edits);
                    last.cursor_after = after;
                    return;
                }
            }
        }

        self.undo_stack.push(Transaction {
            kind,
            edits,
            cursor_before: before,
            cursor_after: after,
        });
        self.sealed = kind != EditKind::Typing;
    }

    /// End the current typing run; the next typed char starts a new step.
    pub const fn seal(&mut self) {
        self.sealed = true;
    }

    /// Undo the last transaction. Returns the cursor to restore, or `None`
    /// if there is nothing to undo.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let txn = self.undo_stack.pop()?;
        for edit in txn.edits.iter().rev() {
            edit.revert(buf);
        }
        let cursor = txn.cursor_before;
        self.redo_stack.push(txn);
        self.sealed = true;
        Some(cursor)
    }

    /// Redo the last undone transaction.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let txn = self.redo_stack.pop()?;
        for edit in &txn.edits {
            edit.apply(buf);
        }
        let cursor = txn.cursor_after;
        self.undo_stack.push(txn);
        self.sealed = true;
        Some(cursor)
    }

    /// Forget everything, e.g. after the text was replaced wholesale.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.sealed = false;
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Where `text` ends if inserted at `start`. `\r\n` counts as one break.
fn end_after_insert(start: Position, text: &str) -> Position {
    let mut line = start.line;
    let mut col = start.col;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                col = 0;
            }
            _ => col += 1,
        }
    }

    Position::new(line, col)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
