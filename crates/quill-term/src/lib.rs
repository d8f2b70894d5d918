// SPDX-License-Identifier: MIT
//
// quill-term — terminal layer for the Quill editor.
//
// Raw mode and the alternate screen, a cell grid the editor paints into, a
// differential renderer that only emits what changed, an input parser for
// keys, mouse clicks and bracketed paste, and an event loop that can run
// blocking modal dialogs on top of the application.
//
// No TUI framework underneath: escape sequences are written directly and
// termios is driven through libc.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod terminal;
