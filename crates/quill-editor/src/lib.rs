//! # quill-editor — Editor core for Quill
//!
//! Everything between the terminal layer and the binary:
//!
//! - **[`position`]**, **[`buffer`]**, **[`cursor`]**, **[`history`]**,
//!   **[`clipboard`]** — the text model: a rope with line-ending detection,
//!   a cursor with selection, undo/redo with typing coalesced into one step
//! - **[`surface`]** — `TextArea`, the editable widget, and the
//!   `TextSurface` trait the session drives it through
//! - **[`session`]** — `DocumentSession`: current path, the modified flag,
//!   the unsaved-changes guard, new/open/save/save-as/close, window title
//! - **[`prompt`]** — file filters and the dialog traits the session asks
//! - **[`dialog`]** — terminal implementations of those dialogs
//! - **[`menu`]** — menu bar model and keyboard shortcuts
//! - **[`view`]** — painting into a quill-term frame buffer
//! - **[`error`]**, **[`options`]** — file I/O errors and editor defaults

pub mod buffer;
pub mod clipboard;
pub mod cursor;
pub mod dialog;
pub mod error;
pub mod history;
pub mod menu;
pub mod options;
pub mod position;
pub mod prompt;
pub mod session;
pub mod surface;
pub mod view;
