// SPDX-License-Identifier: MIT
//
// quill — a minimal terminal text editor.
//
// This is the main binary that wires together the crates:
//
//   quill-term   → terminal control, rendering, input parsing, event loop
//   quill-editor → document session, text area, menus, dialogs, view
//
// The Editor struct (editor.rs) implements quill-term's App trait. Layout:
//
//   ┌──────────────────────────────┐
//   │ menu bar          title      │  ← 1 row
//   ├──────────────────────────────┤
//   │ text area                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status message    Ln, Col    │  ← 1 row
//   └──────────────────────────────┘
//
// Usage: quill [FILE]

mod editor;
mod logging;

use std::env;
use std::path::PathBuf;
use std::process;

use quill_editor::options::Options;
use quill_term::event_loop::EventLoop;

use crate::editor::Editor;

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let path = env::args_os().nth(1).map(PathBuf::from);

    if let Some(log) = logging::init() {
        tracing::info!(log = %log.display(), version = env!("CARGO_PKG_VERSION"), "quill starting");
    }

    let mut editor = Editor::new(Options::default(), path);
    let mut event_loop = EventLoop::new();

    if let Err(e) = event_loop.run(&mut editor) {
        tracing::error!(%e, "terminal failure");
        eprintln!("quill: {e}");
        process::exit(1);
    }
}
