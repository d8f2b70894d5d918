//! Document session — which file is open and whether it has unsaved changes.
//!
//! The session owns two pieces of state: the current path (none for an
//! untitled document) and the dirty flag. The text itself lives only in the
//! [`TextSurface`]; the session reads it when saving and replaces it when
//! loading.
//!
//! ```text
//!            text changed
//!   Clean ─────────────────▶ Dirty
//!     ▲                        │
//!     └────────────────────────┘
//!      save succeeds, or new/open after the user discards
//! ```
//!
//! Every operation that would throw the text away (new, open, close) first
//! runs the maybe-save [`Guard`]: a clean document proceeds silently, a dirty
//! one asks Yes / No / Cancel.
//!
//! The window title is derived from `(current_path, is_modified)` each time
//! it's needed, so the unsaved marker can never be doubled or go stale.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{self, FileError};
use crate::options::Options;
use crate::prompt::{Answer, FileFilter, Host, default_filters};
use crate::surface::TextSurface;

const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of the maybe-save check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Safe to discard the current text.
    Proceed,
    /// The user cancelled, or saving failed.
    Abort,
}

/// Result of Save / Save As.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The user dismissed the Save As dialog. Nothing was reported.
    Cancelled,
    /// The write failed and the error was reported.
    Failed,
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_saved(self) -> bool {
        matches!(self, Self::Saved)
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// A transient message that hides itself after a timeout.
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
    timeout: Duration,
}

impl StatusLine {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            message: None,
            timeout,
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, at: Instant) {
        self.message = Some((message.into(), at));
    }

    /// The message if it's still within its timeout at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        match &self.message {
            Some((text, shown)) if now.saturating_duration_since(*shown) < self.timeout => {
                Some(text)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn visible(&self) -> Option<&str> {
        self.visible_at(Instant::now())
    }

    /// Drop the message once it has timed out. Returns `true` if it was
    /// dropped now, meaning the screen needs a repaint.
    pub fn expire_at(&mut self, now: Instant) -> bool {
        if self.message.is_some() && self.visible_at(now).is_none() {
            self.message = None;
            return true;
        }
        false
    }

    pub fn expire(&mut self) -> bool {
        self.expire_at(Instant::now())
    }
}

// ---------------------------------------------------------------------------
// DocumentSession
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DocumentSession {
    current_path: Option<PathBuf>,
    is_modified: bool,
    filters: Vec<FileFilter>,
    status: StatusLine,
}

impl DocumentSession {
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let mut status = StatusLine::new(options.status_timeout);
        status.show("Ready");
        Self {
            current_path: None,
            is_modified: false,
            filters: default_filters(),
            status,
        }
    }

    // -- State --------------------------------------------------------------

    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.is_modified
    }

    #[must_use]
    pub const fn status(&self) -> &StatusLine {
        &self.status
    }

    pub const fn status_mut(&mut self) -> &mut StatusLine {
        &mut self.status
    }

    /// The file name of the current path, or `Untitled`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.current_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| UNTITLED.to_string(), |name| name.to_string_lossy().into_owned())
    }

    /// `*Quill - notes.txt` when dirty, `Quill - notes.txt` when clean.
    #[must_use]
    pub fn title(&self, app_name: &str) -> String {
        let marker = if self.is_modified { "*" } else { "" };
        format!("{marker}{app_name} - {}", self.display_name())
    }

    /// The text surface reported a user edit.
    pub fn on_text_changed(&mut self) {
        if !self.is_modified {
            debug!("document became dirty");
            self.is_modified = true;
        }
    }

    // -- Guard --------------------------------------------------------------

    /// Make it safe to discard the current text.
    ///
    /// Clean documents proceed without a prompt. Dirty ones ask; Yes saves
    /// and proceeds only if the save succeeded, No discards, Cancel aborts.
    pub fn maybe_save(&mut self, surface: &dyn TextSurface, host: &mut dyn Host) -> Guard {
        if !self.is_modified {
            return Guard::Proceed;
        }
        let answer = host.ask_yes_no_cancel(
            "Unsaved Changes",
            "This document has unsaved changes. Save now?",
        );
        let guard = match answer {
            Answer::Yes if self.save(surface, host).is_saved() => Guard::Proceed,
            Answer::No => Guard::Proceed,
            Answer::Yes | Answer::Cancel => Guard::Abort,
        };
        debug!(?answer, ?guard, "maybe-save");
        guard
    }

    // -- Operations ---------------------------------------------------------

    /// File > New. Returns `false` if the guard vetoed it.
    pub fn new_document(&mut self, surface: &mut dyn TextSurface, host: &mut dyn Host) -> bool {
        if self.maybe_save(surface, host) == Guard::Abort {
            return false;
        }
        surface.clear();
        self.current_path = None;
        self.is_modified = false;
        self.status.show("New file");
        info!("new document");
        true
    }

    /// File > Open. Returns `true` if a file was loaded.
    ///
    /// Cancelling the dialog changes nothing. A read failure is reported once
    /// and leaves the text, path and dirty flag as they were.
    pub fn open_document(&mut self, surface: &mut dyn TextSurface, host: &mut dyn Host) -> bool {
        if self.maybe_save(surface, host) == Guard::Abort {
            return false;
        }
        let Some(path) = host.open_file(&self.filters) else {
            debug!("open cancelled");
            return false;
        };
        match self.load(&path, surface) {
            Ok(()) => true,
            Err(err) => {
                host.show_error("Error", &format!("Could not open file:\n{err}"));
                false
            }
        }
    }

    /// Read `path` into the surface, unguarded. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Read`] if the file is missing, unreadable or not
    /// UTF-8.
    pub fn load(&mut self, path: &Path, surface: &mut dyn TextSurface) -> Result<(), FileError> {
        let text = error::read_text_file(path).inspect_err(|err| warn!(%err, "open failed"))?;
        surface.set_text(&text);
        self.current_path = Some(path.to_path_buf());
        self.is_modified = false;
        self.status.show(format!("Opened {}", path.display()));
        info!(path = %path.display(), bytes = text.len(), "opened");
        Ok(())
    }

    /// File > Save. Without a path this is Save As.
    pub fn save(&mut self, surface: &dyn TextSurface, host: &mut dyn Host) -> SaveOutcome {
        match self.current_path.clone() {
            Some(path) => self.save_to(&path, surface, host),
            None => self.save_as(surface, host),
        }
    }

    /// File > Save As. The chosen path becomes current only if the write
    /// succeeds.
    pub fn save_as(&mut self, surface: &dyn TextSurface, host: &mut dyn Host) -> SaveOutcome {
        let Some(path) = host.save_file(&self.filters) else {
            debug!("save-as cancelled");
            return SaveOutcome::Cancelled;
        };
        self.save_to(&path, surface, host)
    }

    fn save_to(&mut self, path: &Path, surface: &dyn TextSurface, host: &mut dyn Host) -> SaveOutcome {
        let text = surface.text();
        match error::write_text_file(path, &text) {
            Ok(()) => {
                self.current_path = Some(path.to_path_buf());
                self.is_modified = false;
                self.status.show(format!("Saved {}", path.display()));
                info!(path = %path.display(), bytes = text.len(), "saved");
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(%err, "save failed");
                host.show_error("Error", &format!("Could not save file:\n{err}"));
                SaveOutcome::Failed
            }
        }
    }

    /// The window is closing. `Proceed` means the application may exit.
    pub fn request_close(&mut self, surface: &dyn TextSurface, host: &mut dyn Host) -> Guard {
        let guard = self.maybe_save(surface, host);
        if guard == Guard::Abort {
            info!("close vetoed");
        }
        guard
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
