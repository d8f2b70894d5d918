//! Dialogs — the terminal side of [`FileDialog`] and [`MessagePrompt`].
//!
//! Each dialog is a quill-term [`Overlay`] run with [`Screen::run_modal`],
//! so it blocks the editor until answered, the way a desktop message box
//! does. [`TerminalHost`] wraps a [`Screen`] and exposes them as the
//! session's [`Host`](crate::prompt::Host).
//!
//! - [`QuestionBox`] asks Yes / No / Cancel.
//! - [`MessageBox`] reports an error or a notice.
//! - [`PathDialog`] picks a file to open or a path to save to.

use std::fs;
use std::path::{Path, PathBuf};

use quill_term::ansi::CursorShape;
use quill_term::buffer::{FrameBuffer, Rect, string_width};
use quill_term::event_loop::{CursorPlacement, Overlay, Screen};
use quill_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEventKind};

use crate::prompt::{Answer, FileDialog, FileFilter, MessagePrompt};
use crate::view::{self, DIALOG, DIALOG_TITLE, DIM, ERROR_TITLE, HIGHLIGHT, INPUT};

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn is_click(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(m) if m.kind == MouseEventKind::Press(MouseButton::Left) => Some((m.x, m.y)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Message boxes
// ---------------------------------------------------------------------------

/// Paint a centred box with a wrapped message and a row of buttons.
/// Returns the rect of each button, for mouse hits.
fn paint_message_box(
    fb: &mut FrameBuffer,
    title: &str,
    title_style: quill_term::cell::Style,
    message: &str,
    buttons: &[(&str, bool)],
) -> Vec<Rect> {
    let labels: Vec<String> = buttons.iter().map(|(label, _)| format!("[ {label} ]")).collect();
    let buttons_w = labels.iter().map(|l| string_width(l)).sum::<usize>() + 2 * labels.len().saturating_sub(1);
    let max_w = usize::from(fb.width()).saturating_sub(8).max(10);
    let longest = message.split('\n').map(string_width).max().unwrap_or(0);
    let text_w = longest.max(buttons_w).max(string_width(title) + 4).min(max_w);
    let lines = view::wrap_text(message, text_w);

    let inner = view::render_dialog_frame(fb, to_u16(text_w + 4), to_u16(lines.len() + 4), title, title_style);
    for (i, line) in lines.iter().enumerate() {
        fb.paint_text(inner.x, inner.y + to_u16(i), line, DIALOG, inner);
    }

    let y = inner.bottom().saturating_sub(1);
    let mut x = inner.x + to_u16(usize::from(inner.width).saturating_sub(buttons_w) / 2);
    let mut rects = Vec::with_capacity(buttons.len());
    for (label, &(_, focused)) in labels.iter().zip(buttons) {
        let style = if focused { HIGHLIGHT } else { DIALOG };
        let w = fb.paint_text(x, y, label, style, inner);
        rects.push(Rect::new(x, y, w, 1));
        x += w + 2;
    }
    rects
}

const CHOICES: [(Answer, &str); 3] = [(Answer::Yes, "Yes"), (Answer::No, "No"), (Answer::Cancel, "Cancel")];

/// Yes / No / Cancel. Y, N and C answer directly; arrows or Tab move the
/// focus and Enter picks it; Esc cancels.
#[derive(Debug)]
pub struct QuestionBox {
    title: String,
    message: String,
    focus: usize,
    buttons: Vec<Rect>,
}

impl QuestionBox {
    #[must_use]
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            focus: 0,
            buttons: Vec::new(),
        }
    }

    #[must_use]
    pub const fn focused(&self) -> Answer {
        CHOICES[self.focus].0
    }
}

impl Overlay for QuestionBox {
    type Output = Answer;

    fn on_event(&mut self, event: &Event) -> Option<Answer> {
        if let Some((x, y)) = is_click(event) {
            let hit = self.buttons.iter().position(|r| r.contains(x, y))?;
            return CHOICES.get(hit).map(|&(answer, _)| answer);
        }
        let Event::Key(key) = event else {
            return None;
        };
        if key.has(Modifiers::CTRL) {
            return None;
        }
        match key.code {
            KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
                'y' => Some(Answer::Yes),
                'n' => Some(Answer::No),
                'c' => Some(Answer::Cancel),
                _ => None,
            },
            KeyCode::Escape => Some(Answer::Cancel),
            KeyCode::Enter => Some(self.focused()),
            KeyCode::Left => {
                self.focus = (self.focus + CHOICES.len() - 1) % CHOICES.len();
                None
            }
            KeyCode::Tab if key.has(Modifiers::SHIFT) => {
                self.focus = (self.focus + CHOICES.len() - 1) % CHOICES.len();
                None
            }
            KeyCode::Right | KeyCode::Tab => {
                self.focus = (self.focus + 1) % CHOICES.len();
                None
            }
            _ => None,
        }
    }

    fn paint(&mut self, fb: &mut FrameBuffer) {
        let buttons: Vec<(&str, bool)> = CHOICES
            .iter()
            .enumerate()
            .map(|(i, &(_, label))| (label, i == self.focus))
            .collect();
        self.buttons = paint_message_box(fb, &self.title, DIALOG_TITLE, &self.message, &buttons);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Info,
}

/// A notice with a single OK button. Enter, Space, Esc or a click on OK
/// dismiss it.
#[derive(Debug)]
pub struct MessageBox {
    kind: MessageKind,
    title: String,
    message: String,
    ok: Option<Rect>,
}

impl MessageBox {
    #[must_use]
    pub fn new(kind: MessageKind, title: &str, message: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            ok: None,
        }
    }
}

impl Overlay for MessageBox {
    type Output = ();

    fn on_event(&mut self, event: &Event) -> Option<()> {
        if let Some((x, y)) = is_click(event) {
            return self.ok.filter(|r| r.contains(x, y)).map(|_| ());
        }
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Enter | KeyCode::Escape | KeyCode::Char(' '),
                ..
            }) => Some(()),
            _ => None,
        }
    }

    fn paint(&mut self, fb: &mut FrameBuffer) {
        let title_style = match self.kind {
            MessageKind::Error => ERROR_TITLE,
            MessageKind::Info => DIALOG_TITLE,
        };
        let rects = paint_message_box(fb, &self.title, title_style, &self.message, &[("OK", true)]);
        self.ok = rects.first().copied();
    }
}

// ---------------------------------------------------------------------------
// Path dialog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Open,
    Save,
}

impl PathMode {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Open => "Open File",
            Self::Save => "Save File As",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    is_dir: bool,
}

/// A directory browser with an editable file-name line.
///
/// Directories are always listed; files only when they match the active
/// filter. Moving through the list copies the highlighted name into the
/// input. Enter on a directory name descends into it; Enter on a file name
/// returns the path (Open requires it to exist, Save requires its folder to
/// exist). Tab cycles the filter and Esc cancels.
#[derive(Debug)]
pub struct PathDialog {
    mode: PathMode,
    dir: PathBuf,
    input: String,
    /// Char index into `input`.
    input_cursor: usize,
    filters: Vec<FileFilter>,
    filter: usize,
    entries: Vec<Entry>,
    selected: Option<usize>,
    scroll: usize,
    error: Option<String>,
    list_rect: Rect,
    cursor_cell: Option<(u16, u16)>,
}

impl PathDialog {
    #[must_use]
    pub fn new(mode: PathMode, dir: &Path, filters: &[FileFilter]) -> Self {
        let mut dialog = Self {
            mode,
            dir: dir.to_path_buf(),
            input: String::new(),
            input_cursor: 0,
            filters: filters.to_vec(),
            filter: 0,
            entries: Vec::new(),
            selected: None,
            scroll: 0,
            error: None,
            list_rect: Rect::default(),
            cursor_cell: None,
        };
        dialog.refresh();
        dialog
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn active_filter(&self) -> Option<&FileFilter> {
        self.filters.get(self.filter)
    }

    /// Listed names, directories with a trailing `/`.
    #[must_use]
    pub fn entry_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| if e.is_dir { format!("{}/", e.name) } else { e.name.clone() })
            .collect()
    }

    /// Re-read the current directory.
    fn refresh(&mut self) {
        self.entries.clear();
        self.selected = None;
        self.scroll = 0;
        if self.dir.parent().is_some() {
            self.entries.push(Entry {
                name: "..".to_string(),
                is_dir: true,
            });
        }
        let read = match fs::read_dir(&self.dir) {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), %err, "cannot list directory");
                self.error = Some(format!("{}: {err}", self.dir.display()));
                return;
            }
        };
        let filter = self.filters.get(self.filter);
        let mut listed: Vec<Entry> = read
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_dir = entry.path().is_dir();
                (is_dir || filter.is_none_or(|f| f.matches(&name))).then_some(Entry { name, is_dir })
            })
            .collect();
        listed.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())));
        self.entries.extend(listed);
    }

    fn enter_dir(&mut self, path: &Path) {
        self.dir = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.set_input(String::new());
        self.error = None;
        self.refresh();
    }

    fn set_input(&mut self, text: String) {
        self.input_cursor = text.chars().count();
        self.input = text;
    }

    fn select(&mut self, index: usize) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        let name = if entry.is_dir { format!("{}/", entry.name) } else { entry.name.clone() };
        self.selected = Some(index);
        self.set_input(name);
        let rows = usize::from(self.list_rect.height).max(1);
        if index < self.scroll {
            self.scroll = index;
        } else if index >= self.scroll + rows {
            self.scroll = index + 1 - rows;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        let next = match self.selected {
            None if delta < 0 => last,
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(last),
        };
        self.select(next);
    }

    /// `~/x` expands to the home directory; relative paths are taken from
    /// the current directory.
    fn resolve_input(&self) -> PathBuf {
        let text = self.input.trim();
        if let Some(rest) = text.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        if text == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
        self.dir.join(text)
    }

    fn accept(&mut self) -> Option<Option<PathBuf>> {
        if self.input.trim().is_empty() {
            return None;
        }
        let path = self.resolve_input();
        if path.is_dir() {
            self.enter_dir(&path);
            return None;
        }
        match self.mode {
            PathMode::Open if !path.is_file() => {
                self.error = Some(format!("{}: file not found", path.display()));
                None
            }
            PathMode::Save if !path.parent().is_some_and(Path::is_dir) => {
                self.error = Some(format!("{}: folder does not exist", path.display()));
                None
            }
            _ => Some(Some(path)),
        }
    }

    fn edit_input(&mut self, key: KeyEvent) -> bool {
        let byte_at = |s: &str, i: usize| s.char_indices().nth(i).map_or(s.len(), |(b, _)| b);
        if let Some(ch) = key.text_char() {
            let at = byte_at(&self.input, self.input_cursor);
            self.input.insert(at, ch);
            self.input_cursor += 1;
            return true;
        }
        let len = self.input.chars().count();
        match key.code {
            KeyCode::Backspace if self.input_cursor > 0 => {
                self.input_cursor -= 1;
                let at = byte_at(&self.input, self.input_cursor);
                self.input.remove(at);
            }
            KeyCode::Delete if self.input_cursor < len => {
                let at = byte_at(&self.input, self.input_cursor);
                self.input.remove(at);
            }
            KeyCode::Left => self.input_cursor = self.input_cursor.saturating_sub(1),
            KeyCode::Right => self.input_cursor = (self.input_cursor + 1).min(len),
            KeyCode::Home => self.input_cursor = 0,
            KeyCode::End => self.input_cursor = len,
            KeyCode::Backspace | KeyCode::Delete => {}
            _ => return false,
        }
        true
    }
}

impl Overlay for PathDialog {
    /// `None` when cancelled.
    type Output = Option<PathBuf>;

    fn on_event(&mut self, event: &Event) -> Option<Option<PathBuf>> {
        if let Some((x, y)) = is_click(event) {
            if !self.list_rect.contains(x, y) {
                return None;
            }
            let index = self.scroll + usize::from(y - self.list_rect.y);
            if index >= self.entries.len() {
                return None;
            }
            // A second click on the highlighted entry activates it.
            if self.selected == Some(index) {
                return self.accept();
            }
            self.select(index);
            return None;
        }

        let key = match event {
            Event::Key(key) => *key,
            Event::Paste(text) => {
                let line = text.lines().next().unwrap_or_default();
                let mut input = self.input.clone();
                input.push_str(line);
                self.set_input(input);
                return None;
            }
            Event::Mouse(_) => return None,
        };

        let page = isize::try_from(self.list_rect.height.max(1)).unwrap_or(1);
        match key.code {
            KeyCode::Escape => return Some(None),
            KeyCode::Enter => return self.accept(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-page),
            KeyCode::PageDown => self.move_selection(page),
            KeyCode::Tab if !self.filters.is_empty() => {
                let n = self.filters.len();
                self.filter = if key.has(Modifiers::SHIFT) {
                    (self.filter + n - 1) % n
                } else {
                    (self.filter + 1) % n
                };
                self.refresh();
            }
            _ => {
                if self.edit_input(key) {
                    self.selected = None;
                    self.error = None;
                }
            }
        }
        None
    }

    fn paint(&mut self, fb: &mut FrameBuffer) {
        let width = fb.width().saturating_sub(4).clamp(20, 72);
        let height = fb.height().saturating_sub(2).clamp(8, 22);
        let inner = view::render_dialog_frame(fb, width, height, self.mode.title(), DIALOG_TITLE);
        if inner.height < 5 {
            self.list_rect = Rect::default();
            self.cursor_cell = None;
            return;
        }
        let row = |n: u16| Rect::new(inner.x, inner.y + n, inner.width, 1);

        let look_in = format!("Look in: {}", self.dir.display());
        fb.paint_text(inner.x, inner.y, &look_in, DIALOG, row(0));

        self.list_rect = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 4);
        for (i, entry) in self.entries.iter().enumerate().skip(self.scroll).take(usize::from(self.list_rect.height)) {
            let r = row(1 + to_u16(i - self.scroll));
            let style = if self.selected == Some(i) { HIGHLIGHT } else { DIALOG };
            fb.fill_rect(r, ' ', style);
            let label = if entry.is_dir { format!("{}/", entry.name) } else { entry.name.clone() };
            fb.paint_text(r.x + 1, r.y, &label, style, r);
        }

        let name_y = inner.bottom() - 3;
        let prompt = "File name: ";
        let px = inner.x + fb.paint_text(inner.x, name_y, prompt, DIALOG, row(name_y - inner.y));
        let field = Rect::new(px, name_y, inner.right().saturating_sub(px), 1);
        fb.fill_rect(field, ' ', INPUT);
        let before: String = self.input.chars().take(self.input_cursor).collect();
        let before_w = to_u16(string_width(&before));
        // Keep the input cursor inside the field.
        let shift = before_w.saturating_sub(field.width.saturating_sub(1));
        let visible: String = {
            let mut skipped = 0u16;
            self.input
                .chars()
                .skip_while(|&ch| {
                    let skip = skipped < shift;
                    skipped += to_u16(quill_term::buffer::char_width(ch));
                    skip
                })
                .collect()
        };
        fb.paint_text(field.x, name_y, &visible, INPUT, field);
        self.cursor_cell = Some((field.x + before_w - shift, name_y));

        let filter = self.active_filter().map(FileFilter::label).unwrap_or_default();
        let type_line = format!("Files of type: {filter}");
        fb.paint_text(inner.x, name_y + 1, &type_line, DIALOG, row(name_y + 1 - inner.y));

        let hint_row = row(name_y + 2 - inner.y);
        match &self.error {
            Some(err) => fb.paint_text(inner.x, hint_row.y, err, ERROR_TITLE, hint_row),
            None => fb.paint_text(inner.x, hint_row.y, "Enter select  Tab type  Esc cancel", DIM, hint_row),
        };
    }

    fn cursor(&self) -> Option<CursorPlacement> {
        self.cursor_cell.map(|(x, y)| (x, y, CursorShape::SteadyBar))
    }
}

// ---------------------------------------------------------------------------
// TerminalHost
// ---------------------------------------------------------------------------

/// Runs the dialogs above as modals on a live [`Screen`].
pub struct TerminalHost<'a, 'b> {
    screen: &'a mut Screen<'b>,
    start_dir: PathBuf,
}

impl<'a, 'b> TerminalHost<'a, 'b> {
    /// File dialogs start browsing in `start_dir`.
    pub fn new(screen: &'a mut Screen<'b>, start_dir: PathBuf) -> Self {
        Self { screen, start_dir }
    }
}

impl FileDialog for TerminalHost<'_, '_> {
    fn open_file(&mut self, filters: &[FileFilter]) -> Option<PathBuf> {
        let mut dialog = PathDialog::new(PathMode::Open, &self.start_dir, filters);
        self.screen.run_modal(&mut dialog).flatten()
    }

    /// Asks before replacing an existing file. No goes back to the dialog.
    fn save_file(&mut self, filters: &[FileFilter]) -> Option<PathBuf> {
        let mut dialog = PathDialog::new(PathMode::Save, &self.start_dir, filters);
        loop {
            let path = self.screen.run_modal(&mut dialog).flatten()?;
            if !path.exists() {
                return Some(path);
            }
            let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let message = format!("{name} already exists.\nDo you want to replace it?");
            match self.ask_yes_no_cancel("Confirm Save As", &message) {
                Answer::Yes => return Some(path),
                Answer::No => {}
                Answer::Cancel => return None,
            }
        }
    }
}

impl MessagePrompt for TerminalHost<'_, '_> {
    /// A closed terminal counts as Cancel.
    fn ask_yes_no_cancel(&mut self, title: &str, message: &str) -> Answer {
        let mut dialog = QuestionBox::new(title, message);
        self.screen.run_modal(&mut dialog).unwrap_or(Answer::Cancel)
    }

    fn show_error(&mut self, title: &str, message: &str) {
        let mut dialog = MessageBox::new(MessageKind::Error, title, message);
        self.screen.run_modal(&mut dialog);
    }

    fn show_info(&mut self, title: &str, message: &str) {
        let mut dialog = MessageBox::new(MessageKind::Info, title, message);
        self.screen.run_modal(&mut dialog);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
