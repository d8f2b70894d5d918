// SPDX-License-Identifier: MIT
//
// The Editor: quill-editor's pieces behind quill-term's App trait.
//
// Every input event flows through one router:
//
//   key   → menu bar (if open, or F10 / Alt+letter) → shortcut table → text area
//   mouse → menu bar → text area click / wheel
//   paste → text area
//
// Menu items and shortcuts both resolve to a CommandId, and DISPATCH maps
// each id to exactly one handler. After every event the text area's change
// signal is forwarded to the document session, which owns the dirty flag.
//
// Dialogs run as modal overlays through a TerminalHost built around the
// event loop's Screen for the duration of one event.

use std::env;
use std::path::{Path, PathBuf};

use quill_editor::dialog::TerminalHost;
use quill_editor::menu::{CommandId, MenuResult, MenuState, command_for_key};
use quill_editor::options::Options;
use quill_editor::prompt::Host;
use quill_editor::session::{DocumentSession, Guard};
use quill_editor::surface::{TextArea, TextSurface};
use quill_editor::view::{self, Layout, TextView};

use quill_term::ansi::CursorShape;
use quill_term::buffer::FrameBuffer;
use quill_term::event_loop::{Action, App, CursorPlacement, Screen};
use quill_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use quill_term::terminal::Size;
use tracing::{debug, info};

/// Lines moved per mouse-wheel notch.
const WHEEL_LINES: usize = 3;

// ─── Dispatch table ─────────────────────────────────────────────────────────

type Handler = fn(&mut Editor, &mut dyn Host) -> Action;

const DISPATCH: &[(CommandId, Handler)] = &[
    (CommandId::New, Editor::cmd_new),
    (CommandId::Open, Editor::cmd_open),
    (CommandId::Save, Editor::cmd_save),
    (CommandId::SaveAs, Editor::cmd_save_as),
    (CommandId::Exit, Editor::cmd_exit),
    (CommandId::Undo, Editor::cmd_undo),
    (CommandId::Redo, Editor::cmd_redo),
    (CommandId::Cut, Editor::cmd_cut),
    (CommandId::Copy, Editor::cmd_copy),
    (CommandId::Paste, Editor::cmd_paste),
    (CommandId::SelectAll, Editor::cmd_select_all),
    (CommandId::About, Editor::cmd_about),
];

// ─── Editor ─────────────────────────────────────────────────────────────────

pub struct Editor {
    options: Options,
    session: DocumentSession,
    area: TextArea,
    view: TextView,
    menus: MenuState,
    /// Layout of the last painted frame; mouse hits are resolved against it.
    layout: Layout,
    /// File named on the command line, loaded by `on_start`.
    startup_path: Option<PathBuf>,
    cursor_screen: Option<(u16, u16)>,
}

impl Editor {
    pub fn new(options: Options, startup_path: Option<PathBuf>) -> Self {
        let session = DocumentSession::new(&options);
        Self {
            options,
            session,
            area: TextArea::new(),
            view: TextView::new(),
            menus: MenuState::new(),
            layout: Layout::new(0, 0),
            startup_path,
            cursor_screen: None,
        }
    }

    /// `*Quill - notes.txt`.
    pub fn window_title(&self) -> String {
        self.session.title(&self.options.app_name)
    }

    /// Where file dialogs start: the current file's folder, else the
    /// working directory.
    fn start_dir(&self) -> PathBuf {
        self.session
            .current_path()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load the command-line file, if any. A failure is reported like a
    /// failed File > Open and leaves an untitled document.
    fn load_startup_file(&mut self, host: &mut dyn Host) {
        let Some(path) = self.startup_path.take() else {
            return;
        };
        if let Err(err) = self.session.load(&path, &mut self.area) {
            host.show_error("Error", &format!("Could not open file:\n{err}"));
        }
    }

    // ── Routing ──────────────────────────────────────────────────────────

    fn handle_event(&mut self, event: &Event, host: &mut dyn Host) -> Action {
        let action = match event {
            Event::Key(key) => self.handle_key(*key, host),
            Event::Mouse(mouse) => self.handle_mouse(*mouse, host),
            Event::Paste(text) => {
                if !self.menus.is_open() {
                    self.area.insert_text(text);
                }
                Action::Continue
            }
        };
        self.sync_modified();
        action
    }

    fn handle_key(&mut self, key: KeyEvent, host: &mut dyn Host) -> Action {
        match self.menus.handle_key(key) {
            MenuResult::Run(command) => return self.run_command(command, host),
            MenuResult::Consumed => return Action::Continue,
            MenuResult::Ignored => {}
        }
        if let Some(command) = command_for_key(key) {
            return self.run_command(command, host);
        }
        self.area.handle_key(key);
        Action::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, host: &mut dyn Host) -> Action {
        match self.menus.handle_mouse(mouse) {
            MenuResult::Run(command) => return self.run_command(command, host),
            MenuResult::Consumed => return Action::Continue,
            MenuResult::Ignored => {}
        }
        match mouse.kind {
            MouseEventKind::Press(MouseButton::Left) => {
                let tab_width = self.options.tab_width();
                let hit = self
                    .view
                    .position_at(&self.area, self.layout.text, mouse.x, mouse.y, tab_width);
                if let Some(pos) = hit {
                    self.area.click(pos, mouse.modifiers.contains(Modifiers::SHIFT));
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let code = if mouse.kind == MouseEventKind::ScrollUp {
                    KeyCode::Up
                } else {
                    KeyCode::Down
                };
                for _ in 0..WHEEL_LINES {
                    self.area.handle_key(KeyEvent::plain(code));
                }
            }
            MouseEventKind::Press(_) | MouseEventKind::Release(_) => {}
        }
        Action::Continue
    }

    /// Forward the text area's change signal to the session.
    fn sync_modified(&mut self) {
        if self.area.take_change() {
            self.session.on_text_changed();
        }
    }

    fn run_command(&mut self, command: CommandId, host: &mut dyn Host) -> Action {
        debug!(?command, "command");
        let action = match DISPATCH.iter().find(|(id, _)| *id == command) {
            Some(&(_, handler)) => handler(self, host),
            None => Action::Continue,
        };
        self.sync_modified();
        action
    }

    // ── Command handlers ─────────────────────────────────────────────────

    fn cmd_new(&mut self, host: &mut dyn Host) -> Action {
        self.session.new_document(&mut self.area, host);
        Action::Continue
    }

    fn cmd_open(&mut self, host: &mut dyn Host) -> Action {
        self.session.open_document(&mut self.area, host);
        Action::Continue
    }

    fn cmd_save(&mut self, host: &mut dyn Host) -> Action {
        self.session.save(&self.area, host);
        Action::Continue
    }

    fn cmd_save_as(&mut self, host: &mut dyn Host) -> Action {
        self.session.save_as(&self.area, host);
        Action::Continue
    }

    fn cmd_exit(&mut self, host: &mut dyn Host) -> Action {
        match self.session.request_close(&self.area, host) {
            Guard::Proceed => {
                info!("exiting");
                Action::Quit
            }
            Guard::Abort => Action::Continue,
        }
    }

    fn cmd_undo(&mut self, _host: &mut dyn Host) -> Action {
        self.area.undo();
        Action::Continue
    }

    fn cmd_redo(&mut self, _host: &mut dyn Host) -> Action {
        self.area.redo();
        Action::Continue
    }

    fn cmd_cut(&mut self, _host: &mut dyn Host) -> Action {
        self.area.cut();
        Action::Continue
    }

    fn cmd_copy(&mut self, _host: &mut dyn Host) -> Action {
        self.area.copy();
        Action::Continue
    }

    fn cmd_paste(&mut self, _host: &mut dyn Host) -> Action {
        self.area.paste();
        Action::Continue
    }

    fn cmd_select_all(&mut self, _host: &mut dyn Host) -> Action {
        self.area.select_all();
        Action::Continue
    }

    fn cmd_about(&mut self, host: &mut dyn Host) -> Action {
        let app = &self.options.app_name;
        let version = env!("CARGO_PKG_VERSION");
        host.show_info(
            &format!("About {app}"),
            &format!("{app} Version {version}\n\nA minimal terminal text editor."),
        );
        Action::Continue
    }
}

// ─── App implementation ─────────────────────────────────────────────────────

impl App for Editor {
    fn on_start(&mut self, screen: &mut Screen<'_>) -> Action {
        let start_dir = self.start_dir();
        let mut host = TerminalHost::new(screen, start_dir);
        self.load_startup_file(&mut host);
        Action::Continue
    }

    fn on_event(&mut self, event: &Event, screen: &mut Screen<'_>) -> Action {
        let start_dir = self.start_dir();
        let mut host = TerminalHost::new(screen, start_dir);
        self.handle_event(event, &mut host)
    }

    fn on_resize(&mut self, size: Size) {
        self.layout = Layout::new(size.cols, size.rows);
        self.area.set_page_rows(usize::from(self.layout.text.height));
    }

    fn on_tick(&mut self) -> bool {
        self.session.status_mut().expire()
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.layout = Layout::new(frame.width(), frame.height());
        self.area.set_page_rows(usize::from(self.layout.text.height));

        self.cursor_screen = self.view.render(
            frame,
            &self.area,
            self.layout.text,
            self.options.tab_width(),
            self.options.scroll_margin,
        );

        let title = self.window_title();
        view::render_menu_bar(frame, self.layout.menu_bar, &self.menus, &title);
        view::render_status(
            frame,
            self.layout.status,
            self.session.status().visible(),
            self.area.cursor().position(),
        );
        view::render_menu_dropdown(frame, &self.menus);
    }

    fn cursor(&self) -> Option<CursorPlacement> {
        if self.menus.is_open() {
            return None;
        }
        self.cursor_screen.map(|(x, y)| (x, y, CursorShape::SteadyBar))
    }

    fn title(&self) -> Option<String> {
        Some(self.window_title())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_editor::prompt::{Answer, FileDialog, FileFilter, MessagePrompt};
    use std::collections::{HashSet, VecDeque};
    use std::fs;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────

    /// A host that replays scripted answers and records what it was asked.
    #[derive(Default)]
    struct Script {
        answers: VecDeque<Answer>,
        open_paths: VecDeque<PathBuf>,
        save_paths: VecDeque<PathBuf>,
        questions: Vec<String>,
        errors: Vec<String>,
        infos: Vec<(String, String)>,
    }

    impl FileDialog for Script {
        fn open_file(&mut self, _filters: &[FileFilter]) -> Option<PathBuf> {
            self.open_paths.pop_front()
        }

        fn save_file(&mut self, _filters: &[FileFilter]) -> Option<PathBuf> {
            self.save_paths.pop_front()
        }
    }

    impl MessagePrompt for Script {
        fn ask_yes_no_cancel(&mut self, title: &str, _message: &str) -> Answer {
            self.questions.push(title.to_string());
            self.answers.pop_front().unwrap_or(Answer::Cancel)
        }

        fn show_error(&mut self, _title: &str, message: &str) {
            self.errors.push(message.to_string());
        }

        fn show_info(&mut self, title: &str, message: &str) {
            self.infos.push((title.to_string(), message.to_string()));
        }
    }

    fn editor() -> Editor {
        Editor::new(Options::default(), None)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn ctrl(ch: char) -> Event {
        Event::Key(KeyEvent::ctrl(ch))
    }

    fn type_text(e: &mut Editor, host: &mut Script, text: &str) {
        for ch in text.chars() {
            e.handle_event(&key(KeyCode::Char(ch)), host);
        }
    }

    fn text(e: &Editor) -> String {
        e.area.text()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn every_command_has_exactly_one_handler() {
        let ids: Vec<CommandId> = DISPATCH.iter().map(|(id, _)| *id).collect();
        let unique: HashSet<CommandId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        for command in CommandId::ALL {
            assert!(unique.contains(&command), "{command:?} has no handler");
        }
    }

    // ── Dirty tracking and title ──────────────────────────────────────────

    #[test]
    fn typing_marks_dirty_and_title_follows() {
        let mut e = editor();
        let mut host = Script::default();
        assert_eq!(e.window_title(), "Quill - Untitled");
        type_text(&mut e, &mut host, "hi");
        assert!(e.session.is_modified());
        assert_eq!(e.window_title(), "*Quill - Untitled");
    }

    #[test]
    fn navigation_does_not_dirty() {
        let mut e = editor();
        let mut host = Script::default();
        e.handle_event(&key(KeyCode::Right), &mut host);
        e.handle_event(&ctrl('a'), &mut host);
        e.handle_event(&ctrl('c'), &mut host);
        assert!(!e.session.is_modified());
    }

    #[test]
    fn undo_back_to_saved_text_stays_dirty() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "abc");
        e.handle_event(&ctrl('z'), &mut host);
        assert_eq!(text(&e), "");
        assert!(e.session.is_modified());
        e.handle_event(&ctrl('y'), &mut host);
        assert_eq!(text(&e), "abc");
    }

    // ── File commands ─────────────────────────────────────────────────────

    #[test]
    fn ctrl_s_on_untitled_saves_as() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let mut e = editor();
        let mut host = Script::default();
        host.save_paths.push_back(path.clone());

        type_text(&mut e, &mut host, "hello");
        e.handle_event(&ctrl('s'), &mut host);

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert!(!e.session.is_modified());
        assert_eq!(e.window_title(), "Quill - a.txt");
        assert!(host.questions.is_empty());
    }

    #[test]
    fn save_as_shortcut_variants() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("one.txt");
        let second = dir.path().join("two.txt");
        let mut e = editor();
        let mut host = Script::default();
        host.save_paths.push_back(first.clone());
        host.save_paths.push_back(second.clone());

        type_text(&mut e, &mut host, "x");
        e.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('S'), Modifiers::CTRL)), &mut host);
        e.handle_event(&key(KeyCode::F(12)), &mut host);

        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(e.session.current_path(), Some(second.as_path()));
    }

    #[test]
    fn open_replaces_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.txt");
        fs::write(&path, "from disk").unwrap();
        let mut e = editor();
        let mut host = Script::default();
        host.open_paths.push_back(path);

        e.handle_event(&ctrl('o'), &mut host);
        assert_eq!(text(&e), "from disk");
        assert!(!e.session.is_modified());
    }

    #[test]
    fn new_while_dirty_cancel_keeps_everything() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "keep");
        host.answers.push_back(Answer::Cancel);

        e.handle_event(&ctrl('n'), &mut host);
        assert_eq!(host.questions, ["Unsaved Changes"]);
        assert_eq!(text(&e), "keep");
        assert!(e.session.is_modified());
    }

    #[test]
    fn exit_clean_quits_without_asking() {
        let mut e = editor();
        let mut host = Script::default();
        assert_eq!(e.handle_event(&ctrl('q'), &mut host), Action::Quit);
        assert!(host.questions.is_empty());
    }

    #[test]
    fn exit_dirty_respects_answer() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "x");

        host.answers.push_back(Answer::Cancel);
        assert_eq!(e.handle_event(&ctrl('q'), &mut host), Action::Continue);

        host.answers.push_back(Answer::No);
        assert_eq!(e.handle_event(&ctrl('q'), &mut host), Action::Quit);
    }

    #[test]
    fn startup_file_loads_or_reports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("start.txt");
        fs::write(&path, "boot").unwrap();
        let mut host = Script::default();

        let mut e = Editor::new(Options::default(), Some(path));
        e.load_startup_file(&mut host);
        assert_eq!(text(&e), "boot");
        assert_eq!(e.window_title(), "Quill - start.txt");

        let mut e = Editor::new(Options::default(), Some(dir.path().join("missing.txt")));
        e.load_startup_file(&mut host);
        assert_eq!(host.errors.len(), 1);
        assert!(host.errors[0].starts_with("Could not open file:"));
        assert_eq!(e.window_title(), "Quill - Untitled");
    }

    // ── Edit commands ─────────────────────────────────────────────────────

    #[test]
    fn clipboard_round_trip_through_shortcuts() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "ab");
        e.handle_event(&ctrl('a'), &mut host);
        e.handle_event(&ctrl('x'), &mut host);
        assert_eq!(text(&e), "");
        e.handle_event(&ctrl('v'), &mut host);
        e.handle_event(&ctrl('v'), &mut host);
        assert_eq!(text(&e), "abab");
    }

    #[test]
    fn bracketed_paste_inserts_text() {
        let mut e = editor();
        let mut host = Script::default();
        e.handle_event(&Event::Paste("pasted".to_string()), &mut host);
        assert_eq!(text(&e), "pasted");
        assert!(e.session.is_modified());
    }

    // ── Menus ─────────────────────────────────────────────────────────────

    #[test]
    fn menu_keys_run_commands() {
        let mut e = editor();
        let mut host = Script::default();
        e.handle_event(&key(KeyCode::F(10)), &mut host);
        assert!(e.menus.is_open());
        // Typed letters go to the open menu, not the text.
        e.handle_event(&key(KeyCode::Char('z')), &mut host);
        assert_eq!(text(&e), "");

        e.handle_event(&Event::Key(KeyEvent::alt('h')), &mut host);
        e.handle_event(&key(KeyCode::Enter), &mut host);
        assert!(!e.menus.is_open());
        assert_eq!(host.infos.len(), 1);
        assert_eq!(host.infos[0].0, "About Quill");
        assert!(host.infos[0].1.starts_with(&format!("Quill Version {}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn file_menu_mnemonic_exits() {
        let mut e = editor();
        let mut host = Script::default();
        e.handle_event(&Event::Key(KeyEvent::alt('f')), &mut host);
        assert_eq!(e.handle_event(&key(KeyCode::Char('x')), &mut host), Action::Quit);
    }

    #[test]
    fn f1_shows_about() {
        let mut e = editor();
        let mut host = Script::default();
        e.handle_event(&key(KeyCode::F(1)), &mut host);
        assert_eq!(host.infos.len(), 1);
    }

    // ── Mouse and painting ────────────────────────────────────────────────

    fn left_click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            x,
            y,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn click_places_cursor() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "hello");
        let mut frame = FrameBuffer::new(40, 10);
        e.paint(&mut frame);

        e.handle_event(&left_click(2, 1), &mut host);
        assert_eq!(e.area.cursor().position().col, 2);
    }

    #[test]
    fn click_on_menu_title_opens_menu() {
        let mut e = editor();
        let mut host = Script::default();
        let mut frame = FrameBuffer::new(40, 10);
        e.paint(&mut frame);
        e.handle_event(&left_click(7, 0), &mut host);
        assert_eq!(e.menus.selected().map(|(m, _)| m), Some(1));
        assert_eq!(App::cursor(&e), None);
    }

    #[test]
    fn paint_shows_title_text_and_status() {
        let mut e = editor();
        let mut host = Script::default();
        type_text(&mut e, &mut host, "hello");
        let mut frame = FrameBuffer::new(40, 6);
        e.paint(&mut frame);

        assert!(frame.row_text(0).contains("*Quill - Untitled"));
        assert_eq!(frame.row_text(1).trim_end(), "hello");
        let status = frame.row_text(5);
        assert!(status.contains("Ready"));
        assert!(status.contains("Ln 1, Col 6"));
        assert_eq!(App::cursor(&e), Some((5, 1, CursorShape::SteadyBar)));
        assert_eq!(App::title(&e).as_deref(), Some("*Quill - Untitled"));
    }
}
