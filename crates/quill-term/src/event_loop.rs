// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, frames out.
//
// Bytes from the background reader are parsed into events and handed to the
// application, which paints a frame buffer; the diff renderer writes only
// what changed. The loop blocks on the reader channel with a short timeout:
// input is handled as soon as it arrives, an idle editor costs no CPU, and
// the timeout doubles as the deadline for resolving a lone ESC.
//
// # Modal overlays
//
// A dialog such as "Save changes?" must block the caller until answered,
// so the app calls `Screen::run_modal` from inside `on_event`. That runs a
// nested loop on the same reader and renderer: the overlay receives every
// event and is painted over a copy of the app's last frame, until it
// produces an answer. Events parsed from the same read as the one that
// opened the dialog are queued, so type-ahead goes to the dialog.
//
// # Resize
//
// SIGWINCH sets an `AtomicBool`; each loop iteration checks it, resizes the
// frame and forces a full redraw.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{self, Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
const fn install_sigwinch_handler() {}

// ─── App & Overlay ───────────────────────────────────────────────────────────

/// What the application wants after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Hardware cursor placement: column, row, shape.
pub type CursorPlacement = (u16, u16, CursorShape);

/// A full-screen terminal application.
///
/// After the first frame the loop calls [`on_start`](App::on_start) once.
/// Per iteration it calls [`on_event`](App::on_event) for the next
/// event, [`on_resize`](App::on_resize) if the size changed,
/// [`on_tick`](App::on_tick), and then, when anything changed,
/// [`paint`](App::paint), [`cursor`](App::cursor) and [`title`](App::title).
pub trait App {
    /// Called once after the first frame is on screen, before any input.
    /// `screen` can run blocking dialogs, e.g. to report a startup error.
    fn on_start(&mut self, _screen: &mut Screen<'_>) -> Action {
        Action::Continue
    }

    /// Handle one input event. `screen` can run blocking dialogs.
    fn on_event(&mut self, event: &Event, screen: &mut Screen<'_>) -> Action;

    /// The frame buffer has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Called every iteration. Return `true` to request a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Paint the whole UI. The buffer is cleared first.
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<CursorPlacement> {
        None
    }

    /// Window title. Written to the terminal only when it changes.
    fn title(&self) -> Option<String> {
        None
    }
}

/// A blocking dialog run by [`Screen::run_modal`].
pub trait Overlay {
    type Output;

    /// Handle an event. Return `Some` to close the dialog with that result.
    fn on_event(&mut self, event: &Event) -> Option<Self::Output>;

    /// Paint over the app's last frame.
    fn paint(&mut self, buf: &mut FrameBuffer);

    fn cursor(&self) -> Option<CursorPlacement> {
        None
    }
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Event loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Channel receive timeout in microseconds. Also the ESC timeout.
    pub tick_interval_us: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 8333, // 120 Hz
        }
    }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

enum Input {
    Event(Event),
    Idle,
    Closed,
}

/// The state shared by the main loop and every nested modal loop.
struct Driver {
    rx: Receiver<Vec<u8>>,
    parser: Parser,
    queue: VecDeque<Event>,
    renderer: DiffRenderer,
    out: Box<dyn Write>,
    timeout: Duration,
    frame: FrameBuffer,
    /// The app's last painted frame; modals paint over a copy of it.
    backdrop: FrameBuffer,
    last_title: Option<String>,
    closed: bool,
    error: Option<io::Error>,
}

impl Driver {
    fn new(rx: Receiver<Vec<u8>>, size: Size, config: LoopConfig, out: Box<dyn Write>) -> Self {
        Self {
            rx,
            parser: Parser::new(),
            queue: VecDeque::new(),
            renderer: DiffRenderer::new(),
            out,
            timeout: Duration::from_micros(config.tick_interval_us),
            frame: FrameBuffer::new(size.cols, size.rows),
            backdrop: FrameBuffer::new(size.cols, size.rows),
            last_title: None,
            closed: false,
            error: None,
        }
    }

    fn size(&self) -> Size {
        Size {
            cols: self.frame.width(),
            rows: self.frame.height(),
        }
    }

    /// Next queued event, or wait up to one tick for more bytes.
    fn poll(&mut self) -> Input {
        if let Some(event) = self.queue.pop_front() {
            return Input::Event(event);
        }
        match self.rx.recv_timeout(self.timeout) {
            Ok(bytes) => self.queue.extend(self.parser.advance(&bytes)),
            Err(RecvTimeoutError::Timeout) => {
                if self.parser.has_pending() {
                    self.queue.extend(self.parser.flush());
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                return Input::Closed;
            }
        }
        self.queue.pop_front().map_or(Input::Idle, Input::Event)
    }

    fn check_resize(&mut self) -> Option<Size> {
        if !SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
            return None;
        }
        let size = terminal::get_size()?;
        self.frame.resize(size.cols, size.rows);
        self.backdrop.resize(size.cols, size.rows);
        self.renderer.force_redraw();
        Some(size)
    }

    fn present_app(&mut self, app: &mut impl App) -> io::Result<()> {
        self.frame.clear();
        app.paint(&mut self.frame);
        self.backdrop.copy_from(&self.frame);

        let title = app.title();
        if title.is_some() && title != self.last_title {
            if let Some(t) = &title {
                ansi::set_title(&mut self.out, t)?;
            }
            self.last_title = title;
        }
        self.present(app.cursor())
    }

    fn present_overlay<O: Overlay + ?Sized>(&mut self, overlay: &mut O) -> io::Result<()> {
        self.frame.copy_from(&self.backdrop);
        overlay.paint(&mut self.frame);
        self.present(overlay.cursor())
    }

    fn present(&mut self, cursor: Option<CursorPlacement>) -> io::Result<()> {
        self.renderer.render(&self.frame);
        self.renderer.flush_to(&mut self.out)?;
        match cursor {
            Some((x, y, shape)) => {
                ansi::cursor_to(&mut self.out, x, y)?;
                ansi::set_cursor_shape(&mut self.out, shape)?;
                ansi::cursor_show(&mut self.out)?;
            }
            None => ansi::cursor_hide(&mut self.out)?,
        }
        self.out.flush()
    }

    fn run_app(&mut self, app: &mut impl App) -> io::Result<()> {
        self.present_app(app)?;
        let action = app.on_start(&mut Screen { driver: self });
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if action == Action::Quit || self.closed {
            return Ok(());
        }
        self.present_app(app)?;
        loop {
            let mut dirty = false;
            match self.poll() {
                Input::Event(event) => {
                    let action = app.on_event(&event, &mut Screen { driver: self });
                    if let Some(err) = self.error.take() {
                        return Err(err);
                    }
                    if action == Action::Quit || self.closed {
                        return Ok(());
                    }
                    dirty = true;
                }
                Input::Idle => {}
                Input::Closed => return Ok(()),
            }
            if let Some(size) = self.check_resize() {
                app.on_resize(size);
                dirty = true;
            }
            if app.on_tick() {
                dirty = true;
            }
            if dirty {
                self.present_app(app)?;
            }
        }
    }

    fn run_modal<O: Overlay + ?Sized>(&mut self, overlay: &mut O) -> io::Result<Option<O::Output>> {
        self.present_overlay(overlay)?;
        loop {
            let mut dirty = false;
            match self.poll() {
                Input::Event(event) => {
                    if let Some(output) = overlay.on_event(&event) {
                        return Ok(Some(output));
                    }
                    dirty = true;
                }
                Input::Idle => {}
                Input::Closed => return Ok(None),
            }
            if self.check_resize().is_some() {
                dirty = true;
            }
            if dirty {
                self.present_overlay(overlay)?;
            }
        }
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// The app's handle on the running loop during [`App::on_event`].
pub struct Screen<'a> {
    driver: &'a mut Driver,
}

impl Screen<'_> {
    /// Terminal size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.driver.size()
    }

    /// Run `overlay` until it produces a result.
    ///
    /// Returns `None` if input closed or the terminal failed; the loop exits
    /// (and reports any error) once the current event handler returns. A
    /// caller should treat `None` as the dialog being cancelled.
    pub fn run_modal<O: Overlay + ?Sized>(&mut self, overlay: &mut O) -> Option<O::Output> {
        if self.driver.closed || self.driver.error.is_some() {
            return None;
        }
        match self.driver.run_modal(overlay) {
            Ok(output) => output,
            Err(err) => {
                self.driver.error = Some(err);
                None
            }
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal and runs an [`App`] until it quits.
///
/// ```no_run
/// use quill_term::buffer::FrameBuffer;
/// use quill_term::event_loop::{Action, App, EventLoop, Screen};
/// use quill_term::input::{Event, KeyCode, KeyEvent};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &Event, _screen: &mut Screen<'_>) -> Action {
///         match event {
///             Event::Key(KeyEvent { code: KeyCode::Char('q'), .. }) => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, buf: &mut FrameBuffer) {
///         let bounds = buf.bounds();
///         buf.paint_text(0, 0, "hello", Default::default(), bounds);
///     }
/// }
///
/// EventLoop::new().run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run `app` until it quits, restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be set up or restored, the
    /// reader thread can't start, or writing a frame fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let out = Box::new(io::stdout());
                let mut driver = Driver::new(rx, self.terminal.size(), self.config, out);
                let result = driver.run_app(app);
                reader.stop();
                result
            }
            Err(err) => Err(err),
        };

        self.terminal.leave()?;
        result
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Style;
    use crate::input::{KeyCode, KeyEvent};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    /// A `Write` sink the test can inspect after the driver is done.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    fn driver(input: &[&str]) -> (Driver, Sink) {
        let (tx, rx) = mpsc::channel();
        for chunk in input {
            tx.send(chunk.as_bytes().to_vec()).unwrap();
        }
        drop(tx);
        let sink = Sink::default();
        let config = LoopConfig {
            tick_interval_us: 1000,
        };
        let d = Driver::new(rx, Size { cols: 20, rows: 5 }, config, Box::new(sink.clone()));
        (d, sink)
    }

    /// Collects typed characters, quits on `q`, asks a yes/no modal on `?`.
    #[derive(Default)]
    struct Recorder {
        typed: String,
        answers: Vec<Option<bool>>,
    }

    struct YesNo;

    impl Overlay for YesNo {
        type Output = bool;
        fn on_event(&mut self, event: &Event) -> Option<bool> {
            match event {
                Event::Key(KeyEvent { code: KeyCode::Char('y'), .. }) => Some(true),
                Event::Key(KeyEvent { code: KeyCode::Char('n'), .. }) => Some(false),
                _ => None,
            }
        }
        fn paint(&mut self, buf: &mut FrameBuffer) {
            let bounds = buf.bounds();
            buf.paint_text(0, 2, "Sure?", Style::PLAIN, bounds);
        }
    }

    impl App for Recorder {
        fn on_event(&mut self, event: &Event, screen: &mut Screen<'_>) -> Action {
            if let Event::Key(KeyEvent { code: KeyCode::Char(ch), .. }) = event {
                match ch {
                    'q' => return Action::Quit,
                    '?' => self.answers.push(screen.run_modal(&mut YesNo)),
                    _ => self.typed.push(*ch),
                }
            }
            Action::Continue
        }
        fn paint(&mut self, buf: &mut FrameBuffer) {
            let bounds = buf.bounds();
            buf.paint_text(0, 0, &self.typed, Style::PLAIN, bounds);
        }
        fn title(&self) -> Option<String> {
            Some(format!("typed {}", self.typed.len()))
        }
    }

    #[test]
    fn app_receives_events_until_quit() {
        let (mut d, sink) = driver(&["ab", "cq", "zz"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        assert_eq!(app.typed, "abc");
        assert!(sink.text().contains('c'));
    }

    #[test]
    fn closed_input_ends_loop() {
        let (mut d, _) = driver(&["xy"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        assert_eq!(app.typed, "xy");
    }

    #[test]
    fn modal_consumes_queued_events() {
        // The 'n' arrives in the same read as '?', so it answers the dialog.
        let (mut d, sink) = driver(&["?nk", "q"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        assert_eq!(app.answers, [Some(false)]);
        assert_eq!(app.typed, "k");
        assert!(sink.text().contains("Sure?"));
    }

    #[test]
    fn modal_ignores_unrelated_keys() {
        let (mut d, _) = driver(&["?", "abc", "y", "q"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        assert_eq!(app.answers, [Some(true)]);
        assert_eq!(app.typed, "");
    }

    #[test]
    fn modal_returns_none_when_input_closes() {
        let (mut d, _) = driver(&["?"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        assert_eq!(app.answers, [None]);
    }

    #[test]
    fn title_written_only_on_change() {
        let (mut d, sink) = driver(&["a", "\x1b[A", "q"]);
        let mut app = Recorder::default();
        d.run_app(&mut app).unwrap();
        let out = sink.text();
        assert_eq!(out.matches("\x1b]2;typed 0\x07").count(), 1);
        assert_eq!(out.matches("\x1b]2;typed 1\x07").count(), 1);
    }

    #[test]
    fn lone_escape_flushed_after_timeout() {
        struct EscQuits;
        impl App for EscQuits {
            fn on_event(&mut self, event: &Event, _: &mut Screen<'_>) -> Action {
                if *event == Event::Key(KeyEvent::plain(KeyCode::Escape)) {
                    Action::Quit
                } else {
                    Action::Continue
                }
            }
            fn paint(&mut self, _: &mut FrameBuffer) {}
        }
        let (tx, rx) = mpsc::channel();
        tx.send(b"\x1b".to_vec()).unwrap();
        let config = LoopConfig {
            tick_interval_us: 1000,
        };
        let mut d = Driver::new(rx, Size { cols: 4, rows: 2 }, config, Box::new(Sink::default()));
        d.run_app(&mut EscQuits).unwrap();
        // The sender is still alive, so only the ESC timeout can have ended the loop.
        drop(tx);
    }

    #[test]
    fn on_start_can_run_a_modal_before_input() {
        struct AsksFirst(Option<bool>);
        impl App for AsksFirst {
            fn on_start(&mut self, screen: &mut Screen<'_>) -> Action {
                self.0 = screen.run_modal(&mut YesNo);
                Action::Continue
            }
            fn on_event(&mut self, _: &Event, _: &mut Screen<'_>) -> Action {
                Action::Quit
            }
            fn paint(&mut self, _: &mut FrameBuffer) {}
        }
        let (mut d, sink) = driver(&["y", "x"]);
        let mut app = AsksFirst(None);
        d.run_app(&mut app).unwrap();
        assert_eq!(app.0, Some(true));
        assert!(sink.text().contains("Sure?"));
    }

    #[test]
    fn default_config_is_120hz() {
        assert_eq!(LoopConfig::default().tick_interval_us, 8333);
    }
}
