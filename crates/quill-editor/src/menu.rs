//! Menus, command identifiers and keyboard shortcuts.
//!
//! The menu bar is static data: three [`Menu`]s of [`MenuItem`]s, each item
//! naming a [`CommandId`]. The binary maps every command id to exactly one
//! handler, so a menu click and its shortcut run the same code.
//!
//! Labels carry `&` before their mnemonic letter (`E&xit`). Alt+letter opens
//! a menu by its mnemonic, and inside an open menu the plain letter runs the
//! item.
//!
//! [`MenuState`] is the open/closed state of the bar plus the highlighted
//! item, and turns keys and clicks into [`MenuResult`]s.

use quill_term::buffer::{Rect, string_width};
use quill_term::input::{KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    New,
    Open,
    Save,
    SaveAs,
    Exit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    About,
}

impl CommandId {
    pub const ALL: [Self; 12] = [
        Self::New,
        Self::Open,
        Self::Save,
        Self::SaveAs,
        Self::Exit,
        Self::Undo,
        Self::Redo,
        Self::Cut,
        Self::Copy,
        Self::Paste,
        Self::SelectAll,
        Self::About,
    ];
}

// ---------------------------------------------------------------------------
// Menu data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Command {
        label: &'static str,
        command: CommandId,
        shortcut: &'static str,
    },
    Separator,
}

impl MenuItem {
    #[must_use]
    pub const fn command(self) -> Option<CommandId> {
        match self {
            Self::Command { command, .. } => Some(command),
            Self::Separator => None,
        }
    }
}

#[derive(Debug)]
pub struct Menu {
    pub label: &'static str,
    pub items: &'static [MenuItem],
}

const fn item(label: &'static str, command: CommandId, shortcut: &'static str) -> MenuItem {
    MenuItem::Command {
        label,
        command,
        shortcut,
    }
}

pub static MENUS: [Menu; 3] = [
    Menu {
        label: "&File",
        items: &[
            item("&New", CommandId::New, "Ctrl+N"),
            item("&Open...", CommandId::Open, "Ctrl+O"),
            MenuItem::Separator,
            item("&Save", CommandId::Save, "Ctrl+S"),
            item("Save &As...", CommandId::SaveAs, "Ctrl+Shift+S"),
            MenuItem::Separator,
            item("E&xit", CommandId::Exit, "Ctrl+Q"),
        ],
    },
    Menu {
        label: "&Edit",
        items: &[
            item("&Undo", CommandId::Undo, "Ctrl+Z"),
            item("&Redo", CommandId::Redo, "Ctrl+Y"),
            MenuItem::Separator,
            item("Cu&t", CommandId::Cut, "Ctrl+X"),
            item("&Copy", CommandId::Copy, "Ctrl+C"),
            item("&Paste", CommandId::Paste, "Ctrl+V"),
            MenuItem::Separator,
            item("Select &All", CommandId::SelectAll, "Ctrl+A"),
        ],
    },
    Menu {
        label: "&Help",
        items: &[item("&About", CommandId::About, "F1")],
    },
];

/// The lowercase letter after `&`, if any.
#[must_use]
pub fn mnemonic(label: &str) -> Option<char> {
    let (_, rest) = label.split_once('&')?;
    rest.chars().next().map(|c| c.to_ascii_lowercase())
}

/// The label as displayed, without the `&`.
#[must_use]
pub fn display_label(label: &str) -> String {
    label.replacen('&', "", 1)
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

const fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::ctrl(ch)
}

const SHORTCUTS: &[(KeyEvent, CommandId)] = &[
    (ctrl('n'), CommandId::New),
    (ctrl('o'), CommandId::Open),
    (ctrl('s'), CommandId::Save),
    (
        KeyEvent::new(KeyCode::Char('s'), Modifiers::CTRL.union(Modifiers::SHIFT)),
        CommandId::SaveAs,
    ),
    (KeyEvent::plain(KeyCode::F(12)), CommandId::SaveAs),
    (ctrl('q'), CommandId::Exit),
    (ctrl('z'), CommandId::Undo),
    (ctrl('y'), CommandId::Redo),
    (ctrl('x'), CommandId::Cut),
    (ctrl('c'), CommandId::Copy),
    (ctrl('v'), CommandId::Paste),
    (ctrl('a'), CommandId::SelectAll),
    (KeyEvent::plain(KeyCode::F(1)), CommandId::About),
];

/// The command bound to `key`, if any.
///
/// Terminals disagree on how Ctrl+Shift+letter arrives; an uppercase letter
/// with Ctrl is treated as the lowercase letter with Ctrl+Shift.
#[must_use]
pub fn command_for_key(key: KeyEvent) -> Option<CommandId> {
    let key = match key.code {
        KeyCode::Char(ch) if key.has(Modifiers::CTRL) && ch.is_ascii_uppercase() => KeyEvent::new(
            KeyCode::Char(ch.to_ascii_lowercase()),
            key.modifiers | Modifiers::SHIFT,
        ),
        _ => key,
    };
    SHORTCUTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, command)| command)
}

// ---------------------------------------------------------------------------
// Menu bar state
// ---------------------------------------------------------------------------

/// What a key or click did to the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResult {
    /// Not for the menus; let the text area have it.
    Ignored,
    /// Handled by the menus (opened, moved, closed).
    Consumed,
    /// An item was chosen. The menu has closed.
    Run(CommandId),
}

/// Column span of each menu title in the bar: `(x, width)`.
#[must_use]
pub fn title_spans() -> Vec<(u16, u16)> {
    let mut x = 0u16;
    MENUS
        .iter()
        .map(|menu| {
            // One space of padding either side.
            let width = u16::try_from(string_width(&display_label(menu.label)) + 2).unwrap_or(u16::MAX);
            let span = (x, width);
            x = x.saturating_add(width);
            span
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    /// `(menu, item)` of the open menu and its highlighted item.
    open: Option<(usize, usize)>,
}

impl MenuState {
    #[must_use]
    pub const fn new() -> Self {
        Self { open: None }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// `(menu, item)` when a menu is open.
    #[must_use]
    pub const fn selected(&self) -> Option<(usize, usize)> {
        self.open
    }

    /// Open menu `index` with its first command highlighted.
    pub fn open(&mut self, index: usize) {
        let index = index % MENUS.len();
        self.open = Some((index, first_command(index)));
    }

    pub const fn close(&mut self) {
        self.open = None;
    }

    /// The drop-down box of menu `index`: below its title, wide enough for
    /// labels and shortcuts, with a border.
    #[must_use]
    pub fn dropdown_rect(index: usize) -> Rect {
        let spans = title_spans();
        let x = spans.get(index).map_or(0, |&(x, _)| x);
        let items = MENUS.get(index).map_or(&[][..], |m| m.items);
        let inner = items
            .iter()
            .map(|item| match item {
                MenuItem::Command { label, shortcut, .. } => {
                    string_width(&display_label(label)) + 3 + string_width(shortcut)
                }
                MenuItem::Separator => 0,
            })
            .max()
            .unwrap_or(0);
        let width = u16::try_from(inner + 4).unwrap_or(u16::MAX);
        let height = u16::try_from(items.len() + 2).unwrap_or(u16::MAX);
        Rect::new(x, 1, width, height)
    }

    /// Route a key. Closed menus only react to F10 and Alt+mnemonic.
    pub fn handle_key(&mut self, key: KeyEvent) -> MenuResult {
        let Some((menu, item)) = self.open else {
            if key == KeyEvent::plain(KeyCode::F(10)) {
                self.open(0);
                return MenuResult::Consumed;
            }
            return match alt_menu(key) {
                Some(index) => {
                    self.open(index);
                    MenuResult::Consumed
                }
                None => MenuResult::Ignored,
            };
        };

        if let Some(index) = alt_menu(key) {
            self.open(index);
            return MenuResult::Consumed;
        }

        let items = MENUS[menu].items;
        match key.code {
            KeyCode::Escape | KeyCode::F(10) => self.close(),
            KeyCode::Left => self.open(menu + MENUS.len() - 1),
            KeyCode::Right => self.open(menu + 1),
            KeyCode::Up => self.open = Some((menu, step(items, item, false))),
            KeyCode::Down => self.open = Some((menu, step(items, item, true))),
            KeyCode::Enter => {
                if let Some(command) = items.get(item).and_then(|i| i.command()) {
                    self.close();
                    return MenuResult::Run(command);
                }
            }
            KeyCode::Char(ch) if key.text_char().is_some() => {
                let ch = ch.to_ascii_lowercase();
                let hit = items.iter().find_map(|i| match i {
                    MenuItem::Command { label, command, .. } if mnemonic(label) == Some(ch) => {
                        Some(*command)
                    }
                    _ => None,
                });
                if let Some(command) = hit {
                    self.close();
                    return MenuResult::Run(command);
                }
            }
            _ => {}
        }
        MenuResult::Consumed
    }

    /// Route a mouse report. Clicks on a title toggle its menu; clicks on an
    /// item run it; any other click closes an open menu.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> MenuResult {
        if mouse.kind != MouseEventKind::Press(MouseButton::Left) {
            return if self.is_open() {
                MenuResult::Consumed
            } else {
                MenuResult::Ignored
            };
        }

        if mouse.y == 0 {
            let hit = title_spans()
                .iter()
                .position(|&(x, w)| mouse.x >= x && mouse.x < x + w);
            return match hit {
                Some(index) if self.open.map(|(m, _)| m) == Some(index) => {
                    self.close();
                    MenuResult::Consumed
                }
                Some(index) => {
                    self.open(index);
                    MenuResult::Consumed
                }
                None if self.is_open() => {
                    self.close();
                    MenuResult::Consumed
                }
                None => MenuResult::Ignored,
            };
        }

        let Some((menu, _)) = self.open else {
            return MenuResult::Ignored;
        };
        let rect = Self::dropdown_rect(menu).inset(1);
        if rect.contains(mouse.x, mouse.y) {
            let index = usize::from(mouse.y - rect.y);
            if let Some(command) = MENUS[menu].items.get(index).and_then(|i| i.command()) {
                self.close();
                return MenuResult::Run(command);
            }
            return MenuResult::Consumed;
        }
        self.close();
        MenuResult::Consumed
    }
}

fn alt_menu(key: KeyEvent) -> Option<usize> {
    let KeyCode::Char(ch) = key.code else {
        return None;
    };
    if key.modifiers != Modifiers::ALT {
        return None;
    }
    let ch = ch.to_ascii_lowercase();
    MENUS.iter().position(|m| mnemonic(m.label) == Some(ch))
}

fn first_command(menu: usize) -> usize {
    MENUS[menu]
        .items
        .iter()
        .position(|i| i.command().is_some())
        .unwrap_or(0)
}

/// Next or previous command item from `from`, wrapping, skipping separators.
fn step(items: &[MenuItem], from: usize, forward: bool) -> usize {
    let n = items.len();
    let mut i = from;
    for _ in 0..n {
        i = if forward { (i + 1) % n } else { (i + n - 1) % n };
        if items[i].command().is_some() {
            return i;
        }
    }
    from
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

    fn click(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            x,
            y,
            modifiers: Modifiers::empty(),
        }
    }

    #[test]
    fn every_command_is_in_a_menu_once() {
        for id in CommandId::ALL {
            let count = MENUS
                .iter()
                .flat_map(|m| m.items)
                .filter(|i| i.command() == Some(id))
                .count();
            assert_eq!(count, 1, "{id:?}");
        }
    }

    #[test]
    fn mnemonics_and_labels() {
        assert_eq!(mnemonic("E&xit"), Some('x'));
        assert_eq!(mnemonic("&File"), Some('f'));
        assert_eq!(mnemonic("Plain"), None);
        assert_eq!(display_label("Save &As..."), "Save As...");
    }

    #[test]
    fn mnemonics_are_unique_within_each_menu() {
        for menu in &MENUS {
            let mut seen: Vec<char> = menu
                .items
                .iter()
                .filter_map(|i| match i {
                    MenuItem::Command { label, .. } => mnemonic(label),
                    MenuItem::Separator => None,
                })
                .collect();
            let total = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), total, "{}", menu.label);
        }
    }

    #[test]
    fn shortcut_lookup() {
        assert_eq!(command_for_key(KeyEvent::ctrl('n')), Some(CommandId::New));
        assert_eq!(command_for_key(KeyEvent::ctrl('s')), Some(CommandId::Save));
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('s'), Modifiers::CTRL | Modifiers::SHIFT)),
            Some(CommandId::SaveAs)
        );
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('S'), Modifiers::CTRL)),
            Some(CommandId::SaveAs)
        );
        assert_eq!(command_for_key(key(KeyCode::F(12))), Some(CommandId::SaveAs));
        assert_eq!(command_for_key(key(KeyCode::F(1))), Some(CommandId::About));
        assert_eq!(command_for_key(KeyEvent::ctrl('q')), Some(CommandId::Exit));
        assert_eq!(command_for_key(key(KeyCode::Char('s'))), None);
        assert_eq!(command_for_key(KeyEvent::ctrl('k')), None);
    }

    #[test]
    fn closed_menu_ignores_plain_keys() {
        let mut m = MenuState::new();
        assert_eq!(m.handle_key(key(KeyCode::Char('f'))), MenuResult::Ignored);
        assert_eq!(m.handle_key(key(KeyCode::Down)), MenuResult::Ignored);
        assert!(!m.is_open());
    }

    #[test]
    fn f10_and_alt_open_menus() {
        let mut m = MenuState::new();
        assert_eq!(m.handle_key(key(KeyCode::F(10))), MenuResult::Consumed);
        assert_eq!(m.selected(), Some((0, 0)));

        m.close();
        m.handle_key(KeyEvent::alt('e'));
        assert_eq!(m.selected(), Some((1, 0)));
        m.handle_key(KeyEvent::alt('h'));
        assert_eq!(m.selected(), Some((2, 0)));
    }

    #[test]
    fn arrows_skip_separators_and_wrap() {
        let mut m = MenuState::new();
        m.open(0);
        m.handle_key(key(KeyCode::Down));
        assert_eq!(m.selected(), Some((0, 1)));
        m.handle_key(key(KeyCode::Down));
        assert_eq!(m.selected(), Some((0, 3)));
        m.handle_key(key(KeyCode::Up));
        m.handle_key(key(KeyCode::Up));
        m.handle_key(key(KeyCode::Up));
        assert_eq!(m.selected(), Some((0, 6)));
    }

    #[test]
    fn left_right_switch_menus() {
        let mut m = MenuState::new();
        m.open(0);
        m.handle_key(key(KeyCode::Left));
        assert_eq!(m.selected(), Some((2, 0)));
        m.handle_key(key(KeyCode::Right));
        assert_eq!(m.selected(), Some((0, 0)));
    }

    #[test]
    fn enter_and_mnemonic_run_items() {
        let mut m = MenuState::new();
        m.open(0);
        m.handle_key(key(KeyCode::Down));
        assert_eq!(m.handle_key(key(KeyCode::Enter)), MenuResult::Run(CommandId::Open));
        assert!(!m.is_open());

        m.open(0);
        assert_eq!(m.handle_key(key(KeyCode::Char('x'))), MenuResult::Run(CommandId::Exit));

        m.open(1);
        assert_eq!(m.handle_key(key(KeyCode::Char('A'))), MenuResult::Run(CommandId::SelectAll));
    }

    #[test]
    fn escape_closes_and_unknown_keys_are_swallowed() {
        let mut m = MenuState::new();
        m.open(1);
        assert_eq!(m.handle_key(key(KeyCode::Char('q'))), MenuResult::Consumed);
        assert!(m.is_open());
        assert_eq!(m.handle_key(key(KeyCode::Escape)), MenuResult::Consumed);
        assert!(!m.is_open());
    }

    #[test]
    fn title_layout() {
        assert_eq!(title_spans(), [(0, 6), (6, 6), (12, 6)]);
    }

    #[test]
    fn click_title_toggles_and_item_runs() {
        let mut m = MenuState::new();
        assert_eq!(m.handle_mouse(click(7, 0)), MenuResult::Consumed);
        assert_eq!(m.selected(), Some((1, 0)));

        // Edit menu rows: border at y=1, Undo at y=2, Redo at y=3.
        assert_eq!(m.handle_mouse(click(8, 3)), MenuResult::Run(CommandId::Redo));
        assert!(!m.is_open());

        m.handle_mouse(click(1, 0));
        m.handle_mouse(click(1, 0));
        assert!(!m.is_open());
    }

    #[test]
    fn click_outside_closes() {
        let mut m = MenuState::new();
        m.open(0);
        assert_eq!(m.handle_mouse(click(70, 20)), MenuResult::Consumed);
        assert!(!m.is_open());
        assert_eq!(m.handle_mouse(click(70, 20)), MenuResult::Ignored);
    }

    #[test]
    fn dropdown_fits_longest_item() {
        let rect = MenuState::dropdown_rect(0);
        // "Save As..." (10) + 3 + "Ctrl+Shift+S" (12) + 4 padding/border.
        assert_eq!(rect, Rect::new(0, 1, 29, 9));
    }
}
