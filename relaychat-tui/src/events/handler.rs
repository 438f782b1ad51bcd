use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Send,
    InsertChar(char),
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ClearInput,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    ToggleTheme,
    MouseClick { x: u16, y: u16 },
    MouseScroll { direction: ScrollDirection },
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Turns raw terminal events into [`Action`]s. Knows nothing about the
/// transcript or the connection.
pub struct EventHandler {
    mouse_enabled: bool,
    terminal_size: Option<(u16, u16)>,
    clickable_regions: Vec<ClickableRegion>,
}

#[derive(Debug, Clone)]
pub struct ClickableRegion {
    pub area: Rect,
    pub action: Action,
    pub label: String,
}

impl ClickableRegion {
    fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.area.x
            && x < self.area.x + self.area.width
            && y >= self.area.y
            && y < self.area.y + self.area.height
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            mouse_enabled: true,
            terminal_size: None,
            clickable_regions: Vec::new(),
        }
    }

    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    pub fn terminal_size(&self) -> Option<(u16, u16)> {
        self.terminal_size
    }

    pub fn register_clickable_region(&mut self, region: ClickableRegion) {
        self.clickable_regions.push(region);
    }

    pub fn clear_clickable_regions(&mut self) {
        self.clickable_regions.clear();
    }

    pub fn clickable_regions(&self) -> &[ClickableRegion] {
        &self.clickable_regions
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Key(_) => None,
            Event::Mouse(mouse) if self.mouse_enabled => self.handle_mouse(mouse),
            Event::Mouse(_) => None,
            Event::Resize(width, height) => self.handle_resize(width, height),
            Event::Paste(text) => Some(Action::Paste(text)),
            Event::FocusGained | Event::FocusLost => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl) {
            (KeyCode::Char('c'), true) => Some(Action::Quit),
            (KeyCode::Esc, _) => Some(Action::Quit),
            (KeyCode::Char('t'), true) => Some(Action::ToggleTheme),
            (KeyCode::Char('u'), true) => Some(Action::ClearInput),
            (KeyCode::Home, true) => Some(Action::ScrollTop),
            (KeyCode::End, true) => Some(Action::ScrollBottom),
            (KeyCode::Char(_), true) => None,
            (KeyCode::Enter, _) => Some(Action::Send),
            (KeyCode::Char(c), false) => Some(Action::InsertChar(c)),
            (KeyCode::Backspace, _) => Some(Action::Backspace),
            (KeyCode::Delete, _) => Some(Action::Delete),
            (KeyCode::Left, _) => Some(Action::CursorLeft),
            (KeyCode::Right, _) => Some(Action::CursorRight),
            (KeyCode::Home, false) => Some(Action::CursorHome),
            (KeyCode::End, false) => Some(Action::CursorEnd),
            (KeyCode::Up, _) => Some(Action::ScrollUp),
            (KeyCode::Down, _) => Some(Action::ScrollDown),
            (KeyCode::PageUp, _) => Some(Action::PageUp),
            (KeyCode::PageDown, _) => Some(Action::PageDown),
            _ => None,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let x = mouse.column;
                let y = mouse.row;

                if let Some(region) = self.clickable_regions.iter().find(|r| r.contains(x, y)) {
                    return Some(region.action.clone());
                }

                Some(Action::MouseClick { x, y })
            }
            MouseEventKind::ScrollUp => Some(Action::MouseScroll {
                direction: ScrollDirection::Up,
            }),
            MouseEventKind::ScrollDown => Some(Action::MouseScroll {
                direction: ScrollDirection::Down,
            }),
            _ => None,
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) -> Option<Action> {
        self.terminal_size = Some((width, height));
        Some(Action::Resize { width, height })
    }
}
