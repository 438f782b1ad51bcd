mod colors;
mod loader;
mod palettes;

pub use colors::{hex_to_color, ColorPalette};
pub use loader::{ThemeConfig, ThemeLoader};
pub use palettes::Palette;

use ratatui::style::{Color, Modifier, Style};
use relaychat_core::MessageKind;

pub trait Theme: Send + Sync {
    fn name(&self) -> &'static str;

    fn background(&self) -> Color;
    fn foreground(&self) -> Color;
    fn foreground_dim(&self) -> Color;

    fn surface(&self) -> Color;
    fn border(&self) -> Color;
    fn selection(&self) -> Color;

    fn accent(&self) -> Color;
    fn accent_secondary(&self) -> Color;

    fn success(&self) -> Color;
    fn warning(&self) -> Color;
    fn error(&self) -> Color;
    fn info(&self) -> Color;

    /// Sender label style for a transcript entry.
    fn sender_style(&self, kind: MessageKind) -> Style {
        let color = match kind {
            MessageKind::User => self.accent(),
            MessageKind::Ai => self.success(),
            MessageKind::System => self.warning(),
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Body text style for a transcript entry.
    fn text_style(&self, kind: MessageKind) -> Style {
        match kind {
            MessageKind::System => Style::default()
                .fg(self.foreground_dim())
                .add_modifier(Modifier::ITALIC),
            MessageKind::User | MessageKind::Ai => Style::default().fg(self.foreground()),
        }
    }
}

pub struct ThemeManager {
    themes: Vec<Box<dyn Theme>>,
    current_index: usize,
}

impl ThemeManager {
    pub fn new() -> Self {
        let themes: Vec<Box<dyn Theme>> = palettes::ALL
            .iter()
            .map(|palette| Box::new(*palette) as Box<dyn Theme>)
            .collect();

        Self {
            themes,
            current_index: 0,
        }
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.themes[self.current_index].as_ref()
    }

    pub fn cycle_theme(&mut self) {
        self.current_index = (self.current_index + 1) % self.themes.len();
    }

    pub fn set_theme_by_name(&mut self, name: &str) -> bool {
        if let Some(index) = self
            .themes
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(name))
        {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn available_themes(&self) -> Vec<&'static str> {
        self.themes.iter().map(|t| t.name()).collect()
    }

    pub fn current_theme_name(&self) -> &'static str {
        self.current_theme().name()
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}
