use ratatui::style::Color;

use super::colors::{hex_to_color as hex, ColorPalette};
use super::Theme;

/// A named, fixed set of colors.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub name: &'static str,
    pub colors: ColorPalette,
}

impl Theme for Palette {
    fn name(&self) -> &'static str {
        self.name
    }

    fn background(&self) -> Color {
        self.colors.background
    }

    fn foreground(&self) -> Color {
        self.colors.foreground
    }

    fn foreground_dim(&self) -> Color {
        self.colors.foreground_dim
    }

    fn surface(&self) -> Color {
        self.colors.surface
    }

    fn border(&self) -> Color {
        self.colors.border
    }

    fn selection(&self) -> Color {
        self.colors.selection
    }

    fn accent(&self) -> Color {
        self.colors.accent
    }

    fn accent_secondary(&self) -> Color {
        self.colors.accent_secondary
    }

    fn success(&self) -> Color {
        self.colors.success
    }

    fn warning(&self) -> Color {
        self.colors.warning
    }

    fn error(&self) -> Color {
        self.colors.error
    }

    fn info(&self) -> Color {
        self.colors.info
    }
}

pub const TOKYO_NIGHT: Palette = Palette {
    name: "Tokyo Night",
    colors: ColorPalette {
        background: hex(0x1a1b26),
        foreground: hex(0xc0caf5),
        foreground_dim: hex(0x565f89),
        surface: hex(0x24283b),
        border: hex(0x414868),
        selection: hex(0x364a82),
        accent: hex(0x7aa2f7),
        accent_secondary: hex(0xbb9af7),
        success: hex(0x9ece6a),
        warning: hex(0xe0af68),
        error: hex(0xf7768e),
        info: hex(0x7dcfff),
    },
};

pub const CATPPUCCIN_MOCHA: Palette = Palette {
    name: "Catppuccin Mocha",
    colors: ColorPalette {
        background: hex(0x1e1e2e),
        foreground: hex(0xcdd6f4),
        foreground_dim: hex(0x6c7086),
        surface: hex(0x313244),
        border: hex(0x45475a),
        selection: hex(0x585b70),
        accent: hex(0xcba6f7),
        accent_secondary: hex(0xf5c2e7),
        success: hex(0xa6e3a1),
        warning: hex(0xf9e2af),
        error: hex(0xf38ba8),
        info: hex(0x89b4fa),
    },
};

pub const DRACULA: Palette = Palette {
    name: "Dracula",
    colors: ColorPalette {
        background: hex(0x282a36),
        foreground: hex(0xf8f8f2),
        foreground_dim: hex(0x6272a4),
        surface: hex(0x44475a),
        border: hex(0x6272a4),
        selection: hex(0x44475a),
        accent: hex(0xbd93f9),
        accent_secondary: hex(0xff79c6),
        success: hex(0x50fa7b),
        warning: hex(0xf1fa8c),
        error: hex(0xff5555),
        info: hex(0x8be9fd),
    },
};

pub const NORD: Palette = Palette {
    name: "Nord",
    colors: ColorPalette {
        background: hex(0x2e3440),
        foreground: hex(0xeceff4),
        foreground_dim: hex(0x4c566a),
        surface: hex(0x3b4252),
        border: hex(0x4c566a),
        selection: hex(0x434c5e),
        accent: hex(0x88c0d0),
        accent_secondary: hex(0x81a1c1),
        success: hex(0xa3be8c),
        warning: hex(0xebcb8b),
        error: hex(0xbf616a),
        info: hex(0x5e81ac),
    },
};

pub const GRUVBOX_LIGHT: Palette = Palette {
    name: "Gruvbox Light",
    colors: ColorPalette {
        background: hex(0xfbf1c7),
        foreground: hex(0x3c3836),
        foreground_dim: hex(0x928374),
        surface: hex(0xebdbb2),
        border: hex(0xd5c4a1),
        selection: hex(0xd5c4a1),
        accent: hex(0xaf3a03),
        accent_secondary: hex(0x8f3f71),
        success: hex(0x79740e),
        warning: hex(0xb57614),
        error: hex(0x9d0006),
        info: hex(0x076678),
    },
};

pub const ALL: [Palette; 5] = [TOKYO_NIGHT, CATPPUCCIN_MOCHA, DRACULA, NORD, GRUVBOX_LIGHT];
