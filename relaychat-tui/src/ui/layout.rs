use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::App;
use crate::ui::widgets::{Footer, Header, InputBar, TranscriptView};

pub const SEND_BUTTON_WIDTH: u16 = 10;

/// Where every part of the screen goes for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub header: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub send_button: Rect,
    pub footer: Rect,
}

impl ChatLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let input_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(SEND_BUTTON_WIDTH)])
            .split(rows[2]);

        Self {
            header: rows[0],
            transcript: rows[1],
            input: input_row[0],
            send_button: input_row[1],
            footer: rows[3],
        }
    }

    /// Rows available for entries inside the transcript border.
    pub fn transcript_rows(&self) -> usize {
        self.transcript.height.saturating_sub(2).max(1) as usize
    }
}

pub struct MainLayout;

impl MainLayout {
    pub fn render(frame: &mut Frame, app: &App) {
        let theme = app.current_theme();
        let size = frame.area();

        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(theme.background())
                    .fg(theme.foreground()),
            ),
            size,
        );

        let layout = ChatLayout::compute(size);

        Header::render(frame, layout.header, app);
        TranscriptView::render(frame, layout.transcript, app);
        InputBar::render(frame, layout.input, layout.send_button, app);
        Footer::render(frame, layout.footer, app);
    }
}
