use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub struct InputBar;

impl InputBar {
    pub fn render(frame: &mut Frame, area: Rect, button: Rect, app: &App) {
        let theme = app.current_theme();
        let input = app.input();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent()))
            .title(Span::styled(
                " Message ",
                Style::default().fg(theme.foreground_dim()),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let before_cursor = Span::raw(input.before_cursor()).width() as u16;
        let visible_width = inner.width.saturating_sub(1);
        let scroll_offset = before_cursor.saturating_sub(visible_width);

        let content = if input.is_empty() {
            Line::styled(
                "Type a message...",
                Style::default().fg(theme.foreground_dim()),
            )
        } else {
            Line::styled(input.text(), Style::default().fg(theme.foreground()))
        };
        frame.render_widget(Paragraph::new(content).scroll((0, scroll_offset)), inner);

        if inner.width > 0 && inner.height > 0 {
            frame.set_cursor_position((inner.x + before_cursor - scroll_offset, inner.y));
        }

        let button_style = if input.text().trim().is_empty() {
            Style::default().fg(theme.foreground_dim())
        } else {
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD)
        };
        let send = Paragraph::new(Line::styled("Send", button_style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border())),
            );
        frame.render_widget(send, button);
    }
}
