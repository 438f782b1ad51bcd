use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};
use relaychat_core::ChatMessage;

use crate::app::App;
use crate::theme::Theme;

pub struct TranscriptView;

impl TranscriptView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let transcript = app.transcript();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border()))
            .title(Span::styled(
                " Chat ",
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if transcript.is_empty() {
            let placeholder = Paragraph::new(Line::styled(
                " No messages yet. Type below and press Enter.",
                Style::default().fg(theme.foreground_dim()),
            ));
            frame.render_widget(placeholder, inner);
            return;
        }

        let lines: Vec<Line> = transcript
            .visible()
            .iter()
            .map(|entry| entry_line(entry, theme, app.show_timestamps()))
            .collect();

        // Long entries wrap; when following the tail keep the last row in view.
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        let scroll = if transcript.is_at_end() {
            tail_scroll(&paragraph, inner)
        } else {
            0
        };
        frame.render_widget(paragraph.scroll((scroll, 0)), inner);

        let total = transcript.len();
        if total > transcript.viewport() {
            let mut scrollbar_state = ScrollbarState::new(transcript.max_scroll())
                .position(transcript.scroll_offset())
                .viewport_content_length(transcript.viewport());
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .style(Style::default().fg(theme.border())),
                area,
                &mut scrollbar_state,
            );
        }

        if !transcript.is_at_end() {
            let hint = " ↓ newer messages ";
            let width = (hint.chars().count() as u16).min(inner.width);
            let hint_area = Rect::new(
                inner.x + inner.width.saturating_sub(width),
                inner.y + inner.height.saturating_sub(1),
                width,
                1,
            );
            frame.render_widget(
                Paragraph::new(Line::styled(
                    hint,
                    Style::default()
                        .fg(theme.background())
                        .bg(theme.warning())
                        .add_modifier(Modifier::BOLD),
                )),
                hint_area,
            );
        }
    }
}

fn entry_line<'a>(entry: &'a ChatMessage, theme: &dyn Theme, show_timestamps: bool) -> Line<'a> {
    let mut spans = Vec::with_capacity(4);

    if show_timestamps {
        let local = entry.received_at.with_timezone(&chrono::Local);
        spans.push(Span::styled(
            format!("{} ", local.format("%H:%M")),
            Style::default().fg(theme.foreground_dim()),
        ));
    }

    spans.push(Span::styled(
        entry.sender.as_str(),
        theme.sender_style(entry.kind),
    ));
    spans.push(Span::styled(": ", Style::default().fg(theme.foreground_dim())));
    spans.push(Span::styled(entry.text.as_str(), theme.text_style(entry.kind)));

    Line::from(spans)
}

/// Rows to skip so the last wrapped row lands on the bottom of `area`.
fn tail_scroll(paragraph: &Paragraph, area: Rect) -> u16 {
    let rows = paragraph.line_count(area.width);
    let overflow = rows.saturating_sub(area.height as usize);
    overflow.min(u16::MAX as usize) as u16
}
