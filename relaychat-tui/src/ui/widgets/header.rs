use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use relaychat_core::ConnectionStatus;

use crate::app::App;
use crate::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(20),
                Constraint::Min(20),
                Constraint::Length(10),
            ])
            .split(area);

        let logo = Paragraph::new(Line::from(vec![
            Span::styled(
                " relaychat ",
                Style::default()
                    .fg(theme.foreground())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("v{}", VERSION),
                Style::default().fg(theme.foreground_dim()),
            ),
        ]))
        .style(Style::default().bg(theme.surface()));
        frame.render_widget(logo, chunks[0]);

        let status = Paragraph::new(status_line(app.status(), app.server_url(), theme))
            .style(Style::default().bg(theme.surface()));
        frame.render_widget(status, chunks[1]);

        let time = chrono::Local::now().format("%H:%M:%S ").to_string();
        let clock = Paragraph::new(Line::from(Span::styled(
            time,
            Style::default().fg(theme.foreground_dim()),
        )))
        .alignment(Alignment::Right)
        .style(Style::default().bg(theme.surface()));
        frame.render_widget(clock, chunks[2]);
    }
}

fn status_line<'a>(status: &ConnectionStatus, url: &'a str, theme: &dyn Theme) -> Line<'a> {
    let color = match status {
        ConnectionStatus::Connected { .. } => theme.success(),
        ConnectionStatus::Connecting | ConnectionStatus::Reconnecting { .. } => theme.warning(),
        ConnectionStatus::Disconnected { .. } => theme.error(),
    };

    let mut spans = vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(status.to_string(), Style::default().fg(color)),
        Span::styled(format!("  {}", url), Style::default().fg(theme.foreground_dim())),
    ];
    if let Some(sid) = status.session_id() {
        spans.push(Span::styled(
            format!("  sid {}", sid),
            Style::default().fg(theme.foreground_dim()),
        ));
    }

    Line::from(spans)
}
