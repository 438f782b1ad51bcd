use std::io::Write;

use colored::Colorize;
use relaychat_core::{ChatMessage, MessageKind, RenderSink};

/// Renders entries as `sender: text` lines on stdout.
///
/// Scrolling is the terminal's job, so `scroll_to_end` only flushes.
pub struct StdoutSink<W: Write> {
    out: W,
    show_timestamps: bool,
}

impl StdoutSink<std::io::Stdout> {
    pub fn stdout(show_timestamps: bool) -> Self {
        Self::new(std::io::stdout(), show_timestamps)
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn new(out: W, show_timestamps: bool) -> Self {
        Self {
            out,
            show_timestamps,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for StdoutSink<W> {
    fn append_entry(&mut self, entry: &ChatMessage) {
        let line = format_entry(entry, self.show_timestamps);
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "Failed to write entry");
        }
    }

    fn scroll_to_end(&mut self) {
        let _ = self.out.flush();
    }
}

pub fn format_entry(entry: &ChatMessage, show_timestamps: bool) -> String {
    let sender = match entry.kind {
        MessageKind::User => entry.sender.cyan().bold(),
        MessageKind::Ai => entry.sender.green().bold(),
        MessageKind::System => entry.sender.yellow().bold(),
    };
    let text = match entry.kind {
        MessageKind::System => entry.text.yellow().italic(),
        MessageKind::User | MessageKind::Ai => entry.text.normal(),
    };

    if show_timestamps {
        let time = entry
            .received_at
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        format!("{} {}: {}", time.to_string().dimmed(), sender, text)
    } else {
        format!("{}: {}", sender, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format() {
        colored::control::set_override(false);
        let entry = ChatMessage::new("AI", "Hello there", MessageKind::Ai);
        assert_eq!(format_entry(&entry, false), "AI: Hello there");

        let notice = ChatMessage::system("System", "Потеряно соединение с сервером.");
        assert_eq!(
            format_entry(&notice, false),
            "System: Потеряно соединение с сервером."
        );
    }

    #[test]
    fn test_sink_writes_lines() {
        colored::control::set_override(false);
        let mut sink = StdoutSink::new(Vec::new(), false);
        sink.append_entry(&ChatMessage::new("Вы", "one", MessageKind::User));
        sink.scroll_to_end();
        sink.append_entry(&ChatMessage::new("AI", "two", MessageKind::Ai));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "Вы: one\nAI: two\n");
    }

    #[test]
    fn test_timestamp_prefix() {
        colored::control::set_override(false);
        let entry = ChatMessage::new("AI", "x", MessageKind::Ai);
        let line = format_entry(&entry, true);
        assert!(line.ends_with(" AI: x"));
        assert_eq!(line.len(), "HH:MM AI: x".len());
    }
}
