use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::{backend::Backend, layout::Rect, Terminal};
use relaychat_core::{
    ChatConfig, ChatController, ClientConfig, ConnectionStatus, InputField, SendOutcome,
    SocketClient, SocketHandle, Transcript, TransportEvent,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::events::{Action, ClickableRegion, EventHandler, ScrollDirection};
use crate::input::InputBuffer;
use crate::theme::{Theme, ThemeLoader, ThemeManager};
use crate::ui::layout::{ChatLayout, MainLayout};

const WHEEL_STEP: usize = 3;

pub struct App {
    should_quit: bool,
    controller: ChatController<Transcript, SocketHandle>,
    transport_rx: Option<UnboundedReceiver<TransportEvent>>,
    input: InputBuffer,
    theme_manager: ThemeManager,
    theme_loader: ThemeLoader,
    event_handler: EventHandler,
    status_message: Option<String>,
    server_url: String,
    show_timestamps: bool,
    tick_rate: Duration,
    layout: Option<ChatLayout>,
}

impl App {
    /// Starts connecting right away; must run inside a tokio runtime.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        Self::with_theme_loader(config, ThemeLoader::new())
    }

    pub fn with_theme_loader(config: &ChatConfig, theme_loader: ThemeLoader) -> Result<Self> {
        let client_config = ClientConfig::from_chat_config(config)?;
        let (handle, transport_rx) = SocketClient::connect(client_config);

        let theme_manager = theme_loader.initialize_theme_manager(&config.tui.theme);

        Ok(Self {
            should_quit: false,
            controller: ChatController::from_config(Transcript::new(), handle, config),
            transport_rx: Some(transport_rx),
            input: InputBuffer::new(),
            theme_manager,
            theme_loader,
            event_handler: EventHandler::new().with_mouse(config.tui.mouse_enabled),
            status_message: None,
            server_url: config.server.url.clone(),
            show_timestamps: config.tui.show_timestamps,
            tick_rate: Duration::from_millis(config.tui.tick_rate_ms),
            layout: None,
        })
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut terminal_events = EventStream::new();
        let mut tick = tokio::time::interval(self.tick_rate);

        let size = terminal.size()?;
        self.apply_resize(size.width, size.height);

        loop {
            terminal.draw(|frame| {
                MainLayout::render(frame, self);
            })?;

            tokio::select! {
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                transport = next_transport_event(&mut self.transport_rx) => match transport {
                    Some(event) => self.controller.handle_event(event),
                    None => {
                        self.transport_rx = None;
                        self.status_message = Some("Connection closed".to_string());
                    }
                },
                _ = tick.tick() => {}
            }

            if self.should_quit {
                break;
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Leaves the namespace and waits briefly for the transport to confirm.
    async fn shutdown(&mut self) {
        self.controller.outbound().close();

        if let Some(mut rx) = self.transport_rx.take() {
            let drain = async {
                while let Some(event) = rx.recv().await {
                    tracing::debug!(event = event.name(), "Transport event during shutdown");
                }
            };
            let _ = tokio::time::timeout(Duration::from_millis(500), drain).await;
        }
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        if let Some(action) = self.event_handler.handle_event(event) {
            self.execute_action(action);
        }
    }

    pub fn execute_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Send => self.send(),
            Action::InsertChar(c) => self.input.insert_char(c),
            Action::Paste(text) => self.input.insert_str(&text),
            Action::Backspace => self.input.delete_char(),
            Action::Delete => self.input.delete_char_forward(),
            Action::CursorLeft => self.input.move_cursor_left(),
            Action::CursorRight => self.input.move_cursor_right(),
            Action::CursorHome => self.input.move_cursor_start(),
            Action::CursorEnd => self.input.move_cursor_end(),
            Action::ClearInput => InputField::clear(&mut self.input),
            Action::ScrollUp => self.controller.sink_mut().scroll_up(1),
            Action::ScrollDown => self.controller.sink_mut().scroll_down(1),
            Action::PageUp => {
                let page = self.page_size();
                self.controller.sink_mut().scroll_up(page);
            }
            Action::PageDown => {
                let page = self.page_size();
                self.controller.sink_mut().scroll_down(page);
            }
            Action::ScrollTop => self.controller.sink_mut().scroll_to_top(),
            Action::ScrollBottom => {
                relaychat_core::RenderSink::scroll_to_end(self.controller.sink_mut())
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::MouseScroll { direction } => match direction {
                ScrollDirection::Up => self.controller.sink_mut().scroll_up(WHEEL_STEP),
                ScrollDirection::Down => self.controller.sink_mut().scroll_down(WHEEL_STEP),
            },
            Action::MouseClick { .. } => {}
            Action::Resize { width, height } => self.apply_resize(width, height),
        }
    }

    fn send(&mut self) {
        match self.controller.send_message(&mut self.input) {
            SendOutcome::Sent => self.status_message = None,
            SendOutcome::Empty => {}
            SendOutcome::Failed => {
                self.status_message = Some("Message not sent: connection is gone".to_string())
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme_manager.cycle_theme();
        let theme_name = self.theme_manager.current_theme_name();
        if let Err(e) = self.theme_loader.save_theme_name(theme_name) {
            tracing::warn!("Failed to save theme preference: {}", e);
        }
        self.status_message = Some(format!("Theme changed to: {}", theme_name));
    }

    /// Recomputes the layout, resizes the transcript viewport and moves the
    /// send button's click target.
    fn apply_resize(&mut self, width: u16, height: u16) {
        let layout = ChatLayout::compute(Rect::new(0, 0, width, height));
        self.controller
            .sink_mut()
            .set_viewport(layout.transcript_rows());

        self.event_handler.clear_clickable_regions();
        self.event_handler.register_clickable_region(ClickableRegion {
            area: layout.send_button,
            action: Action::Send,
            label: "Send".to_string(),
        });

        self.layout = Some(layout);
    }

    fn page_size(&self) -> usize {
        self.layout
            .map(|l| l.transcript_rows().saturating_sub(1).max(1))
            .unwrap_or(10)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn current_theme(&self) -> &dyn Theme {
        self.theme_manager.current_theme()
    }

    pub fn theme_name(&self) -> &'static str {
        self.theme_manager.current_theme_name()
    }

    pub fn transcript(&self) -> &Transcript {
        self.controller.sink()
    }

    pub fn status(&self) -> &ConnectionStatus {
        self.controller.status()
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn show_timestamps(&self) -> bool {
        self.show_timestamps
    }

    /// Feeds one transport event as if it came off the socket.
    pub fn apply_transport_event(&mut self, event: TransportEvent) {
        self.controller.handle_event(event);
    }
}

async fn next_transport_event(
    rx: &mut Option<UnboundedReceiver<TransportEvent>>,
) -> Option<TransportEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use relaychat_core::MessageKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        let mut config = ChatConfig::default();
        // nothing listens here; the transport just reports a connect error
        config.server.url = "http://127.0.0.1:9".to_string();
        config.reconnect.enabled = false;
        App::with_theme_loader(&config, ThemeLoader::with_path(dir.path().join("theme.toml")))
            .unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_terminal_event(key(KeyCode::Char(c)));
        }
    }

    fn chat(user: &str, text: &str) -> TransportEvent {
        TransportEvent::Event {
            name: "chat_message".to_string(),
            payload: json!({"user": user, "text": text}),
        }
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_keeps_it() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "   ");
        app.handle_terminal_event(key(KeyCode::Enter));
        assert_eq!(app.input().text(), "   ");
    }

    #[tokio::test]
    async fn test_enter_clears_input() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "hello");
        app.handle_terminal_event(key(KeyCode::Enter));
        assert!(app.input().is_empty());
        // sending never echoes locally
        assert!(app.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_send_button_click() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.apply_resize(80, 24);

        type_text(&mut app, "via mouse");
        app.handle_terminal_event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 74,
            row: 21,
            modifiers: KeyModifiers::NONE,
        }));
        assert!(app.input().is_empty());
    }

    #[tokio::test]
    async fn test_transport_events_reach_transcript() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.apply_transport_event(chat("AI", "hi"));
        app.apply_transport_event(chat("Вы", "hello"));
        app.apply_transport_event(TransportEvent::Disconnected {
            reason: "transport close".to_string(),
        });

        let kinds: Vec<_> = app.transcript().entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![MessageKind::Ai, MessageKind::User, MessageKind::System]
        );
    }

    #[tokio::test]
    async fn test_scroll_then_new_message_snaps_back() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.apply_resize(80, 10);

        for i in 0..30 {
            app.apply_transport_event(chat("AI", &format!("line {i}")));
        }
        assert!(app.transcript().is_at_end());

        app.handle_terminal_event(key(KeyCode::PageUp));
        assert!(!app.transcript().is_at_end());

        app.apply_transport_event(chat("AI", "newest"));
        assert!(app.transcript().is_at_end());
    }

    #[tokio::test]
    async fn test_toggle_theme_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        let before = app.theme_name();

        app.handle_terminal_event(Event::Key(KeyEvent::new(
            KeyCode::Char('t'),
            KeyModifiers::CONTROL,
        )));
        assert_ne!(app.theme_name(), before);

        let saved = ThemeLoader::with_path(dir.path().join("theme.toml"))
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(saved.theme, app.theme_name());
    }

    #[tokio::test]
    async fn test_escape_quits() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_terminal_event(key(KeyCode::Esc));
        assert!(app.should_quit());
    }
}
