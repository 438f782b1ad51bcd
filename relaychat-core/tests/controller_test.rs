use std::cell::RefCell;
use std::rc::Rc;

use relaychat_core::{
    ChatConfig, ChatController, ChatError, ChatMessage, ChatResult, InputField, MessageKind,
    Outbound, RenderSink, SendOutcome, TransportEvent,
};
use serde_json::{json, Value};

/// Sink that records every call in order, shared with the test body.
#[derive(Clone, Default)]
struct RecordingSink {
    calls: Rc<RefCell<Vec<String>>>,
}

impl RenderSink for RecordingSink {
    fn append_entry(&mut self, entry: &ChatMessage) {
        self.calls
            .borrow_mut()
            .push(format!("append {} {}: {}", entry.kind, entry.sender, entry.text));
    }

    fn scroll_to_end(&mut self) {
        self.calls.borrow_mut().push("scroll".to_string());
    }
}

#[derive(Clone, Default)]
struct RecordingOutbound {
    sent: Rc<RefCell<Vec<(String, Value)>>>,
}

impl Outbound for RecordingOutbound {
    fn emit(&self, event: &str, payload: Value) -> ChatResult<()> {
        self.sent.borrow_mut().push((event.to_string(), payload));
        Ok(())
    }
}

struct StoppedOutbound;

impl Outbound for StoppedOutbound {
    fn emit(&self, _event: &str, _payload: Value) -> ChatResult<()> {
        Err(ChatError::TransportStopped)
    }
}

/// Input box that counts clears, to prove a blank send leaves it alone.
struct CountingInput {
    text: String,
    clears: usize,
}

impl CountingInput {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            clears: 0,
        }
    }
}

impl InputField for CountingInput {
    fn value(&self) -> &str {
        &self.text
    }

    fn clear(&mut self) {
        self.text.clear();
        self.clears += 1;
    }
}

fn setup() -> (
    ChatController<RecordingSink, RecordingOutbound>,
    RecordingSink,
    RecordingOutbound,
) {
    let sink = RecordingSink::default();
    let outbound = RecordingOutbound::default();
    let controller =
        ChatController::from_config(sink.clone(), outbound.clone(), &ChatConfig::default());
    (controller, sink, outbound)
}

fn chat(user: &str, text: &str) -> TransportEvent {
    TransportEvent::Event {
        name: "chat_message".to_string(),
        payload: json!({"user": user, "text": text}),
    }
}

#[test]
fn test_send_emits_exactly_one_trimmed_event() {
    let (controller, sink, outbound) = setup();
    let mut input = CountingInput::new("\t Hello world \n");

    assert_eq!(controller.send_message(&mut input), SendOutcome::Sent);

    assert_eq!(
        *outbound.sent.borrow(),
        vec![(
            "user_message".to_string(),
            json!({"text": "Hello world"})
        )]
    );
    assert_eq!(input.value(), "");
    assert_eq!(input.clears, 1);
    assert!(sink.calls.borrow().is_empty());
}

#[test]
fn test_blank_send_touches_nothing() {
    let (controller, sink, outbound) = setup();
    let mut input = CountingInput::new("   ");

    assert_eq!(controller.send_message(&mut input), SendOutcome::Empty);

    assert!(outbound.sent.borrow().is_empty());
    assert_eq!(input.clears, 0);
    assert_eq!(input.value(), "   ");
    assert!(sink.calls.borrow().is_empty());
}

#[test]
fn test_send_keeps_inner_whitespace() {
    let (controller, _, outbound) = setup();
    let mut input = CountingInput::new("  a  b  ");
    controller.send_message(&mut input);
    assert_eq!(outbound.sent.borrow()[0].1, json!({"text": "a  b"}));
}

#[test]
fn test_send_with_stopped_transport() {
    let controller = ChatController::from_config(
        RecordingSink::default(),
        StoppedOutbound,
        &ChatConfig::default(),
    );
    let mut input = CountingInput::new("Hello");
    assert_eq!(controller.send_message(&mut input), SendOutcome::Failed);
    assert_eq!(input.clears, 1);
}

#[test]
fn test_every_append_is_followed_by_scroll() {
    let (mut controller, sink, _) = setup();

    controller.handle_event(chat("AI", "Hi"));
    controller.handle_event(chat("Вы", "Hello"));
    controller.handle_event(chat("System", "Ping"));

    assert_eq!(
        *sink.calls.borrow(),
        vec![
            "append ai AI: Hi",
            "scroll",
            "append user Вы: Hello",
            "scroll",
            "append system System: Ping",
            "scroll",
        ]
    );
}

#[test]
fn test_classification_is_exact() {
    let (mut controller, sink, _) = setup();

    for user in ["вы", "Вы ", "system", "Assistant", ""] {
        controller.handle_event(chat(user, "x"));
    }

    let appends: Vec<_> = sink
        .calls
        .borrow()
        .iter()
        .filter(|c| c.starts_with("append"))
        .cloned()
        .collect();
    assert_eq!(appends.len(), 5);
    assert!(appends.iter().all(|c| c.starts_with("append ai ")));
}

#[test]
fn test_custom_you_label() {
    let mut config = ChatConfig::default();
    config.labels.you = "You".to_string();
    let sink = RecordingSink::default();
    let mut controller =
        ChatController::from_config(sink.clone(), RecordingOutbound::default(), &config);

    controller.handle_event(chat("You", "mine"));
    controller.handle_event(chat("Вы", "not mine any more"));

    let calls = sink.calls.borrow();
    assert_eq!(calls[0], "append user You: mine");
    assert_eq!(calls[2], "append ai Вы: not mine any more");
}

#[test]
fn test_lifecycle_notices() {
    let (mut controller, sink, _) = setup();

    controller.handle_event(TransportEvent::Connected {
        session_id: "sid".to_string(),
    });
    assert!(sink.calls.borrow().is_empty());

    controller.handle_event(TransportEvent::Disconnected {
        reason: "ping timeout".to_string(),
    });
    controller.handle_event(TransportEvent::ConnectError {
        message: "Connection refused".to_string(),
    });

    assert_eq!(
        *sink.calls.borrow(),
        vec![
            "append system System: Потеряно соединение с сервером.",
            "scroll",
            "append system System: Ошибка подключения: Connection refused",
            "scroll",
        ]
    );
}

#[test]
fn test_message_kind_matches_sender() {
    let labels = ChatConfig::default().labels;
    assert_eq!(labels.classify("Вы"), MessageKind::User);
    assert_eq!(labels.classify("System"), MessageKind::System);
    assert_eq!(labels.classify("Bot"), MessageKind::Ai);
}
