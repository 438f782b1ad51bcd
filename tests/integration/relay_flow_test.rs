//! End-to-end flows against an in-process relay speaking Socket.IO v5 over a
//! plain websocket.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use relaychat_core::transport::reason;
use relaychat_core::{
    ChatController, ClientConfig, MessageKind, NoticeConfig, RetryConfig, SenderLabels,
    SocketClient, SocketHandle, Transcript, TransportEvent,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const OPEN: &str =
    r#"0{"sid":"engine-sid","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
const WAIT: Duration = Duration::from_secs(5);

type ServerWs = WebSocketStream<TcpStream>;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("ws://127.0.0.1:{port}/socket.io/?EIO=4&transport=websocket");
    (listener, url)
}

async fn accept(listener: &TcpListener) -> ServerWs {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_text(ws: &mut ServerWs) -> Option<String> {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

/// Engine open plus namespace connect, answering with `sid`.
async fn handshake(ws: &mut ServerWs, sid: &str) {
    ws.send(Message::text(OPEN)).await.unwrap();
    assert_eq!(next_text(ws).await.as_deref(), Some("40"));
    ws.send(Message::text(format!(r#"40{{"sid":"{sid}"}}"#)))
        .await
        .unwrap();
}

async fn recv(events: &mut UnboundedReceiver<TransportEvent>) -> Option<TransportEvent> {
    timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for transport event")
}

fn controller(handle: SocketHandle) -> ChatController<Transcript, SocketHandle> {
    ChatController::new(
        Transcript::new(),
        handle,
        SenderLabels::default(),
        NoticeConfig::default(),
    )
}

fn no_retry(url: &str) -> ClientConfig {
    ClientConfig::new(url)
        .without_reconnect()
        .with_connect_timeout(WAIT)
}

#[tokio::test]
async fn test_full_session_flow() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        handshake(&mut ws, "socket-sid").await;

        ws.send(Message::text("2")).await.unwrap();
        assert_eq!(next_text(&mut ws).await.as_deref(), Some("3"));

        ws.send(Message::text(
            r#"42["chat_message",{"user":"AI","text":"Hi there"}]"#,
        ))
        .await
        .unwrap();
        ws.send(Message::text(
            r#"42["chat_message",{"user":"Вы","text":"echo"}]"#,
        ))
        .await
        .unwrap();

        let sent = next_text(&mut ws).await;
        ws.send(Message::text("41")).await.unwrap();
        sent
    });

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    let mut controller = controller(handle.clone());

    let connected = recv(&mut events).await.unwrap();
    assert_eq!(
        connected,
        TransportEvent::Connected {
            session_id: "socket-sid".to_string()
        }
    );
    controller.handle_event(connected);
    assert!(controller.status().is_connected());
    assert!(handle.is_connected());
    assert!(controller.sink().is_empty());

    for _ in 0..2 {
        let event = recv(&mut events).await.unwrap();
        controller.handle_event(event);
    }
    let entries = controller.sink().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, MessageKind::Ai);
    assert_eq!(entries[0].text, "Hi there");
    assert_eq!(entries[1].kind, MessageKind::User);

    let mut input = "  Hello  ".to_string();
    controller.send_message(&mut input);
    assert!(input.is_empty());

    let sent = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(
        sent.as_deref(),
        Some(r#"42["user_message",{"text":"Hello"}]"#)
    );

    let disconnected = recv(&mut events).await.unwrap();
    assert_eq!(
        disconnected,
        TransportEvent::Disconnected {
            reason: reason::SERVER_DISCONNECT.to_string()
        }
    );
    controller.handle_event(disconnected);

    let last = controller.sink().last().unwrap();
    assert_eq!(last.kind, MessageKind::System);
    assert_eq!(last.text, "Потеряно соединение с сервером.");
    assert_eq!(controller.sink().count_kind(MessageKind::System), 1);

    // Server-initiated disconnect never reconnects.
    assert!(recv(&mut events).await.is_none());
    assert!(!handle.is_connected());
}

#[tokio::test]
async fn test_emit_before_connect_is_flushed_in_order() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        handshake(&mut ws, "sid-1").await;
        let first = next_text(&mut ws).await;
        let second = next_text(&mut ws).await;
        (first, second)
    });

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    let controller = controller(handle);

    let mut input = "first".to_string();
    controller.send_message(&mut input);
    let mut input = "second".to_string();
    controller.send_message(&mut input);

    assert!(matches!(
        recv(&mut events).await,
        Some(TransportEvent::Connected { .. })
    ));

    let (first, second) = timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(
        first.as_deref(),
        Some(r#"42["user_message",{"text":"first"}]"#)
    );
    assert_eq!(
        second.as_deref(),
        Some(r#"42["user_message",{"text":"second"}]"#)
    );
}

#[tokio::test]
async fn test_namespace_connect_error_becomes_notice() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::text(OPEN)).await.unwrap();
        let _ = next_text(&mut ws).await;
        ws.send(Message::text(r#"44{"message":"Not authorized"}"#))
            .await
            .unwrap();
        let _ = next_text(&mut ws).await;
    });

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    let mut controller = controller(handle);

    let event = recv(&mut events).await.unwrap();
    match &event {
        TransportEvent::ConnectError { message } => assert!(message.contains("Not authorized")),
        other => panic!("expected connect error, got {:?}", other),
    }
    controller.handle_event(event);

    let entries = controller.sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, MessageKind::System);
    assert!(entries[0].text.starts_with("Ошибка подключения: "));
    assert!(entries[0].text.contains("Not authorized"));
}

#[tokio::test]
async fn test_refused_port_becomes_notice() {
    let (listener, url) = bind().await;
    drop(listener);

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    let mut controller = controller(handle);

    let event = recv(&mut events).await.unwrap();
    assert_eq!(event.name(), "connect_error");
    controller.handle_event(event);

    assert_eq!(controller.sink().len(), 1);
    assert_eq!(controller.sink().entries()[0].kind, MessageKind::System);
    assert!(recv(&mut events).await.is_none());
}

#[tokio::test]
async fn test_client_close_sends_disconnect_packet() {
    let (listener, url) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        handshake(&mut ws, "sid-close").await;
        next_text(&mut ws).await
    });

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    assert!(matches!(
        recv(&mut events).await,
        Some(TransportEvent::Connected { .. })
    ));

    handle.close();

    assert_eq!(
        timeout(WAIT, server).await.unwrap().unwrap().as_deref(),
        Some("41")
    );
    assert_eq!(
        recv(&mut events).await,
        Some(TransportEvent::Disconnected {
            reason: reason::CLIENT_DISCONNECT.to_string()
        })
    );
    assert!(recv(&mut events).await.is_none());
}

#[tokio::test]
async fn test_reconnects_after_transport_close() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        handshake(&mut ws, "sid-a").await;
        ws.close(None).await.unwrap();
        drop(ws);

        let mut ws = accept(&listener).await;
        handshake(&mut ws, "sid-b").await;
        let _ = next_text(&mut ws).await;
    });

    let retry = RetryConfig {
        max_attempts: Some(3),
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter: false,
    };
    let config = ClientConfig::new(&url)
        .with_reconnect(retry)
        .with_connect_timeout(WAIT);
    let (handle, mut events) = SocketClient::connect(config);
    let mut controller = controller(handle.clone());

    let mut seen = Vec::new();
    loop {
        let event = recv(&mut events).await.unwrap();
        seen.push(event.name());
        let done = matches!(
            &event,
            TransportEvent::Connected { session_id } if session_id == "sid-b"
        );
        controller.handle_event(event);
        if done {
            break;
        }
    }

    assert_eq!(
        seen,
        vec!["connect", "disconnect", "reconnect_attempt", "connect"]
    );
    assert_eq!(controller.sink().count_kind(MessageKind::System), 1);
    assert_eq!(controller.status().session_id(), Some("sid-b"));

    handle.close();
}

#[tokio::test]
async fn test_huge_ping_interval_keeps_session_alive() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::text(
            r#"0{"sid":"e","upgrades":[],"pingInterval":18446744073709551615,"pingTimeout":20000}"#,
        ))
        .await
        .unwrap();
        assert_eq!(next_text(&mut ws).await.as_deref(), Some("40"));
        ws.send(Message::text(r#"40{"sid":"huge"}"#)).await.unwrap();
        ws.send(Message::text("41")).await.unwrap();
        let _ = next_text(&mut ws).await;
    });

    let (handle, mut events) = SocketClient::connect(no_retry(&url));
    let mut controller = controller(handle);

    let connected = recv(&mut events).await.unwrap();
    assert_eq!(
        connected,
        TransportEvent::Connected {
            session_id: "huge".to_string()
        }
    );
    controller.handle_event(connected);

    let disconnected = recv(&mut events).await.unwrap();
    assert_eq!(
        disconnected,
        TransportEvent::Disconnected {
            reason: reason::SERVER_DISCONNECT.to_string()
        }
    );
    controller.handle_event(disconnected);
    assert_eq!(controller.sink().count_kind(MessageKind::System), 1);
}
