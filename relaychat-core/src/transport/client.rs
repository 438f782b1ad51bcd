//! Socket.IO client over a single websocket, thin layer on `tokio-tungstenite`.
//!
//! One spawned task owns the socket. The UI talks to it through a
//! [`SocketHandle`] (commands in) and an event receiver (events out), so the
//! UI never blocks on the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::controller::Outbound;
use crate::error::{ChatError, ChatResult, RetryConfig};
use crate::protocol::{encode_frame, EnginePacket, OpenPayload, SocketPacket};

use super::event::{reason, TransportEvent};
use super::url::endpoint_url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FAR_FUTURE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Everything the transport task needs to know up front.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full websocket endpoint, see [`endpoint_url`].
    pub endpoint: String,
    pub namespace: String,
    pub connect_timeout: Duration,
    /// `None` disables reconnection.
    pub reconnect: Option<RetryConfig>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            namespace: crate::protocol::DEFAULT_NAMESPACE.to_string(),
            connect_timeout: Duration::from_secs(20),
            reconnect: Some(RetryConfig::for_reconnection()),
        }
    }

    pub fn from_chat_config(config: &ChatConfig) -> ChatResult<Self> {
        Ok(Self {
            endpoint: endpoint_url(&config.server.url, &config.server.path)?,
            namespace: config.server.namespace.clone(),
            connect_timeout: Duration::from_secs(config.server.connect_timeout_secs),
            reconnect: config
                .reconnect
                .enabled
                .then(|| config.reconnect.retry_config()),
        })
    }

    pub fn without_reconnect(mut self) -> Self {
        self.reconnect = None;
        self
    }

    pub fn with_reconnect(mut self, retry: RetryConfig) -> Self {
        self.reconnect = Some(retry);
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

#[derive(Debug)]
enum Command {
    Emit(String),
    Close,
}

/// Cloneable handle to the transport task.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
}

impl SocketHandle {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Leaves the namespace and stops reconnecting. Idempotent.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close);
    }

    /// True once the transport task has exited.
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}

impl Outbound for SocketHandle {
    /// Queues the event. While disconnected, frames wait in order and go
    /// out right after the next successful connect.
    fn emit(&self, event: &str, payload: Value) -> ChatResult<()> {
        let frame = encode_frame(&SocketPacket::event(event, payload));
        if !self.is_connected() {
            debug!(event = %event, "Not connected, buffering event");
        }
        self.cmd_tx
            .send(Command::Emit(frame))
            .map_err(|_| ChatError::TransportStopped)
    }
}

pub struct SocketClient;

impl SocketClient {
    /// Spawns the transport task on the current tokio runtime and starts
    /// connecting right away.
    pub fn connect(
        config: ClientConfig,
    ) -> (SocketHandle, mpsc::UnboundedReceiver<TransportEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = ClientTask {
            config,
            cmd_rx,
            events: event_tx,
            connected: connected.clone(),
            pending: VecDeque::new(),
        };
        tokio::spawn(task.run());

        (SocketHandle { cmd_tx, connected }, event_rx)
    }
}

/// How an established session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    ClientClosed,
    ServerDisconnect,
    HandlesDropped,
    Lost(&'static str),
}

enum Flow {
    Continue,
    End(SessionEnd),
}

enum Wait {
    Elapsed,
    Stop,
}

struct ClientTask {
    config: ClientConfig,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: Arc<AtomicBool>,
    pending: VecDeque<String>,
}

impl ClientTask {
    fn report(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    async fn run(mut self) {
        let mut attempt: u32 = 0;

        loop {
            match self.open_session().await {
                Ok((ws, open, session_id)) => {
                    attempt = 0;
                    self.connected.store(true, Ordering::Relaxed);
                    self.report(TransportEvent::Connected { session_id });

                    let end = self.drive(ws, &open).await;
                    self.connected.store(false, Ordering::Relaxed);

                    match end {
                        SessionEnd::ClientClosed => {
                            self.report(TransportEvent::Disconnected {
                                reason: reason::CLIENT_DISCONNECT.to_string(),
                            });
                            return;
                        }
                        SessionEnd::ServerDisconnect => {
                            self.report(TransportEvent::Disconnected {
                                reason: reason::SERVER_DISCONNECT.to_string(),
                            });
                            return;
                        }
                        SessionEnd::HandlesDropped => return,
                        SessionEnd::Lost(why) => {
                            self.report(TransportEvent::Disconnected {
                                reason: why.to_string(),
                            });
                        }
                    }
                }
                Err(e) => {
                    e.log();
                    self.report(TransportEvent::ConnectError {
                        message: e.notice_text(),
                    });
                }
            }

            let Some(retry) = self.config.reconnect.clone() else {
                return;
            };
            if retry.is_exhausted(attempt) {
                warn!(attempts = attempt, "Giving up reconnecting");
                return;
            }

            let delay = retry.delay_for_attempt(attempt);
            attempt += 1;
            self.report(TransportEvent::Reconnecting { attempt, delay });

            if let Wait::Stop = self.wait_before_retry(delay).await {
                return;
            }
        }
    }

    /// Sleeps out the backoff while still accepting commands.
    async fn wait_before_retry(&mut self, delay: Duration) -> Wait {
        let deadline = sleep(delay);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return Wait::Elapsed,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Emit(frame)) => self.pending.push_back(frame),
                    Some(Command::Close) | None => return Wait::Stop,
                },
            }
        }
    }

    async fn open_session(&mut self) -> ChatResult<(WsStream, OpenPayload, String)> {
        let endpoint = self.config.endpoint.clone();
        let limit = self.config.connect_timeout;

        match timeout(limit, self.handshake(&endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::ConnectionFailed {
                url: endpoint,
                message: "timeout".to_string(),
            }),
        }
    }

    async fn handshake(&self, endpoint: &str) -> ChatResult<(WsStream, OpenPayload, String)> {
        debug!(url = %endpoint, "Opening websocket");
        let (mut ws, _) = connect_async(endpoint).await.map_err(|e| match ChatError::from(e) {
            rejected @ ChatError::HandshakeRejected { .. } => rejected,
            other => ChatError::ConnectionFailed {
                url: endpoint.to_string(),
                message: other.notice_text(),
            },
        })?;

        let open = loop {
            match next_engine_packet(&mut ws).await? {
                EnginePacket::Open(open) => break open,
                EnginePacket::Noop => continue,
                other => {
                    return Err(ChatError::UnexpectedPacket(other.encode()));
                }
            }
        };
        debug!(engine_sid = %open.sid, ping_interval = open.ping_interval, "Engine open");

        let namespace = self.config.namespace.as_str();
        ws.send(Message::text(encode_frame(&SocketPacket::connect(namespace))))
            .await?;

        loop {
            match next_engine_packet(&mut ws).await? {
                EnginePacket::Ping(data) => {
                    ws.send(Message::text(EnginePacket::Pong(data).encode()))
                        .await?;
                }
                EnginePacket::Message(body) => {
                    let packet = SocketPacket::decode(&body)?;
                    if packet.namespace() != namespace {
                        continue;
                    }
                    match packet {
                        SocketPacket::Connect { .. } => {
                            let sid = packet
                                .session_id()
                                .map(str::to_string)
                                .unwrap_or_else(|| open.sid.clone());
                            return Ok((ws, open, sid));
                        }
                        SocketPacket::ConnectError { .. } => {
                            let message = packet
                                .error_message()
                                .unwrap_or_else(|| "connection refused".to_string());
                            return Err(ChatError::ConnectionRefused(message));
                        }
                        other => {
                            return Err(ChatError::UnexpectedPacket(other.encode()));
                        }
                    }
                }
                EnginePacket::Close => {
                    return Err(ChatError::ConnectionClosed(
                        "server closed during handshake".to_string(),
                    ));
                }
                _ => continue,
            }
        }
    }

    /// Runs an established session until it ends one way or another.
    async fn drive(&mut self, mut ws: WsStream, open: &OpenPayload) -> SessionEnd {
        let heartbeat = Duration::from_millis(open.heartbeat_deadline_ms());
        let mut last_seen = Instant::now();

        while let Some(frame) = self.pending.pop_front() {
            if let Err(e) = ws.send(Message::text(frame.clone())).await {
                warn!(error = %e, "Failed to flush buffered event");
                self.pending.push_front(frame);
                return SessionEnd::Lost(reason::TRANSPORT_ERROR);
            }
        }

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Emit(frame)) => {
                        if let Err(e) = ws.send(Message::text(frame.clone())).await {
                            warn!(error = %e, "Failed to send event");
                            self.pending.push_back(frame);
                            return SessionEnd::Lost(reason::TRANSPORT_ERROR);
                        }
                    }
                    Some(Command::Close) => {
                        let namespace = self.config.namespace.as_str();
                        let bye = encode_frame(&SocketPacket::disconnect(namespace));
                        let _ = ws.send(Message::text(bye)).await;
                        let _ = ws.close(None).await;
                        info!("Closed connection");
                        return SessionEnd::ClientClosed;
                    }
                    None => {
                        let _ = ws.close(None).await;
                        return SessionEnd::HandlesDropped;
                    }
                },
                msg = ws.next() => {
                    last_seen = Instant::now();
                    match msg {
                        None => return SessionEnd::Lost(reason::TRANSPORT_CLOSE),
                        Some(Err(e)) => {
                            warn!(error = %e, "Websocket error");
                            return SessionEnd::Lost(reason::TRANSPORT_ERROR);
                        }
                        Some(Ok(Message::Close(_))) => return SessionEnd::Lost(reason::TRANSPORT_CLOSE),
                        Some(Ok(Message::Text(text))) => {
                            if let Flow::End(end) = self.on_frame(&mut ws, text.as_str()).await {
                                return end;
                            }
                        }
                        Some(Ok(_)) => {}
                    }
                }
                _ = sleep_until(heartbeat_deadline(last_seen, heartbeat)) => {
                    ChatError::PingTimeout(open.heartbeat_deadline_ms()).log();
                    return SessionEnd::Lost(reason::PING_TIMEOUT);
                }
            }
        }
    }

    async fn on_frame(&mut self, ws: &mut WsStream, frame: &str) -> Flow {
        let packet = match EnginePacket::decode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable frame");
                return Flow::Continue;
            }
        };

        match packet {
            EnginePacket::Ping(data) => {
                if ws
                    .send(Message::text(EnginePacket::Pong(data).encode()))
                    .await
                    .is_err()
                {
                    return Flow::End(SessionEnd::Lost(reason::TRANSPORT_ERROR));
                }
                Flow::Continue
            }
            EnginePacket::Close => Flow::End(SessionEnd::Lost(reason::TRANSPORT_CLOSE)),
            EnginePacket::Message(body) => self.on_socket_packet(&body),
            _ => Flow::Continue,
        }
    }

    fn on_socket_packet(&mut self, body: &str) -> Flow {
        let packet = match SocketPacket::decode(body) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Ignoring undecodable packet");
                return Flow::Continue;
            }
        };

        if packet.namespace() != self.config.namespace {
            debug!(namespace = %packet.namespace(), "Ignoring packet for other namespace");
            return Flow::Continue;
        }

        match packet {
            SocketPacket::Event { .. } => match packet.into_event() {
                Ok((name, payload)) => {
                    self.report(TransportEvent::Event { name, payload });
                    Flow::Continue
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed event");
                    Flow::Continue
                }
            },
            SocketPacket::Disconnect { .. } => Flow::End(SessionEnd::ServerDisconnect),
            SocketPacket::ConnectError { .. } => {
                warn!(error = ?packet.error_message(), "Connect error after handshake");
                Flow::Continue
            }
            SocketPacket::Connect { .. } | SocketPacket::Ack { .. } => Flow::Continue,
        }
    }
}

/// Server-supplied intervals can be absurd; past the end of the clock we
/// wait for a year instead.
fn heartbeat_deadline(last_seen: Instant, heartbeat: Duration) -> Instant {
    last_seen
        .checked_add(heartbeat)
        .unwrap_or_else(|| Instant::now() + FAR_FUTURE)
}

async fn next_engine_packet(ws: &mut WsStream) -> ChatResult<EnginePacket> {
    loop {
        match ws.next().await {
            None => {
                return Err(ChatError::ConnectionClosed(
                    "server closed during handshake".to_string(),
                ))
            }
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(Message::Text(text))) => return Ok(EnginePacket::decode(text.as_str())?),
            Some(Ok(Message::Close(_))) => {
                return Err(ChatError::ConnectionClosed(
                    "server closed during handshake".to_string(),
                ))
            }
            Some(Ok(_)) => continue,
        }
    }
}
