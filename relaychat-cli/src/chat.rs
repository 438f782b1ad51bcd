use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use relaychat_core::transport::reason;
use relaychat_core::{
    ChatConfig, ChatController, ClientConfig, SendOutcome, SocketClient, SocketHandle,
    TransportEvent,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::printer::StdoutSink;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type Controller<W> = ChatController<StdoutSink<W>, SocketHandle>;

/// Interactive line mode: every stdin line is one message, EOF ends the session.
pub async fn run_chat(config: &ChatConfig) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let sink = StdoutSink::stdout(config.tui.show_timestamps);
    run_session(config, stdin, sink).await
}

pub async fn run_session<R, W>(config: &ChatConfig, input: R, sink: StdoutSink<W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let client_config = ClientConfig::from_chat_config(config)?;
    let (handle, mut events) = SocketClient::connect(client_config);
    let mut controller = ChatController::from_config(sink, handle, config);

    status(&format!("connecting to {}", config.server.url));

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(mut line) => send_line(&controller, &mut line),
                None => {
                    tracing::debug!("stdin closed");
                    break;
                }
            },
            event = events.recv() => match event {
                Some(event) => dispatch(&mut controller, event),
                None => {
                    status("connection closed");
                    return Ok(());
                }
            },
        }
    }

    controller.outbound().close();
    drain(&mut controller, &mut events).await;
    Ok(())
}

fn send_line<W: Write>(controller: &Controller<W>, line: &mut String) {
    if controller.send_message(line) == SendOutcome::Failed {
        status("message not sent: connection is gone");
    }
}

fn dispatch<W: Write>(controller: &mut Controller<W>, event: TransportEvent) {
    match &event {
        TransportEvent::Connected { session_id } => {
            status(&format!("connected (sid {})", session_id))
        }
        TransportEvent::Reconnecting { attempt, delay } => status(&format!(
            "reconnecting in {} ms (attempt {})",
            delay.as_millis(),
            attempt
        )),
        _ => {}
    }
    controller.handle_event(event);
}

/// Processes what the transport still reports after a close request.
async fn drain<W: Write>(
    controller: &mut Controller<W>,
    events: &mut UnboundedReceiver<TransportEvent>,
) {
    let pending = async {
        while let Some(event) = events.recv().await {
            // we asked for it; no "connection lost" notice
            let requested = matches!(
                &event,
                TransportEvent::Disconnected { reason: why } if why == reason::CLIENT_DISCONNECT
            );
            if requested {
                status("disconnected");
                continue;
            }
            dispatch(controller, event);
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, pending).await.is_err() {
        tracing::warn!("Transport did not shut down in time");
    }
}

fn status(message: &str) {
    eprintln!("{} {}", "*".blue().bold(), message.dimmed());
}
