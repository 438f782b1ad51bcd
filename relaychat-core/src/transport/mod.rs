//! Connection to the chat relay.
//!
//! [`SocketClient::connect`] spawns a task that owns the websocket and
//! reports everything through [`TransportEvent`]s. Callers never touch the
//! socket directly.

mod client;
mod event;
mod url;

pub use client::{ClientConfig, SocketClient, SocketHandle};
pub use event::{reason, TransportEvent};
pub use url::endpoint_url;
