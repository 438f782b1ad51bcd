use serde_json::Value;

use crate::error::ChatResult;
use crate::models::ChatMessage;

/// Whatever displays the transcript: a terminal pane, stdout, a test double.
pub trait RenderSink {
    fn append_entry(&mut self, entry: &ChatMessage);

    /// Bring the newest entry into view.
    fn scroll_to_end(&mut self);
}

/// The editable text the user composes a message in.
pub trait InputField {
    fn value(&self) -> &str;

    fn clear(&mut self);
}

impl InputField for String {
    fn value(&self) -> &str {
        self.as_str()
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

/// Outbound half of the connection. Sends are fire-and-forget: `Ok` means
/// the event was handed to the transport, not that the server got it.
pub trait Outbound {
    fn emit(&self, event: &str, payload: Value) -> ChatResult<()>;
}

impl<T: Outbound + ?Sized> Outbound for &T {
    fn emit(&self, event: &str, payload: Value) -> ChatResult<()> {
        (**self).emit(event, payload)
    }
}

impl<T: Outbound + ?Sized> Outbound for std::sync::Arc<T> {
    fn emit(&self, event: &str, payload: Value) -> ChatResult<()> {
        (**self).emit(event, payload)
    }
}
