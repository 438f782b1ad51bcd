mod chat;
mod traits;
mod transcript;

pub use chat::{
    ChatController, ConnectionStatus, SendOutcome, CHAT_MESSAGE_EVENT, USER_MESSAGE_EVENT,
};
pub use traits::{InputField, Outbound, RenderSink};
pub use transcript::Transcript;
