mod footer;
mod header;
mod input;
mod transcript;

pub use footer::Footer;
pub use header::Header;
pub use input::InputBar;
pub use transcript::TranscriptView;
