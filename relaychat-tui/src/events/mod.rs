mod handler;

pub use handler::{Action, ClickableRegion, EventHandler, ScrollDirection};
