pub mod app;
pub mod events;
pub mod input;
pub mod theme;
pub mod ui;
