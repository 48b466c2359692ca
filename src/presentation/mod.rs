// Presentation layer - HTTP handlers, page state and terminal UI
pub mod app_state;
pub mod handlers;
pub mod page_state;
pub mod tui;
