// Presentation layer - Terminal UI and input handling
pub mod app_state;
pub mod chart;
pub mod handlers;
pub mod ui;
