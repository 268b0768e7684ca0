//! UI layer for desktop GUI: app shell and chart widgets.

pub mod app;
pub mod charts;

pub use app::InventoryApp;
