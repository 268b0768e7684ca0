//! Worker thread that owns the tokio runtime and the inventory controller.

pub mod commands;
pub mod runtime;
