//! UI/backend events and error modeling for desktop GUI controller.

use std::path::PathBuf;

use client_core::{BackendError, InventoryError, InventorySnapshot};
use shared::domain::Product;

pub enum UiEvent {
    Info(String),
    Snapshot(InventorySnapshot),
    Submitted { product: Product, was_editing: bool },
    SubmitFailed,
    Exported { path: PathBuf, rows: usize },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Backend,
    Validation,
    Export,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Refresh,
    Submit,
    Export,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
        }
    }

    pub fn from_inventory_error(context: UiErrorContext, err: &InventoryError) -> Self {
        let category = match err {
            InventoryError::Fetch { source, .. } | InventoryError::Mutation { source, .. } => {
                match source {
                    BackendError::Transport { .. } | BackendError::InvalidUrl { .. } => {
                        UiErrorCategory::Transport
                    }
                    BackendError::Rejected { .. } | BackendError::Decode { .. } => {
                        UiErrorCategory::Backend
                    }
                }
            }
            InventoryError::Validation(_) => UiErrorCategory::Validation,
            InventoryError::Export(_) => UiErrorCategory::Export,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Startup and export failures have no inline notice, so they get a banner.
    pub fn wants_banner(&self) -> bool {
        matches!(
            self.context,
            UiErrorContext::BackendStartup | UiErrorContext::Export
        )
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Backend => "Backend",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Export => "Export",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
