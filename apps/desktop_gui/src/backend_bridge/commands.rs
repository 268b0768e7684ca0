//! Backend commands queued from UI to backend worker.

use client_core::ProductDraft;
use shared::domain::ProductId;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Refresh,
    Submit {
        draft: ProductDraft,
        editing: Option<ProductId>,
    },
    Delete {
        id: ProductId,
    },
    Undo {
        id: ProductId,
    },
    UndoLatest,
    DismissNotices,
    ExportCsv {
        path: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Submit { editing: None, .. } => "create_product",
            Self::Submit { editing: Some(_), .. } => "update_product",
            Self::Delete { .. } => "delete_product",
            Self::Undo { .. } => "undo_delete",
            Self::UndoLatest => "undo_latest",
            Self::DismissNotices => "dismiss_notices",
            Self::ExportCsv { .. } => "export_csv",
        }
    }
}
