//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, HttpInventoryBackend, InventoryController};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let backend = match HttpInventoryBackend::from_settings(&settings) {
                Ok(backend) => backend,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to build inventory backend: {err}");
                    return;
                }
            };
            let controller =
                InventoryController::new(Arc::new(backend), settings.controller_options());
            forward_snapshots(&controller, ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Connected to {}",
                settings.api_base_url
            )));

            spawn_command(&controller, &ui_tx, BackendCommand::Refresh);
            // Each command runs as its own task so an Undo never waits behind a slow load.
            while let Ok(cmd) = cmd_rx.recv() {
                spawn_command(&controller, &ui_tx, cmd);
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

fn spawn_command(controller: &Arc<InventoryController>, ui_tx: &Sender<UiEvent>, cmd: BackendCommand) {
    let controller = Arc::clone(controller);
    let ui_tx = ui_tx.clone();
    tokio::spawn(async move { handle_command(&controller, &ui_tx, cmd).await });
}

/// Pushes a fresh snapshot to the UI after every controller event.
fn forward_snapshots(controller: &Arc<InventoryController>, ui_tx: Sender<UiEvent>) {
    let controller = Arc::clone(controller);
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    let snapshot = controller.snapshot().await;
                    // A full queue only drops a snapshot that the next one supersedes.
                    if let Err(TrySendError::Disconnected(_)) =
                        ui_tx.try_send(UiEvent::Snapshot(snapshot))
                    {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

pub(crate) async fn handle_command(
    controller: &InventoryController,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) {
    match cmd {
        BackendCommand::Refresh => {
            // Failures already surface as the controller's error notice.
            if let Err(err) = controller.load().await {
                tracing::debug!("refresh failed: {err}");
            }
        }
        BackendCommand::Submit { draft, editing } => {
            match controller.submit(&draft, editing).await {
                Ok(product) => {
                    let _ = ui_tx.try_send(UiEvent::Submitted {
                        product,
                        was_editing: editing.is_some(),
                    });
                }
                Err(err) => {
                    tracing::debug!("submit failed: {err}");
                    let _ = ui_tx.try_send(UiEvent::SubmitFailed);
                }
            }
        }
        BackendCommand::Delete { id } => {
            if !controller.delete(id).await {
                let _ = ui_tx.try_send(UiEvent::Info(format!("Product {id} is no longer listed")));
            }
        }
        BackendCommand::Undo { id } => {
            controller.undo_delete(id).await;
        }
        BackendCommand::UndoLatest => {
            if controller.undo_latest().await.is_none() {
                let _ = ui_tx.try_send(UiEvent::Info("Nothing to undo".to_string()));
            }
        }
        BackendCommand::DismissNotices => controller.clear_notices().await,
        BackendCommand::ExportCsv { path } => match controller.export_csv_to(&path).await {
            Ok(rows) => {
                let _ = ui_tx.try_send(UiEvent::Exported { path, rows });
            }
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_inventory_error(
                    UiErrorContext::Export,
                    &err,
                )));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use client_core::{BackendError, ControllerOptions, InventoryBackend, ProductDraft};
    use crossbeam_channel::unbounded;
    use shared::domain::{Product, ProductId};
    use tokio::sync::Mutex;

    struct MemoryBackend {
        products: Mutex<Vec<Product>>,
    }

    #[async_trait]
    impl InventoryBackend for MemoryBackend {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            Ok(self.products.lock().await.clone())
        }

        async fn create_product(&self, product: &Product) -> Result<Product, BackendError> {
            self.products.lock().await.push(product.clone());
            Ok(product.clone())
        }

        async fn update_product(
            &self,
            id: ProductId,
            product: &Product,
        ) -> Result<Product, BackendError> {
            let mut products = self.products.lock().await;
            if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
                *existing = product.clone();
            }
            Ok(product.clone())
        }

        async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
            self.products.lock().await.retain(|p| p.id != id);
            Ok(())
        }
    }

    fn controller() -> Arc<InventoryController> {
        let backend = Arc::new(MemoryBackend {
            products: Mutex::new(Vec::new()),
        });
        InventoryController::new(backend, ControllerOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn submit_reports_success_and_failure_to_the_ui() {
        let controller = controller();
        let (ui_tx, ui_rx) = unbounded();

        let draft = ProductDraft {
            id: "7".into(),
            name: "Nothing Phone 2".into(),
            description: String::new(),
            price: "599".into(),
            quantity: "4".into(),
        };
        handle_command(
            &controller,
            &ui_tx,
            BackendCommand::Submit {
                draft: draft.clone(),
                editing: None,
            },
        )
        .await;
        match ui_rx.try_recv() {
            Ok(UiEvent::Submitted {
                product,
                was_editing,
            }) => {
                assert_eq!(product.id, ProductId(7));
                assert!(!was_editing);
            }
            _ => panic!("expected a submitted event"),
        }

        let invalid = ProductDraft {
            price: "free".into(),
            ..draft
        };
        handle_command(
            &controller,
            &ui_tx,
            BackendCommand::Submit {
                draft: invalid,
                editing: None,
            },
        )
        .await;
        assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::SubmitFailed)));
        assert!(controller.snapshot().await.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn exporting_an_empty_store_is_an_export_error() {
        let controller = controller();
        let (ui_tx, ui_rx) = unbounded();

        handle_command(
            &controller,
            &ui_tx,
            BackendCommand::ExportCsv {
                path: std::env::temp_dir().join("tracify-gui-empty.csv"),
            },
        )
        .await;
        match ui_rx.try_recv() {
            Ok(UiEvent::Error(err)) => {
                assert_eq!(err.context(), UiErrorContext::Export);
                assert_eq!(err.message(), "No products to export");
            }
            _ => panic!("expected an export error"),
        }
    }
}
