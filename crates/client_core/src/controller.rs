use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Weak},
    time::Duration,
};

use shared::domain::{Product, ProductId};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    backend::{BackendError, InventoryBackend},
    deferred::DeferredAction,
    draft::{ProductDraft, ValidationError},
    export::{render_csv, write_csv, ExportError},
    store::ProductStore,
    view::{project, ViewParams},
};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch products";
pub const OPERATION_FAILED_MESSAGE: &str = "Operation failed";
pub const DELETE_FAILED_MESSAGE: &str = "Delete failed";
pub const CREATED_MESSAGE: &str = "Product created successfully";
pub const UPDATED_MESSAGE: &str = "Product updated successfully";
pub const UNDONE_MESSAGE: &str = "Delete undone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub undo_window: Duration,
    pub notice_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            undo_window: Duration::from_millis(5000),
            notice_ttl: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    /// Listing failed; the store still holds the previous contents.
    #[error("{message}")]
    Fetch {
        message: String,
        #[source]
        source: BackendError,
    },
    /// Create/update/delete rejected; form state is left for a retry.
    #[error("{message}")]
    Mutation {
        message: String,
        #[source]
        source: BackendError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPhase {
    /// Hidden from view, undo still possible.
    AwaitingUndo,
    /// Undo window elapsed, backend delete in flight.
    Confirming,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletionView {
    pub product: Product,
    pub phase: DeletionPhase,
}

#[derive(Debug, Clone)]
pub enum InventoryEvent {
    StoreReplaced { count: usize },
    LoadingChanged(bool),
    NoticeChanged { kind: NoticeKind, text: Option<String> },
    ProductSaved { product: Product, created: bool },
    DeletionPending { product: Product },
    DeletionUndone { id: ProductId },
    DeletionConfirmed { id: ProductId },
    DeletionFailed { id: ProductId, message: String },
}

/// Consistent copy of the controller state for presentation layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySnapshot {
    /// Visible products in store order.
    pub products: Vec<Product>,
    /// Oldest first.
    pub pending: Vec<PendingDeletionView>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

impl InventorySnapshot {
    pub fn project(&self, params: &ViewParams) -> Vec<Product> {
        project(&self.products, params)
    }

    pub fn total(&self) -> usize {
        self.products.len()
    }

    pub fn undoable(&self) -> impl Iterator<Item = &Product> {
        self.pending
            .iter()
            .filter(|pending| pending.phase == DeletionPhase::AwaitingUndo)
            .map(|pending| &pending.product)
    }
}

struct ActiveNotice {
    text: String,
    generation: u64,
    expiry: DeferredAction,
}

struct PendingDeletion {
    product: Product,
    phase: DeletionPhase,
    timer: Option<DeferredAction>,
    sequence: u64,
}

struct InventoryState {
    store: ProductStore,
    pending: HashMap<ProductId, PendingDeletion>,
    message: Option<ActiveNotice>,
    error: Option<ActiveNotice>,
    inflight_loads: usize,
    notice_generation: u64,
    deletion_sequence: u64,
}

impl InventoryState {
    fn notice_slot(&mut self, kind: NoticeKind) -> &mut Option<ActiveNotice> {
        match kind {
            NoticeKind::Info => &mut self.message,
            NoticeKind::Error => &mut self.error,
        }
    }
}

/// Single owner of the client-side inventory state.
///
/// All mutations go through this type. The state lock is never held across a
/// backend call; timers hold only a weak reference back to the controller.
pub struct InventoryController {
    backend: Arc<dyn InventoryBackend>,
    options: ControllerOptions,
    inner: Mutex<InventoryState>,
    events: broadcast::Sender<InventoryEvent>,
    weak_self: Weak<InventoryController>,
}

impl InventoryController {
    pub fn new(backend: Arc<dyn InventoryBackend>, options: ControllerOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new_cyclic(|weak_self| Self {
            backend,
            options,
            inner: Mutex::new(InventoryState {
                store: ProductStore::default(),
                pending: HashMap::new(),
                message: None,
                error: None,
                inflight_loads: 0,
                notice_generation: 0,
                deletion_sequence: 0,
            }),
            events,
            weak_self: weak_self.clone(),
        })
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: InventoryEvent) {
        let _ = self.events.send(event);
    }

    pub async fn snapshot(&self) -> InventorySnapshot {
        let state = self.inner.lock().await;
        let mut pending: Vec<&PendingDeletion> = state.pending.values().collect();
        pending.sort_by_key(|pending| pending.sequence);

        InventorySnapshot {
            products: state.store.visible(),
            pending: pending
                .into_iter()
                .map(|pending| PendingDeletionView {
                    product: pending.product.clone(),
                    phase: pending.phase,
                })
                .collect(),
            message: state.message.as_ref().map(|notice| notice.text.clone()),
            error: state.error.as_ref().map(|notice| notice.text.clone()),
            loading: state.inflight_loads > 0,
        }
    }

    pub async fn projection(&self, params: &ViewParams) -> Vec<Product> {
        let state = self.inner.lock().await;
        project(&state.store.visible(), params)
    }

    pub async fn product(&self, id: ProductId) -> Option<Product> {
        let state = self.inner.lock().await;
        state.store.get_visible(id).cloned()
    }

    /// Replaces the store with the backend's list. Overlapping calls are not
    /// deduplicated: whichever response resolves last wins.
    pub async fn load(&self) -> Result<usize, InventoryError> {
        {
            let mut state = self.inner.lock().await;
            state.inflight_loads += 1;
            if state.inflight_loads == 1 {
                self.emit(InventoryEvent::LoadingChanged(true));
            }
        }

        let result = self.backend.list_products().await;

        let mut state = self.inner.lock().await;
        state.inflight_loads = state.inflight_loads.saturating_sub(1);
        let outcome = match result {
            Ok(products) => {
                state.store.replace(products);
                let count = state.store.visible_len();
                self.clear_notice(&mut state, NoticeKind::Error);
                debug!("store replaced with {count} visible products");
                self.emit(InventoryEvent::StoreReplaced { count });
                Ok(count)
            }
            Err(source) => {
                warn!("failed to fetch products: {source}");
                self.set_notice(&mut state, NoticeKind::Error, FETCH_FAILED_MESSAGE);
                Err(InventoryError::Fetch {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                    source,
                })
            }
        };
        if state.inflight_loads == 0 {
            self.emit(InventoryEvent::LoadingChanged(false));
        }
        outcome
    }

    /// Validates the form and dispatches to `create` or `update`.
    pub async fn submit(
        &self,
        draft: &ProductDraft,
        editing: Option<ProductId>,
    ) -> Result<Product, InventoryError> {
        let product = match draft.validate() {
            Ok(product) => product,
            Err(err) => {
                let mut state = self.inner.lock().await;
                self.set_notice(&mut state, NoticeKind::Error, err.to_string());
                return Err(err.into());
            }
        };

        match editing {
            Some(id) => self.update(id, product).await,
            None => self.create(product).await,
        }
    }

    pub async fn create(&self, product: Product) -> Result<Product, InventoryError> {
        self.clear_notices().await;
        match self.backend.create_product(&product).await {
            Ok(saved) => {
                info!("created product {} ({})", saved.id, saved.name);
                self.mutation_succeeded(saved.clone(), true).await;
                Ok(saved)
            }
            Err(source) => Err(self.mutation_failed(source).await),
        }
    }

    /// Updates an existing product; the payload id is forced to `id`.
    pub async fn update(
        &self,
        id: ProductId,
        mut product: Product,
    ) -> Result<Product, InventoryError> {
        product.id = id;
        self.clear_notices().await;
        match self.backend.update_product(id, &product).await {
            Ok(saved) => {
                info!("updated product {id}");
                self.mutation_succeeded(saved.clone(), false).await;
                Ok(saved)
            }
            Err(source) => Err(self.mutation_failed(source).await),
        }
    }

    async fn mutation_succeeded(&self, product: Product, created: bool) {
        {
            let mut state = self.inner.lock().await;
            let text = if created {
                CREATED_MESSAGE
            } else {
                UPDATED_MESSAGE
            };
            self.set_notice(&mut state, NoticeKind::Info, text);
            self.emit(InventoryEvent::ProductSaved { product, created });
        }
        // A failed refresh is reported through the error notice on its own.
        let _ = self.load().await;
    }

    async fn mutation_failed(&self, source: BackendError) -> InventoryError {
        let message = source.user_message(OPERATION_FAILED_MESSAGE);
        warn!("mutation rejected: {source}");
        let mut state = self.inner.lock().await;
        self.set_notice(&mut state, NoticeKind::Error, message.clone());
        InventoryError::Mutation { message, source }
    }

    /// Optimistically hides a product and schedules its backend deletion
    /// after the undo window. Returns false when there is nothing to delete.
    pub async fn delete(&self, id: ProductId) -> bool {
        let mut state = self.inner.lock().await;
        if state.pending.contains_key(&id) {
            debug!("delete ignored: product {id} already pending");
            return false;
        }
        let Some(product) = state.store.hide(id) else {
            debug!("delete ignored: product {id} is not visible");
            return false;
        };

        let weak = self.weak_self.clone();
        let timer = DeferredAction::schedule(self.options.undo_window, async move {
            if let Some(controller) = weak.upgrade() {
                controller.confirm_delete(id).await;
            }
        });

        state.deletion_sequence += 1;
        let sequence = state.deletion_sequence;
        state.pending.insert(
            id,
            PendingDeletion {
                product: product.clone(),
                phase: DeletionPhase::AwaitingUndo,
                timer: Some(timer),
                sequence,
            },
        );
        self.set_notice(
            &mut state,
            NoticeKind::Info,
            format!("Deleted \"{}\". Undo?", product.name),
        );
        debug!("product {id} pending deletion for {:?}", self.options.undo_window);
        self.emit(InventoryEvent::DeletionPending { product });
        true
    }

    /// Cancels a pending deletion and restores the product. No backend call is made.
    pub async fn undo_delete(&self, id: ProductId) -> bool {
        let mut state = self.inner.lock().await;
        match state.pending.get(&id) {
            Some(pending) if pending.phase == DeletionPhase::AwaitingUndo => {}
            _ => return false,
        }
        let Some(pending) = state.pending.remove(&id) else {
            return false;
        };
        if let Some(timer) = &pending.timer {
            timer.cancel();
        }
        state.store.reveal(id);
        self.set_notice(&mut state, NoticeKind::Info, UNDONE_MESSAGE);
        info!("deletion of product {id} undone");
        self.emit(InventoryEvent::DeletionUndone { id });
        true
    }

    /// Undoes the most recently requested deletion that can still be undone.
    pub async fn undo_latest(&self) -> Option<ProductId> {
        let latest = {
            let state = self.inner.lock().await;
            state
                .pending
                .iter()
                .filter(|(_, pending)| pending.phase == DeletionPhase::AwaitingUndo)
                .max_by_key(|(_, pending)| pending.sequence)
                .map(|(id, _)| *id)
        }?;
        self.undo_delete(latest).await.then_some(latest)
    }

    async fn confirm_delete(&self, id: ProductId) {
        {
            let mut state = self.inner.lock().await;
            // Undo may have won the race after the timer fired.
            let Some(pending) = state.pending.get_mut(&id) else {
                return;
            };
            if pending.phase != DeletionPhase::AwaitingUndo {
                return;
            }
            pending.phase = DeletionPhase::Confirming;
            pending.timer = None;
        }

        match self.backend.delete_product(id).await {
            Ok(()) => {
                {
                    let mut state = self.inner.lock().await;
                    state.pending.remove(&id);
                    state.store.forget(id);
                    info!("product {id} deleted");
                    self.emit(InventoryEvent::DeletionConfirmed { id });
                }
                let _ = self.load().await;
            }
            Err(source) => {
                let message = source.user_message(DELETE_FAILED_MESSAGE);
                warn!("delete of product {id} failed, restoring it: {source}");
                let mut state = self.inner.lock().await;
                state.pending.remove(&id);
                state.store.reveal(id);
                self.set_notice(&mut state, NoticeKind::Error, message.clone());
                self.emit(InventoryEvent::DeletionFailed { id, message });
            }
        }
    }

    /// CSV of the visible store in store order, independent of any filter.
    pub async fn export_csv(&self) -> Result<String, InventoryError> {
        let state = self.inner.lock().await;
        let products = state.store.visible();
        if products.is_empty() {
            return Err(ExportError::Empty.into());
        }
        Ok(render_csv(&products))
    }

    /// Writes the visible store to `path`, returning the number of rows written.
    pub async fn export_csv_to(&self, path: &Path) -> Result<usize, InventoryError> {
        let products = self.inner.lock().await.store.visible();
        write_csv(path, &products)?;
        info!("exported {} products to {}", products.len(), path.display());
        Ok(products.len())
    }

    pub async fn clear_notices(&self) {
        let mut state = self.inner.lock().await;
        self.clear_notice(&mut state, NoticeKind::Info);
        self.clear_notice(&mut state, NoticeKind::Error);
    }

    fn set_notice(&self, state: &mut InventoryState, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        state.notice_generation += 1;
        let generation = state.notice_generation;

        let weak = self.weak_self.clone();
        let expiry = DeferredAction::schedule(self.options.notice_ttl, async move {
            if let Some(controller) = weak.upgrade() {
                controller.expire_notice(kind, generation).await;
            }
        });

        let previous = state.notice_slot(kind).replace(ActiveNotice {
            text: text.clone(),
            generation,
            expiry,
        });
        if let Some(previous) = previous {
            previous.expiry.cancel();
        }
        self.emit(InventoryEvent::NoticeChanged {
            kind,
            text: Some(text),
        });
    }

    fn clear_notice(&self, state: &mut InventoryState, kind: NoticeKind) {
        if let Some(previous) = state.notice_slot(kind).take() {
            previous.expiry.cancel();
            self.emit(InventoryEvent::NoticeChanged { kind, text: None });
        }
    }

    async fn expire_notice(&self, kind: NoticeKind, generation: u64) {
        let mut state = self.inner.lock().await;
        let slot = state.notice_slot(kind);
        if slot.as_ref().map(|notice| notice.generation) == Some(generation) {
            *slot = None;
            self.emit(InventoryEvent::NoticeChanged { kind, text: None });
        }
    }
}

impl Drop for InventoryController {
    fn drop(&mut self) {
        let state = self.inner.get_mut();
        for notice in [state.message.take(), state.error.take()].into_iter().flatten() {
            notice.expiry.cancel();
        }
        for pending in state.pending.values() {
            if let Some(timer) = &pending.timer {
                timer.cancel();
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
