//! Client-side inventory core: backend client, product store, derived view,
//! and the controller that owns state and sequences mutations.

pub mod analytics;
pub mod backend;
pub mod config;
pub mod controller;
pub mod deferred;
pub mod display;
pub mod draft;
pub mod export;
pub mod store;
pub mod view;

pub use backend::{BackendError, HttpInventoryBackend, InventoryBackend};
pub use config::{load_settings, ClientSettings};
pub use controller::{
    ControllerOptions, DeletionPhase, InventoryController, InventoryError, InventoryEvent,
    InventorySnapshot, NoticeKind, PendingDeletionView,
};
pub use draft::{ProductDraft, ValidationError};
pub use view::{project, SortDirection, SortField, ViewParams};
