// src/state/mod.rs
pub mod collection;
pub mod lightbox;
pub mod selection;
pub mod upload;

pub use collection::{CollectionSynchronizer, RefreshOutcome, RefreshTicket};
pub use lightbox::{LightboxEntry, LightboxNavigator, ModalHost, NavKey, NoopHost, entries_for};
pub use selection::{Reconciled, SelectionState};
pub use upload::{CompletionEffect, SubmitTicket, UploadController, UploadOutcome};
