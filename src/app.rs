// src/app.rs
use crate::errors::SyncError;
use crate::models::{ImageId, ImageRecord, PendingFile, RawImageRecord, ServiceStats, UploadAck};
use crate::services::{ImageService, PreviewHandle, PreviewRenderer};
use crate::state::*;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Completion of a network call, delivered back to the event loop.
#[derive(Debug)]
pub enum Event {
    UploadFinished {
        session: Uuid,
        result: Result<UploadAck, SyncError>,
    },
    RefreshFinished {
        ticket: RefreshTicket,
        result: Result<Vec<RawImageRecord>, SyncError>,
    },
    StatsFinished(Result<ServiceStats, SyncError>),
}

/// What applying an event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Upload(CompletionEffect),
    Refresh {
        outcome: RefreshOutcome,
        selection: Reconciled,
    },
    Stats(Result<ServiceStats, SyncError>),
}

/// Single owner of all client-side view state.
///
/// Every transition runs on the caller's task. Network calls are spawned and
/// report back through [`Event`]s, which must be fed to [`AppState::handle_event`].
pub struct AppState {
    service: Arc<dyn ImageService>,
    preview: PreviewRenderer,
    upload: UploadController,
    collection: CollectionSynchronizer,
    selection: SelectionState,
    lightbox: LightboxNavigator,
    notice: Option<String>,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
}

impl AppState {
    pub fn new(service: Arc<dyn ImageService>, host: Arc<dyn ModalHost>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            preview: PreviewRenderer::default(),
            upload: UploadController::new(),
            collection: CollectionSynchronizer::new(),
            selection: SelectionState::new(),
            lightbox: LightboxNavigator::new(host),
            notice: None,
            events_tx,
            events_rx,
        }
    }

    pub fn upload(&self) -> &UploadController {
        &self.upload
    }

    pub fn collection(&self) -> &CollectionSynchronizer {
        &self.collection
    }

    pub fn selected_id(&self) -> Option<&ImageId> {
        self.selection.selected_id()
    }

    pub fn selected_record(&self) -> Option<&ImageRecord> {
        self.selection.selected_record(&self.collection)
    }

    pub fn lightbox(&self) -> &LightboxNavigator {
        &self.lightbox
    }

    /// Navigation never touches the collection, so the navigator is handed out directly.
    pub fn lightbox_mut(&mut self) -> &mut LightboxNavigator {
        &mut self.lightbox
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> Result<(), SyncError> {
        let file = match PendingFile::load(path).await {
            Ok(file) => file,
            Err(e) => {
                self.notice = Some(e.notice());
                return Err(e);
            }
        };

        let renderer = self.preview;
        let bytes = file.bytes.clone();
        let preview = tokio::task::spawn_blocking(move || renderer.try_render(&bytes))
            .await
            .ok()
            .flatten();

        self.pick_file(file, preview);
        Ok(())
    }

    pub fn pick_file(&mut self, file: PendingFile, preview: Option<PreviewHandle>) {
        self.upload.select_file(file, preview);
    }

    /// Starts an upload. `Ok(false)` means one is already in flight.
    pub fn submit(&mut self) -> Result<bool, SyncError> {
        let Some(ticket) = self.upload.begin_submit()? else {
            return Ok(false);
        };

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.submit_image(&ticket.file).await;
            let _ = tx.send(Event::UploadFinished {
                session: ticket.session,
                result,
            });
        });
        Ok(true)
    }

    pub fn reset_upload(&mut self) {
        self.upload.reset();
    }

    pub fn refresh(&mut self) -> RefreshTicket {
        let ticket = self.collection.begin_refresh();

        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.list_images().await;
            let _ = tx.send(Event::RefreshFinished { ticket, result });
        });
        ticket
    }

    pub fn request_stats(&mut self) {
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Event::StatsFinished(service.stats().await));
        });
    }

    pub fn toggle_select(&mut self, id: ImageId) {
        self.selection.toggle_select(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Opens the viewer on a snapshot of the selected record's thumbnails.
    pub fn open_lightbox(&mut self, start: usize) -> Result<(), SyncError> {
        let record = self
            .selected_record()
            .ok_or_else(|| SyncError::InvalidOperation("No image selected".to_string()))?;
        let entries = entries_for(record);
        self.lightbox.open(entries, start)
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<Event> {
        self.events_rx.try_recv().ok()
    }

    pub fn handle_event(&mut self, event: Event) -> Applied {
        match event {
            Event::UploadFinished { session, result } => {
                let effect = self.upload.complete(session, result);
                if effect == CompletionEffect::AppliedRefresh {
                    self.refresh();
                }
                Applied::Upload(effect)
            }
            Event::RefreshFinished { ticket, result } => {
                let outcome = self.collection.apply(ticket, result);
                let selection = match &outcome {
                    RefreshOutcome::Applied { .. } => self.selection.reconcile(&self.collection),
                    RefreshOutcome::Failed(e) => {
                        self.notice = Some(e.notice());
                        Reconciled::Nothing
                    }
                    RefreshOutcome::Stale => Reconciled::Nothing,
                };
                Applied::Refresh { outcome, selection }
            }
            Event::StatsFinished(result) => {
                if let Err(e) = &result {
                    log::warn!("Stats request failed: {}", e);
                    self.notice = Some(e.notice());
                }
                Applied::Stats(result)
            }
        }
    }
}
