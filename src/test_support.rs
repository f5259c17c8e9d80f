// src/test_support.rs
// Shared fakes for unit tests.

use crate::errors::SyncError;
use crate::models::*;
use crate::services::ImageService;
use crate::state::ModalHost;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use tokio::sync::oneshot;

type Reply<T> = oneshot::Receiver<Result<T, SyncError>>;

/// Service whose responses are released by the test, in call order.
#[derive(Default)]
pub struct ScriptedService {
    submit_calls: AtomicUsize,
    list_calls: AtomicUsize,
    submits: Mutex<VecDeque<Reply<UploadAck>>>,
    lists: Mutex<VecDeque<Reply<Vec<RawImageRecord>>>>,
    stats: Mutex<Option<ServiceStats>>,
}

impl ScriptedService {
    /// Queues a reply for the next `submit_image` call; resolve it via the sender.
    pub fn expect_submit(&self) -> oneshot::Sender<Result<UploadAck, SyncError>> {
        let (tx, rx) = oneshot::channel();
        self.submits.lock().unwrap().push_back(rx);
        tx
    }

    pub fn expect_list(&self) -> oneshot::Sender<Result<Vec<RawImageRecord>, SyncError>> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().unwrap().push_back(rx);
        tx
    }

    pub fn respond_submit(&self, result: Result<UploadAck, SyncError>) {
        let _ = self.expect_submit().send(result);
    }

    pub fn respond_list(&self, result: Result<Vec<RawImageRecord>, SyncError>) {
        let _ = self.expect_list().send(result);
    }

    pub fn set_stats(&self, stats: ServiceStats) {
        *self.stats.lock().unwrap() = Some(stats);
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn wait<T>(reply: Option<Reply<T>>, what: &str) -> Result<T, SyncError> {
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SyncError::Transport(format!("{} reply dropped", what)))),
            None => Err(SyncError::Transport(format!("unexpected {} call", what))),
        }
    }
}

#[async_trait]
impl ImageService for ScriptedService {
    async fn submit_image(&self, _file: &PendingFile) -> Result<UploadAck, SyncError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.submits.lock().unwrap().pop_front();
        Self::wait(reply, "submit").await
    }

    async fn list_images(&self) -> Result<Vec<RawImageRecord>, SyncError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.lists.lock().unwrap().pop_front();
        Self::wait(reply, "list").await
    }

    async fn stats(&self) -> Result<ServiceStats, SyncError> {
        let stats = self.stats.lock().unwrap().clone();
        stats.ok_or_else(|| SyncError::Transport("no stats scripted".to_string()))
    }
}

/// Tracks how many interaction locks and key bindings are currently held.
#[derive(Default)]
pub struct CountingHost {
    locks: AtomicIsize,
    bindings: AtomicIsize,
}

impl CountingHost {
    pub fn locks_held(&self) -> isize {
        self.locks.load(Ordering::SeqCst)
    }

    pub fn key_bindings(&self) -> isize {
        self.bindings.load(Ordering::SeqCst)
    }
}

impl ModalHost for CountingHost {
    fn lock_interaction(&self) {
        self.locks.fetch_add(1, Ordering::SeqCst);
    }

    fn unlock_interaction(&self) {
        self.locks.fetch_sub(1, Ordering::SeqCst);
    }

    fn bind_navigation_keys(&self) {
        self.bindings.fetch_add(1, Ordering::SeqCst);
    }

    fn unbind_navigation_keys(&self) {
        self.bindings.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Lets spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub fn ack(id: &str, status: &str) -> UploadAck {
    UploadAck {
        image_id: ImageId::from(id),
        status: status.to_string(),
        error: None,
    }
}

pub fn record(id: &str, status: &str, thumbs: &[(&str, &str)]) -> RawImageRecord {
    let mut thumbnails = Thumbnails::default();
    for (size, src) in thumbs {
        match *size {
            "small" => thumbnails.small = Some(src.to_string()),
            "medium" => thumbnails.medium = Some(src.to_string()),
            other => panic!("unknown thumbnail size {}", other),
        }
    }

    RawImageRecord {
        status: status.to_string(),
        data: RawImageData {
            image_id: ImageId::from(id),
            original_name: format!("{}.png", id),
            processed_at: None,
            metadata: Some(RawMetadata::default()),
            thumbnails: Some(thumbnails),
        },
        error: (status == "failed").then(|| "processing failed".to_string()),
    }
}
