// src/state/lightbox.rs
use crate::errors::SyncError;
use crate::models::ImageRecord;
use std::sync::Arc;

/// Side effects the host surface performs while a lightbox is open.
pub trait ModalHost: Send + Sync {
    fn lock_interaction(&self);
    fn unlock_interaction(&self);
    fn bind_navigation_keys(&self);
    fn unbind_navigation_keys(&self);
}

/// Host with nothing to suspend.
pub struct NoopHost;

impl ModalHost for NoopHost {
    fn lock_interaction(&self) {}
    fn unlock_interaction(&self) {}
    fn bind_navigation_keys(&self) {}
    fn unbind_navigation_keys(&self) {}
}

// Held by an open session; releasing happens in Drop so every exit path is covered.
struct ModalGuard {
    host: Arc<dyn ModalHost>,
}

impl ModalGuard {
    fn acquire(host: Arc<dyn ModalHost>) -> Self {
        host.lock_interaction();
        host.bind_navigation_keys();
        Self { host }
    }
}

impl Drop for ModalGuard {
    fn drop(&mut self) {
        self.host.unbind_navigation_keys();
        self.host.unlock_interaction();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxEntry {
    pub src: String,
    pub label: &'static str,
    pub caption: Option<String>,
    pub filename: Option<String>,
}

/// Viewable entries of a record: its thumbnails, small first.
pub fn entries_for(record: &ImageRecord) -> Vec<LightboxEntry> {
    let Some(thumbnails) = record.thumbnails() else {
        return Vec::new();
    };
    let caption = record.metadata().and_then(|m| m.caption.clone());
    let filename = (!record.original_name.is_empty()).then(|| record.original_name.clone());

    thumbnails
        .iter()
        .map(|(size, src)| LightboxEntry {
            src: src.to_string(),
            label: size.label(),
            caption: caption.clone(),
            filename: filename.clone(),
        })
        .collect()
}

struct LightboxSession {
    entries: Vec<LightboxEntry>,
    index: usize,
    _guard: ModalGuard,
}

pub struct LightboxNavigator {
    host: Arc<dyn ModalHost>,
    session: Option<LightboxSession>,
}

impl std::fmt::Debug for LightboxNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightboxNavigator")
            .field("entries", &self.entries())
            .field("index", &self.index())
            .finish()
    }
}

impl LightboxNavigator {
    pub fn new(host: Arc<dyn ModalHost>) -> Self {
        Self {
            host,
            session: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn entries(&self) -> &[LightboxEntry] {
        self.session
            .as_ref()
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    pub fn current(&self) -> Option<&LightboxEntry> {
        self.session.as_ref().map(|s| &s.entries[s.index])
    }

    /// One-based position and total, for an "n / total" counter.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.session
            .as_ref()
            .map(|s| (s.index + 1, s.entries.len()))
    }

    pub fn open(&mut self, entries: Vec<LightboxEntry>, start: usize) -> Result<(), SyncError> {
        if entries.is_empty() {
            return Err(SyncError::InvalidOperation(
                "Nothing to view for this image".to_string(),
            ));
        }

        // Release any previous session before acquiring again.
        self.session = None;
        let index = start.min(entries.len() - 1);
        self.session = Some(LightboxSession {
            entries,
            index,
            _guard: ModalGuard::acquire(Arc::clone(&self.host)),
        });
        Ok(())
    }

    pub fn next(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.index = (s.index + 1) % s.entries.len();
        }
    }

    pub fn prev(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.index = (s.index + s.entries.len() - 1) % s.entries.len();
        }
    }

    /// Returns false when closed or `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        match self.session.as_mut() {
            Some(s) if index < s.entries.len() => {
                s.index = index;
                true
            }
            _ => false,
        }
    }

    /// Returns whether a session was actually closed.
    pub fn close(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn click_outside(&mut self) -> bool {
        self.close()
    }

    /// Key bindings only exist while open; returns whether the key was consumed.
    pub fn handle_key(&mut self, key: NavKey) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            NavKey::Left => self.prev(),
            NavKey::Right => self.next(),
            NavKey::Escape => {
                self.close();
            }
        }
        true
    }
}
