// src/state/collection.rs
use crate::errors::SyncError;
use crate::models::{ImageId, ImageRecord, RawImageRecord};

/// Sequence number of one issued refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The collection was replaced.
    Applied { count: usize },
    /// A newer refresh was issued after this one.
    Stale,
    /// The latest refresh failed; previous data kept.
    Failed(SyncError),
}

/// Owns the canonical record collection.
#[derive(Debug, Default)]
pub struct CollectionSynchronizer {
    records: Vec<ImageRecord>,
    issued: u64,
    settled: u64,
}

impl CollectionSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: &ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.get(id).is_some()
    }

    /// True while the most recently issued refresh has not resolved.
    pub fn is_loading(&self) -> bool {
        self.settled < self.issued
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        log::debug!("Issuing refresh #{}", self.issued);
        RefreshTicket(self.issued)
    }

    pub fn apply(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<RawImageRecord>, SyncError>,
    ) -> RefreshOutcome {
        if ticket.0 != self.issued {
            log::debug!(
                "Discarding refresh #{} (latest issued is #{})",
                ticket.0,
                self.issued
            );
            return RefreshOutcome::Stale;
        }

        self.settled = ticket.0;
        match result {
            Ok(raw) => {
                self.records = raw.into_iter().map(ImageRecord::from_raw).collect();
                log::info!("Loaded {} image records", self.records.len());
                RefreshOutcome::Applied {
                    count: self.records.len(),
                }
            }
            Err(e) => {
                log::warn!("Refresh #{} failed: {}", ticket.0, e);
                RefreshOutcome::Failed(e)
            }
        }
    }
}
