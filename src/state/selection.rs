// src/state/selection.rs
use crate::models::{ImageId, ImageRecord};
use crate::state::collection::CollectionSynchronizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Nothing,
    Kept(ImageId),
    Dropped(ImageId),
}

/// Which record, if any, is open for detailed inspection.
///
/// Only the id is stored. The record itself is always read from the
/// synchronizer's current snapshot.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<ImageId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<&ImageId> {
        self.selected.as_ref()
    }

    pub fn toggle_select(&mut self, id: ImageId) {
        if self.selected.as_ref() == Some(&id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected_record<'a>(
        &self,
        collection: &'a CollectionSynchronizer,
    ) -> Option<&'a ImageRecord> {
        self.selected.as_ref().and_then(|id| collection.get(id))
    }

    /// Revalidates the selection against a freshly applied collection.
    pub fn reconcile(&mut self, collection: &CollectionSynchronizer) -> Reconciled {
        match self.selected.take() {
            None => Reconciled::Nothing,
            Some(id) if collection.contains(&id) => {
                self.selected = Some(id.clone());
                Reconciled::Kept(id)
            }
            Some(id) => {
                log::info!("Selected image {} is gone, closing detail view", id);
                Reconciled::Dropped(id)
            }
        }
    }
}
