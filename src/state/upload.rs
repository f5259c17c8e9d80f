// src/state/upload.rs
use crate::errors::SyncError;
use crate::models::{ImageId, PendingFile, RecordStatus, UploadAck};
use crate::services::PreviewHandle;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Accepted {
        image_id: ImageId,
        status: RecordStatus,
        error: Option<String>,
    },
    Failed(String),
}

/// What the coordinator needs to run one upload off the event loop.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub session: Uuid,
    pub file: PendingFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEffect {
    /// Result stored; the collection should be refreshed.
    AppliedRefresh,
    /// Result stored; nothing else to do.
    Applied,
    /// Response belonged to a session that no longer exists.
    Ignored,
}

#[derive(Debug)]
pub struct UploadController {
    session: Uuid,
    file: Option<PendingFile>,
    preview: Option<PreviewHandle>,
    in_flight: bool,
    outcome: Option<UploadOutcome>,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            session: Uuid::new_v4(),
            file: None,
            preview: None,
            in_flight: false,
            outcome: None,
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn file(&self) -> Option<&PendingFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn outcome(&self) -> Option<&UploadOutcome> {
        self.outcome.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.in_flight
    }

    pub fn select_file(&mut self, file: PendingFile, preview: Option<PreviewHandle>) {
        self.start_session();
        log::info!("Picked {} for upload (session {})", file.name, self.session);
        self.file = Some(file);
        self.preview = preview;
    }

    /// Marks the session in flight and hands out the ticket for the network call.
    /// Returns `Ok(None)` when an upload is already running.
    pub fn begin_submit(&mut self) -> Result<Option<SubmitTicket>, SyncError> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| SyncError::InvalidOperation("No file selected".to_string()))?;

        if self.in_flight {
            log::debug!("Upload already in flight for session {}", self.session);
            return Ok(None);
        }

        self.in_flight = true;
        self.outcome = None;
        Ok(Some(SubmitTicket {
            session: self.session,
            file: file.clone(),
        }))
    }

    pub fn complete(
        &mut self,
        session: Uuid,
        result: Result<UploadAck, SyncError>,
    ) -> CompletionEffect {
        if session != self.session {
            log::debug!(
                "Ignoring upload response for stale session {} (current {})",
                session,
                self.session
            );
            return CompletionEffect::Ignored;
        }

        self.in_flight = false;
        match result {
            Ok(ack) => {
                log::info!("Image {} accepted with status {}", ack.image_id, ack.status);
                self.outcome = Some(UploadOutcome::Accepted {
                    status: ack.status(),
                    image_id: ack.image_id,
                    error: ack.error,
                });
                CompletionEffect::AppliedRefresh
            }
            Err(e) => {
                log::warn!("Upload failed: {}", e);
                self.outcome = Some(UploadOutcome::Failed(e.notice()));
                CompletionEffect::Applied
            }
        }
    }

    pub fn reset(&mut self) {
        self.start_session();
    }

    fn start_session(&mut self) {
        self.session = Uuid::new_v4();
        self.file = None;
        self.preview = None;
        self.in_flight = false;
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str) -> PendingFile {
        PendingFile::from_bytes(name.into(), name.to_string(), Bytes::from_static(b"data"))
    }

    fn ack(id: &str, status: &str) -> UploadAck {
        UploadAck {
            image_id: ImageId::from(id),
            status: status.to_string(),
            error: None,
        }
    }

    #[test]
    fn submit_without_file_is_invalid() {
        let mut upload = UploadController::new();
        assert!(!upload.can_submit());
        assert!(matches!(
            upload.begin_submit(),
            Err(SyncError::InvalidOperation(_))
        ));
    }

    #[test]
    fn second_submit_while_in_flight_is_a_no_op() {
        let mut upload = UploadController::new();
        upload.select_file(file("a.png"), None);

        let first = upload.begin_submit().unwrap();
        assert!(first.is_some());
        assert!(upload.is_in_flight());
        assert!(upload.begin_submit().unwrap().is_none());
    }

    #[test]
    fn success_is_recorded_and_requests_refresh() {
        let mut upload = UploadController::new();
        upload.select_file(file("a.png"), None);
        let ticket = upload.begin_submit().unwrap().unwrap();

        let effect = upload.complete(ticket.session, Ok(ack("img_1", "queued")));
        assert_eq!(effect, CompletionEffect::AppliedRefresh);
        assert!(!upload.is_in_flight());
        assert_eq!(
            upload.outcome(),
            Some(&UploadOutcome::Accepted {
                image_id: ImageId::from("img_1"),
                status: RecordStatus::Queued,
                error: None,
            })
        );
        // File stays picked so the user can see what was sent.
        assert!(upload.file().is_some());
    }

    #[test]
    fn transport_failure_does_not_request_refresh() {
        let mut upload = UploadController::new();
        upload.select_file(file("a.png"), None);
        let ticket = upload.begin_submit().unwrap().unwrap();

        let effect = upload.complete(
            ticket.session,
            Err(SyncError::Transport("refused".to_string())),
        );
        assert_eq!(effect, CompletionEffect::Applied);
        assert_eq!(
            upload.outcome(),
            Some(&UploadOutcome::Failed(
                "Request failed. Is the backend running?".to_string()
            ))
        );
        assert!(upload.can_submit());
    }

    #[test]
    fn response_after_reset_is_ignored() {
        let mut upload = UploadController::new();
        upload.select_file(file("a.png"), None);
        let ticket = upload.begin_submit().unwrap().unwrap();

        upload.reset();
        let effect = upload.complete(ticket.session, Ok(ack("img_1", "processing")));

        assert_eq!(effect, CompletionEffect::Ignored);
        assert!(upload.outcome().is_none());
        assert!(upload.file().is_none());
        assert!(!upload.is_in_flight());
    }

    #[test]
    fn picking_a_new_file_clears_previous_result() {
        let mut upload = UploadController::new();
        upload.select_file(file("a.png"), None);
        let ticket = upload.begin_submit().unwrap().unwrap();
        upload.complete(ticket.session, Ok(ack("img_1", "processing")));

        let before = upload.session();
        upload.select_file(file("b.jpg"), None);
        assert_ne!(upload.session(), before);
        assert!(upload.outcome().is_none());
        assert_eq!(upload.file().map(|f| f.name.as_str()), Some("b.jpg"));
    }
}
