// src/render.rs
// Plain-text views for the terminal shell.

use crate::app::{AppState, Applied};
use crate::models::{ImageRecord, RecordState, RecordStatus, ServiceStats};
use crate::state::{
    CompletionEffect, LightboxNavigator, Reconciled, RefreshOutcome, UploadController,
    UploadOutcome,
};
use std::fmt::Write as _;

pub fn upload_card(upload: &UploadController) -> String {
    let mut out = String::new();

    match upload.file() {
        Some(file) => {
            let _ = write!(out, "Picked {} ({:.1} KB)", file.name, file.size_kb());
            if let Some(preview) = upload.preview() {
                let _ = write!(out, ", preview {}x{}", preview.width, preview.height);
            }
            if !file.has_accepted_extension() {
                out.push_str("\nOnly JPG, JPEG and PNG are supported; the server will likely reject it.");
            }
        }
        None => out.push_str("No file picked."),
    }

    if upload.is_in_flight() {
        out.push_str("\nUploading...");
    }

    match upload.outcome() {
        Some(UploadOutcome::Accepted {
            image_id,
            status: RecordStatus::Failed,
            error,
        }) => {
            let _ = write!(
                out,
                "\nRejected by the server: {}\nID: {}",
                error.as_deref().unwrap_or("unknown error"),
                image_id
            );
        }
        Some(UploadOutcome::Accepted { image_id, .. }) => {
            let _ = write!(
                out,
                "\nQueued for processing!\nID: {}\nRefresh to check when processing is complete.",
                image_id
            );
        }
        Some(UploadOutcome::Failed(reason)) => {
            let _ = write!(out, "\nUpload failed. {}", reason);
        }
        None => {}
    }

    out
}

pub fn status_badge(status: RecordStatus) -> String {
    format!("[{}]", status.label())
}

pub fn record_line(record: &ImageRecord, selected: bool) -> String {
    format!(
        "{} {:<12} {} {}",
        if selected { ">" } else { " " },
        status_badge(record.status()),
        record.id,
        record.original_name
    )
}

pub fn record_detail(record: &ImageRecord) -> String {
    let mut out = format!(
        "{} {}\nID: {}",
        status_badge(record.status()),
        record.original_name,
        record.id
    );
    if let Some(at) = record.processed_at {
        let _ = write!(out, "\nProcessed: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    match &record.state {
        RecordState::Success {
            metadata,
            thumbnails,
        } => {
            let mut facts = Vec::new();
            if let (Some(w), Some(h)) = (metadata.width, metadata.height) {
                facts.push(format!("{}x{}", w, h));
            }
            if let Some(format) = &metadata.format {
                facts.push(format.to_uppercase());
            }
            if let Some(size) = metadata.size_bytes {
                facts.push(format!("{:.1} KB", size as f64 / 1024.0));
            }
            if !facts.is_empty() {
                let _ = write!(out, "\n{}", facts.join("  "));
            }
            if let Some(caption) = &metadata.caption {
                let _ = write!(out, "\n\"{}\"", caption);
            }
            if !metadata.exif.is_empty() {
                let _ = write!(out, "\nEXIF: {} tags", metadata.exif.len());
            }
            if thumbnails.is_empty() {
                out.push_str("\nNo thumbnails.");
            }
            for (n, (size, src)) in thumbnails.iter().enumerate() {
                let _ = write!(out, "\n  {}. {}: {}", n + 1, size.label(), src);
            }
        }
        RecordState::Failed { error } => {
            let _ = write!(out, "\nError: {}", error);
        }
        RecordState::Processing | RecordState::Queued => out.push_str("\nStill processing..."),
        RecordState::Unknown { status } => {
            let _ = write!(out, "\nThe server reported an unrecognised status {:?}.", status);
        }
    }

    out
}

pub fn collection(app: &AppState) -> String {
    let records = app.collection().records();
    if records.is_empty() {
        return "No images loaded yet. Type `refresh` to load your images.".to_string();
    }

    let selected = app.selected_id();
    let mut lines: Vec<String> = records
        .iter()
        .map(|r| record_line(r, selected == Some(&r.id)))
        .collect();
    if app.collection().is_loading() {
        lines.push("Loading...".to_string());
    }
    lines.join("\n")
}

pub fn lightbox(nav: &LightboxNavigator) -> String {
    let (Some(entry), Some((pos, total))) = (nav.current(), nav.position()) else {
        return "Viewer closed.".to_string();
    };

    let mut out = format!("[{}]", entry.label);
    if let Some(filename) = &entry.filename {
        let _ = write!(out, " {}", filename);
    }
    if total > 1 {
        let _ = write!(out, "  {} / {}", pos, total);
    }
    let _ = write!(out, "\n  {}", entry.src);
    if let Some(caption) = &entry.caption {
        let _ = write!(out, "\n  \"{}\"", caption);
    }
    out
}

pub fn stats(stats: &ServiceStats) -> String {
    format!(
        "Total: {}  Failed: {}  Success rate: {}  Avg processing: {:.2}s",
        stats.total, stats.failed, stats.success_rate, stats.average_processing_time_seconds
    )
}

/// Message for an applied event, if it is worth showing.
pub fn applied(app: &AppState, applied: &Applied) -> Option<String> {
    match applied {
        Applied::Upload(CompletionEffect::Ignored) => None,
        Applied::Upload(_) => Some(upload_card(app.upload())),
        Applied::Refresh {
            outcome: RefreshOutcome::Applied { count },
            selection,
        } => {
            let mut out = format!("Loaded {} image(s).", count);
            match selection {
                Reconciled::Kept(_) => {
                    if let Some(record) = app.selected_record() {
                        let _ = write!(out, "\n{}", record_detail(record));
                    }
                }
                Reconciled::Dropped(id) => {
                    let _ = write!(out, "\nImage {} no longer exists; details closed.", id);
                }
                Reconciled::Nothing => {}
            }
            Some(out)
        }
        Applied::Refresh {
            outcome: RefreshOutcome::Failed(_),
            ..
        } => app.notice().map(str::to_string),
        Applied::Refresh {
            outcome: RefreshOutcome::Stale,
            ..
        } => None,
        Applied::Stats(Ok(s)) => Some(stats(s)),
        Applied::Stats(Err(_)) => app.notice().map(str::to_string),
    }
}
