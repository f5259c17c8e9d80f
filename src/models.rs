// src/models.rs
use crate::errors::SyncError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identifier the processing service assigns to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// Wire shapes, exactly as the service serves them.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageRecord {
    pub status: String,
    pub data: RawImageData,
    #[serde(default)]
    pub error: Option<String>,
}

impl RawImageRecord {
    /// Reads one element of the list response.
    ///
    /// Fields that do not have the expected type degrade instead of failing:
    /// a non-string status is kept verbatim and classifies as unknown, and
    /// unreadable metadata or thumbnails become empty. Only an element with
    /// no usable `image_id` is dropped.
    pub fn from_value(value: Value) -> Option<Self> {
        if let Ok(record) = RawImageRecord::deserialize(&value) {
            return Some(record);
        }

        let data = value.get("data");
        let image_id = match data.and_then(|d| d.get("image_id")) {
            Some(Value::String(id)) if !id.trim().is_empty() => ImageId::from(id.as_str()),
            Some(Value::Number(n)) => ImageId::new(n.to_string()),
            _ => {
                log::warn!("Dropping image record without an image_id: {}", value);
                return None;
            }
        };
        log::warn!("Image {} has malformed fields, reading it leniently", image_id);

        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        let field = |name: &str| data.and_then(|d| d.get(name));

        let status = match value.get("status") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Some(RawImageRecord {
            status,
            data: RawImageData {
                image_id,
                original_name: text(field("original_name")).unwrap_or_default(),
                processed_at: text(field("processed_at")),
                metadata: field("metadata").and_then(|m| RawMetadata::deserialize(m).ok()),
                thumbnails: field("thumbnails").and_then(|t| Thumbnails::deserialize(t).ok()),
            },
            error: text(value.get("error")),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageData {
    pub image_id: ImageId,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exif: Option<BTreeMap<String, serde_json::Value>>,
}

/// Response of `POST /images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadAck {
    pub image_id: ImageId,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadAck {
    pub fn status(&self) -> RecordStatus {
        RecordStatus::parse(&self.status)
    }
}

/// Response of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub total: u64,
    pub failed: u64,
    pub success_rate: String,
    pub average_processing_time_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    Queued,
    Processing,
    Success,
    Failed,
    Unknown,
}

impl RecordStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => RecordStatus::Queued,
            "processing" => RecordStatus::Processing,
            "success" => RecordStatus::Success,
            "failed" => RecordStatus::Failed,
            _ => RecordStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Queued => "Queued",
            RecordStatus::Processing => "Processing",
            RecordStatus::Success => "Success",
            RecordStatus::Failed => "Failed",
            RecordStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbnailSize {
    Small,
    Medium,
}

impl ThumbnailSize {
    /// Display order of thumbnails everywhere in the client.
    pub const ALL: [ThumbnailSize; 2] = [ThumbnailSize::Small, ThumbnailSize::Medium];

    pub fn label(&self) -> &'static str {
        match self {
            ThumbnailSize::Small => "Small",
            ThumbnailSize::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

impl Thumbnails {
    pub fn get(&self, size: ThumbnailSize) -> Option<&str> {
        match size {
            ThumbnailSize::Small => self.small.as_deref(),
            ThumbnailSize::Medium => self.medium.as_deref(),
        }
    }

    /// Present thumbnails in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ThumbnailSize, &str)> + '_ {
        ThumbnailSize::ALL
            .into_iter()
            .filter_map(move |size| self.get(size).map(|src| (size, src)))
    }

    pub fn is_empty(&self) -> bool {
        self.small.is_none() && self.medium.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub size_bytes: Option<u64>,
    pub caption: Option<String>,
    pub exif: BTreeMap<String, serde_json::Value>,
}

impl From<RawMetadata> for ImageMetadata {
    fn from(raw: RawMetadata) -> Self {
        Self {
            width: raw.width,
            height: raw.height,
            format: raw.format,
            size_bytes: raw.size_bytes,
            caption: raw.caption.filter(|c| !c.trim().is_empty()),
            exif: raw.exif.unwrap_or_default(),
        }
    }
}

/// Status together with the payload that status is allowed to carry.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    Queued,
    Processing,
    Success {
        metadata: ImageMetadata,
        thumbnails: Thumbnails,
    },
    Failed {
        error: String,
    },
    Unknown {
        status: String,
    },
}

/// One processed-image entry, validated at the service boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: ImageId,
    pub original_name: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub state: RecordState,
}

impl ImageRecord {
    pub fn from_raw(raw: RawImageRecord) -> Self {
        let RawImageRecord {
            status,
            data,
            error,
        } = raw;

        let state = match RecordStatus::parse(&status) {
            RecordStatus::Queued => RecordState::Queued,
            RecordStatus::Processing => RecordState::Processing,
            RecordStatus::Success => RecordState::Success {
                metadata: data.metadata.map(ImageMetadata::from).unwrap_or_default(),
                thumbnails: data.thumbnails.unwrap_or_default(),
            },
            RecordStatus::Failed => RecordState::Failed {
                error: error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            RecordStatus::Unknown => {
                log::warn!(
                    "Image {} has unrecognised status {:?}",
                    data.image_id,
                    status
                );
                RecordState::Unknown { status }
            }
        };

        let processed_at = data.processed_at.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Self {
            id: data.image_id,
            original_name: data.original_name,
            processed_at,
            state,
        }
    }

    /// Back to the wire shape, for the raw JSON view.
    pub fn to_raw(&self) -> RawImageRecord {
        let (status, metadata, thumbnails, error) = match &self.state {
            RecordState::Queued => ("queued".to_string(), None, None, None),
            RecordState::Processing => ("processing".to_string(), None, None, None),
            RecordState::Success {
                metadata,
                thumbnails,
            } => (
                "success".to_string(),
                Some(RawMetadata {
                    width: metadata.width,
                    height: metadata.height,
                    format: metadata.format.clone(),
                    size_bytes: metadata.size_bytes,
                    caption: metadata.caption.clone(),
                    exif: (!metadata.exif.is_empty()).then(|| metadata.exif.clone()),
                }),
                Some(thumbnails.clone()),
                None,
            ),
            RecordState::Failed { error } => ("failed".to_string(), None, None, Some(error.clone())),
            RecordState::Unknown { status } => (status.clone(), None, None, None),
        };

        RawImageRecord {
            status,
            data: RawImageData {
                image_id: self.id.clone(),
                original_name: self.original_name.clone(),
                processed_at: self.processed_at.map(|dt| dt.to_rfc3339()),
                metadata: Some(metadata.unwrap_or_default()),
                thumbnails: Some(thumbnails.unwrap_or_default()),
            },
            error,
        }
    }

    pub fn status(&self) -> RecordStatus {
        match self.state {
            RecordState::Queued => RecordStatus::Queued,
            RecordState::Processing => RecordStatus::Processing,
            RecordState::Success { .. } => RecordStatus::Success,
            RecordState::Failed { .. } => RecordStatus::Failed,
            RecordState::Unknown { .. } => RecordStatus::Unknown,
        }
    }

    pub fn metadata(&self) -> Option<&ImageMetadata> {
        match &self.state {
            RecordState::Success { metadata, .. } => Some(metadata),
            _ => None,
        }
    }

    pub fn thumbnails(&self) -> Option<&Thumbnails> {
        match &self.state {
            RecordState::Success { thumbnails, .. } => Some(thumbnails),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RecordState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// A file picked for upload, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PendingFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SyncError::Io(format!("{} is not a file", path.display())))?;
        Ok(Self::from_bytes(path.to_path_buf(), name, Bytes::from(bytes)))
    }

    pub fn from_bytes(path: PathBuf, name: String, bytes: Bytes) -> Self {
        let content_type = content_type_for(&name).to_string();
        Self {
            path,
            name,
            content_type,
            bytes,
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    /// Whether the extension is one the service is known to accept. Hint only.
    pub fn has_accepted_extension(&self) -> bool {
        content_type_for(&self.name) != "application/octet-stream"
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}
