// src/services/preview.rs
use crate::errors::SyncError;
use base64::{Engine as _, engine::general_purpose};
use image::{GenericImageView, ImageFormat as ImgFormat};

/// Edge length of the square preview shown next to a picked file.
pub const PREVIEW_SIZE: u32 = 64;

/// A locally rendered preview, usable directly as an image source.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewHandle {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer {
    size: u32,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(PREVIEW_SIZE)
    }
}

impl PreviewRenderer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn render(&self, data: &[u8]) -> Result<PreviewHandle, SyncError> {
        let img = image::load_from_memory(data)
            .map_err(|e| SyncError::Decode(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();
        let thumb = if width <= self.size && height <= self.size {
            img
        } else {
            img.thumbnail(self.size, self.size)
        };

        let mut output = Vec::new();
        thumb
            .write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| SyncError::Decode(format!("Failed to encode preview: {}", e)))?;

        let (width, height) = thumb.dimensions();
        Ok(PreviewHandle {
            data_uri: format!(
                "data:image/png;base64,{}",
                general_purpose::STANDARD.encode(&output)
            ),
            width,
            height,
        })
    }

    /// Previews are best effort; undecodable files simply have none.
    pub fn try_render(&self, data: &[u8]) -> Option<PreviewHandle> {
        match self.render(data) {
            Ok(preview) => Some(preview),
            Err(e) => {
                log::debug!("No preview for picked file: {}", e);
                None
            }
        }
    }
}
