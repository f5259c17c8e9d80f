// src/services/mod.rs
pub mod image_service;
pub mod preview;

pub use image_service::{HttpImageService, ImageService};
pub use preview::{PreviewHandle, PreviewRenderer};
