// src/lib.rs
//! Client-side state for an image processing service: uploads, the
//! processed-image collection, the open detail view and the thumbnail viewer.

pub mod app;
pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod render;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

pub use app::{Applied, AppState, Event};
pub use config::Config;
pub use errors::SyncError;
