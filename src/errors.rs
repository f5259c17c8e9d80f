// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// The short, dismissible message the shell shows for this error.
    pub fn notice(&self) -> String {
        match self {
            SyncError::Transport(_) => "Request failed. Is the backend running?".to_string(),
            SyncError::Decode(_) => "The backend sent a response that could not be read.".to_string(),
            SyncError::InvalidOperation(msg) => msg.clone(),
            SyncError::Io(msg) => format!("Could not read file: {}", msg),
            SyncError::Config(msg) => format!("Bad configuration: {}", msg),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Transport(e.to_string())
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e.to_string())
    }
}
