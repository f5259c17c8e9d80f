// src/config.rs
use crate::errors::SyncError;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base) = lookup("IMGPIPE_API_BASE") {
            let base = base.trim().trim_end_matches('/');
            if base.is_empty() {
                return Err(SyncError::Config("IMGPIPE_API_BASE is empty".to_string()));
            }
            config.api_base = base.to_string();
        }

        if let Some(raw) = lookup("IMGPIPE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                SyncError::Config(format!("IMGPIPE_TIMEOUT_SECS must be a number, got {:?}", raw))
            })?;
            if secs == 0 {
                return Err(SyncError::Config(
                    "IMGPIPE_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
