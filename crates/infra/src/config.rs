//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Process configuration, read from `RETAILFORGE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Largest accepted request body; uploads travel base64-encoded inside it.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Missing keys fall
    /// back to defaults; present but malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("RETAILFORGE_BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "RETAILFORGE_BIND_ADDR",
                message: format!("{e}"),
            })?,
            None => {
                tracing::warn!("RETAILFORGE_BIND_ADDR not set; using {DEFAULT_BIND_ADDR}");
                default_bind_addr()
            }
        };

        let max_upload_bytes = match lookup("RETAILFORGE_MAX_UPLOAD_BYTES") {
            Some(raw) => {
                let bytes: usize = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    key: "RETAILFORGE_MAX_UPLOAD_BYTES",
                    message: format!("{e}"),
                })?;
                if bytes == 0 {
                    return Err(ConfigError::Invalid {
                        key: "RETAILFORGE_MAX_UPLOAD_BYTES",
                        message: "must be greater than zero".to_string(),
                    });
                }
                bytes
            }
            None => {
                tracing::warn!("RETAILFORGE_MAX_UPLOAD_BYTES not set; using {DEFAULT_MAX_UPLOAD_BYTES}");
                DEFAULT_MAX_UPLOAD_BYTES
            }
        };

        Ok(Self {
            bind_addr,
            max_upload_bytes,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
