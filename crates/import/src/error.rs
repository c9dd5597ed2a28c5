use thiserror::Error;

use retailforge_infra::RepositoryError;

/// Import failure.
///
/// Everything the user can fix (missing file, bad format, unknown company,
/// ...) is a `Validation` error carrying a readable message. Store failures
/// are passed through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a parser failure, keeping its original message.
    pub fn unreadable(cause: impl core::fmt::Display) -> Self {
        Self::Validation(format!("Error reading file: {cause}"))
    }
}
