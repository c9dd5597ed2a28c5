//! Uploaded file payload and its transport decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Spreadsheet formats the import understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Pick the format from the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let lower = filename.trim().to_lowercase();
        if lower.ends_with(".xlsx") {
            Ok(FileFormat::Xlsx)
        } else if lower.ends_with(".csv") {
            Ok(FileFormat::Csv)
        } else {
            Err(ImportError::validation("Unsupported file format."))
        }
    }
}

/// File as received from the client: base64 content plus its filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default)]
    pub filename: Option<String>,
    /// Base64-encoded file content.
    #[serde(default)]
    pub upload_file: Option<String>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, upload_file: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            upload_file: Some(upload_file.into()),
        }
    }

    /// Build an upload from raw file bytes.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(filename, STANDARD.encode(bytes))
    }

    /// Check presence, decode the content and detect the format.
    pub fn decode(&self) -> Result<(FileFormat, Vec<u8>), ImportError> {
        let (Some(filename), Some(content)) = (
            self.filename.as_deref().filter(|f| !f.trim().is_empty()),
            self.upload_file.as_deref().filter(|c| !c.trim().is_empty()),
        ) else {
            return Err(ImportError::validation("Please upload a valid file."));
        };

        // Transport encodings may wrap lines; whitespace is not part of the payload.
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ImportError::validation(format!("Invalid file encoding: {e}")))?;

        let format = FileFormat::from_filename(filename)?;
        Ok((format, bytes))
    }
}
