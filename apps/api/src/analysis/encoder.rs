//! File Encoder — turns an uploaded résumé into the base64 text the AI provider accepts.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use thiserror::Error;

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two document formats a run accepts.
pub const ACCEPTED_MEDIA_TYPES: [&str; 2] = [MEDIA_TYPE_PDF, MEDIA_TYPE_DOCX];

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("The selected file is empty.")]
    Empty,

    #[error("Failed to read the selected file: {0}")]
    Io(#[from] std::io::Error),
}

/// One résumé document, alive for the duration of a single pipeline run.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content: Bytes,
    pub media_type: String,
    pub name: String,
}

impl UploadedFile {
    pub fn new(content: impl Into<Bytes>, media_type: &str, name: &str) -> Self {
        Self {
            content: content.into(),
            media_type: media_type.to_string(),
            name: name.to_string(),
        }
    }

    /// Reads a document from disk. The file name becomes the original name.
    #[allow(dead_code)] // the HTTP path builds files from multipart parts
    pub async fn from_path(path: &Path, media_type: &str) -> Result<Self, EncodeError> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(content, media_type, &name))
    }

    pub fn is_accepted_media_type(&self) -> bool {
        is_accepted_media_type(&self.media_type)
    }
}

pub fn is_accepted_media_type(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type)
}

/// Standard base64 of the file body, without any `data:` header.
pub fn encode_file(file: &UploadedFile) -> Result<String, EncodeError> {
    if file.content.is_empty() {
        return Err(EncodeError::Empty);
    }
    Ok(general_purpose::STANDARD.encode(&file.content))
}
