//! Text extraction: object storage bytes → plain text, dispatched on document type.

pub mod docx;
pub mod mime;
pub mod pdf;
pub mod storage;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use self::mime::DocumentKind;
use self::storage::{ObjectStorage, StorageError};

/// Uploads larger than this are rejected before any parsing.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Below this many characters a document is considered to have no text.
pub const MIN_TEXT_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("file storage unavailable: {0}")]
    StorageUnavailable(StorageError),

    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("text extraction failed: {0}")]
    Unknown(String),
}

impl From<StorageError> for ExtractionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Other(message) => ExtractionError::Unknown(message),
            StorageError::TooLarge { size, limit } => ExtractionError::TooLarge { size, limit },
            mapped => ExtractionError::StorageUnavailable(mapped),
        }
    }
}

/// Fetches an uploaded file and turns it into plain text.
#[derive(Clone)]
pub struct TextExtractor {
    storage: Arc<dyn ObjectStorage>,
}

impl TextExtractor {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub async fn extract(
        &self,
        file_key: &str,
        declared_mime: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let bytes = self.storage.get(file_key, MAX_FILE_BYTES).await?;

        // Storage may not know the length up front.
        if bytes.len() > MAX_FILE_BYTES {
            return Err(ExtractionError::TooLarge {
                size: bytes.len(),
                limit: MAX_FILE_BYTES,
            });
        }

        let kind = DocumentKind::resolve(declared_mime, file_key)?;
        debug!("Extracting {kind:?} text from {file_key} ({} bytes)", bytes.len());

        let text = match kind {
            DocumentKind::Pdf => pdf::extract_pdf_text(bytes).await,
            DocumentKind::Docx => tokio::task::spawn_blocking(move || docx::extract_docx_text(&bytes))
                .await
                .map_err(|e| ExtractionError::Unknown(format!("DOCX parser aborted: {e}")))??,
        };

        info!("Extracted {} characters from {file_key}", text.chars().count());
        Ok(text)
    }
}
