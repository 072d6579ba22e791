use serde::Serialize;

use super::domain::DocumentRef;

/// Credential uploads are capped at 5 MiB.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// One-shot authorisation for a single document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub ticket: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Blob store for uploaded credentials. The onboarding core only ever holds references.
pub trait ObjectStorage: Send + Sync {
    fn issue_upload(&self) -> Result<UploadTicket, StorageError>;
    /// Consumes `ticket` and stores the body, returning the reference to submit with the form.
    fn complete_upload(
        &self,
        ticket: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentRef, StorageError>;
    fn exists(&self, document: &DocumentRef) -> Result<bool, StorageError>;
    fn resolve_url(&self, document: &DocumentRef) -> Result<Option<String>, StorageError>;
    fn fetch(&self, document: &DocumentRef) -> Result<Option<StoredDocument>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload ticket is unknown or already used")]
    UnknownTicket,
    #[error("please upload a PDF file only (received '{0}')")]
    UnsupportedMediaType(String),
    #[error("file size must be less than 5MB (received {found} bytes)")]
    TooLarge { found: usize },
    #[error("uploaded document is empty")]
    Empty,
    #[error("object storage unavailable: {0}")]
    Unavailable(String),
}

/// Upload policy shared by storage adapters: non-empty PDF bodies within the size cap.
pub fn check_document(content_type: &str, size: usize) -> Result<(), StorageError> {
    let is_pdf = content_type
        .parse::<mime::Mime>()
        .map(|parsed| parsed.essence_str() == mime::APPLICATION_PDF.essence_str())
        .unwrap_or(false);
    if !is_pdf {
        return Err(StorageError::UnsupportedMediaType(content_type.to_string()));
    }
    if size == 0 {
        return Err(StorageError::Empty);
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(StorageError::TooLarge { found: size });
    }
    Ok(())
}
