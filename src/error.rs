//! Error types for the catalog.

use crate::types::RecordId;
use std::fmt;
use thiserror::Error;

/// Main error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Year must be numeric, got {0:?}")]
    InvalidYear(String),

    #[error("A ROM attachment is required")]
    MissingAttachment,

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to clear {failed} attachment(s), first error: {first}")]
    ClearFailed { failed: usize, first: String },

    #[error("Catalog is locked by another process")]
    Locked,
}

/// Coarse error classification exposed to callers.
///
/// Several variants of [`CatalogError`] collapse onto the same kind: a record
/// that does not exist and a record whose attachment went missing are both
/// `NotFound`, and every disk-level failure is `IoFailure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingField,
    InvalidYear,
    MissingAttachment,
    NotFound,
    InvalidPayload,
    PayloadTooLarge,
    IoFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingField => "MissingField",
            ErrorKind::InvalidYear => "InvalidYear",
            ErrorKind::MissingAttachment => "MissingAttachment",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidPayload => "InvalidPayload",
            ErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ErrorKind::IoFailure => "IOFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CatalogError {
    /// The kind reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::MissingField(_) => ErrorKind::MissingField,
            CatalogError::InvalidYear(_) => ErrorKind::InvalidYear,
            CatalogError::MissingAttachment => ErrorKind::MissingAttachment,
            CatalogError::RecordNotFound(_) | CatalogError::AttachmentNotFound(_) => {
                ErrorKind::NotFound
            }
            CatalogError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            CatalogError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            CatalogError::Io(_)
            | CatalogError::Serialization(_)
            | CatalogError::ClearFailed { .. }
            | CatalogError::Locked => ErrorKind::IoFailure,
        }
    }

    /// True for failures detected before any durable mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingField | ErrorKind::InvalidYear | ErrorKind::MissingAttachment
        )
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_share_kind() {
        assert_eq!(CatalogError::RecordNotFound(RecordId(7)).kind(), ErrorKind::NotFound);
        assert_eq!(
            CatalogError::AttachmentNotFound("rom.bin".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_disk_failures_are_io_kind() {
        let io = CatalogError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::IoFailure);
        assert_eq!(CatalogError::Locked.kind(), ErrorKind::IoFailure);
        assert_eq!(
            CatalogError::ClearFailed { failed: 2, first: "denied".into() }.kind(),
            ErrorKind::IoFailure
        );
        assert_eq!(ErrorKind::IoFailure.to_string(), "IOFailure");
    }

    #[test]
    fn test_validation_classification() {
        assert!(CatalogError::MissingField("title").is_validation());
        assert!(CatalogError::InvalidYear("abc".into()).is_validation());
        assert!(CatalogError::MissingAttachment.is_validation());
        assert!(!CatalogError::InvalidPayload("x".into()).is_validation());
    }
}
