//! Attachment file storage.
//!
//! Attachments live as plain files in a single content directory, named by
//! a generated storage name. No index is kept here: which files are live is
//! decided entirely by the records that reference them.

mod storage;

pub use storage::{sanitize_file_name, AttachmentStore};
