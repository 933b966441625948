//! # ROM Catalog
//!
//! Persistence for a small game catalog: metadata records stored as one JSON
//! document, plus ROM attachments stored as files, kept consistent with each
//! other.
//!
//! ## Core Concepts
//!
//! - **Records**: Game entries, persisted as a whole on every change
//! - **Attachments**: ROM files in a content directory, referenced by name
//! - **Catalog**: The ordered set of records, with a built-in seed dataset
//!
//! ## Example
//!
//! ```ignore
//! use rom_catalog::{CatalogConfig, CatalogManager, ListFilter, NewRecord};
//!
//! let catalog = CatalogManager::open(CatalogConfig::in_dir("./data").with_env_overrides())?;
//!
//! // Upload and create
//! let record = catalog.create_with_upload(
//!     NewRecord::new("Solar Blaze", "NES", "2019"),
//!     "rom.bin",
//!     std::fs::File::open("rom.bin")?,
//! )?;
//!
//! // Query
//! for game in &catalog.list(&ListFilter::new().console("NES")) {
//!     println!("{} ({:?})", game.title, game.year);
//! }
//!
//! // Remove record and ROM together
//! catalog.delete(record.id)?;
//! ```

pub mod attachments;
pub mod catalog;
pub mod config;
pub mod error;
pub mod records;
pub mod types;

// Re-exports
pub use attachments::AttachmentStore;
pub use catalog::{AttachmentDownload, CatalogManager, ListFilter, Listing};
pub use config::{reset_requested, CatalogConfig};
pub use error::{CatalogError, ErrorKind, Result};
pub use records::{seed_catalog, RecordStore};
pub use types::*;
