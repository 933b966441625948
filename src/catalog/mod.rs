//! Catalog orchestration.
//!
//! Ties the record store and the attachment store together so that a
//! record's `storedName` always refers to a file that exists, and a file is
//! removed when the record owning it goes away.

mod filter;
mod import;
mod manager;

pub use filter::{ListFilter, Listing, ListingIter};
pub use manager::{AttachmentDownload, CatalogManager};
