//! Record persistence.
//!
//! The whole catalog lives in one JSON document that is read and rewritten
//! in full on every mutation. A missing or unreadable document falls back to
//! the seed dataset.

mod seed;
mod store;

pub use seed::{seed_catalog, SEED_RECORD_COUNT};
pub use store::RecordStore;
