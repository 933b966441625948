//! Whole-document record store.

use crate::error::Result;
use crate::records::seed::seed_catalog;
use crate::types::Catalog;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Durable catalog backed by a single JSON file.
///
/// Every save rewrites the entire file. Writes are not crash-atomic; a torn
/// write is masked on the next load by the seed fallback.
pub struct RecordStore {
    /// Path to the catalog document.
    path: PathBuf,
}

impl RecordStore {
    /// Create a store over the given file, creating its parent directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Load the catalog. Never fails.
    ///
    /// - No file yet: the seed dataset is written and returned.
    /// - Unreadable or unparsable file: a fresh seed copy is returned and the
    ///   file is left exactly as it is for an operator to inspect.
    pub fn load(&self) -> Catalog {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let seed = seed_catalog();
                match self.save(&seed) {
                    Ok(()) => info!(path = %self.path.display(), "initialized catalog with seed data"),
                    Err(e) => {
                        warn!(path = %self.path.display(), error = %e, "failed to persist seed catalog")
                    }
                }
                return seed;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "catalog unreadable, serving seed data");
                return seed_catalog();
            }
        };

        match serde_json::from_slice::<Catalog>(&bytes) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "catalog corrupted, serving seed data");
                seed_catalog()
            }
        }
    }

    /// Overwrite the file with the given catalog.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(catalog)?;

        let mut file = fs::File::create(&self.path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        debug!(path = %self.path.display(), records = catalog.len(), "catalog saved");
        Ok(())
    }

    /// Get the catalog file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
