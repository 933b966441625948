//! Attachment storage implementation.

use crate::error::{CatalogError, Result};
use crate::types::IdClock;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Suffix of files still being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Replacement for whitespace runs and unsafe characters in stored names.
const FILLER: char = '_';

/// Fallback when an uploaded name sanitizes to nothing.
const FALLBACK_NAME: &str = "attachment";

/// Attachment files in a content directory.
pub struct AttachmentStore {
    /// Content directory.
    path: PathBuf,

    /// Largest accepted upload, in bytes.
    max_bytes: u64,

    /// Clock providing storage name prefixes.
    clock: Arc<IdClock>,
}

impl AttachmentStore {
    /// Create a store over the given directory, creating it if needed.
    pub fn new(path: impl AsRef<Path>, max_bytes: u64, clock: Arc<IdClock>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            max_bytes,
            clock,
        })
    }

    /// Save an upload, returning its storage name.
    ///
    /// Content is written to a hidden partial file and renamed into place
    /// only once complete, so an oversized or failed upload never shows up
    /// under a storage name.
    pub fn save(&self, original_name: &str, mut source: impl Read) -> Result<String> {
        let stored_name = format!("{}-{}", self.clock.next(), sanitize_file_name(original_name));
        let final_path = self.path.join(&stored_name);
        let partial_path = self.path.join(format!(".{}{}", stored_name, PARTIAL_SUFFIX));

        let written = match self.write_partial(&partial_path, &mut source) {
            Ok(written) => written,
            Err(e) => {
                discard(&partial_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial_path, &final_path) {
            discard(&partial_path);
            return Err(e.into());
        }

        debug!(stored_name = %stored_name, size = written, "attachment saved");
        Ok(stored_name)
    }

    fn write_partial(&self, partial_path: &Path, source: &mut impl Read) -> Result<u64> {
        let mut file = File::create(partial_path)?;

        // One byte past the cap is enough to tell an oversized upload apart.
        let mut limited = source.take(self.max_bytes.saturating_add(1));
        let written = io::copy(&mut limited, &mut file)?;
        if written > self.max_bytes {
            return Err(CatalogError::PayloadTooLarge {
                limit: self.max_bytes,
            });
        }

        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    /// Delete an attachment. Removing a missing file is not an error.
    pub fn remove(&self, stored_name: &str) -> Result<()> {
        let Some(path) = self.resolve(stored_name) else {
            return Ok(());
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(stored_name = %stored_name, "attachment removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an attachment exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.resolve(stored_name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Open an attachment for reading.
    pub fn open(&self, stored_name: &str) -> Result<File> {
        let path = self
            .resolve(stored_name)
            .ok_or_else(|| CatalogError::AttachmentNotFound(stored_name.to_string()))?;

        File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CatalogError::AttachmentNotFound(stored_name.to_string()),
            _ => e.into(),
        })
    }

    /// Remove every entry in the content directory.
    ///
    /// Every entry is attempted even after a failure; failures are reported
    /// together once the pass is done. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.path)?;
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        let mut failures: Vec<(PathBuf, io::Error)> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    failures.push((self.path.clone(), e));
                    continue;
                }
            };

            // Empty subdirectories go too; a populated one is reported, not
            // recursed into.
            let path = entry.path();
            let outcome = match entry.file_type() {
                Ok(t) if t.is_dir() => fs::remove_dir(&path),
                _ => fs::remove_file(&path),
            };

            match outcome {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove attachment");
                    failures.push((path, e));
                }
            }
        }

        if let Some((path, first)) = failures.first() {
            return Err(CatalogError::ClearFailed {
                failed: failures.len(),
                first: format!("{}: {}", path.display(), first),
            });
        }

        debug!(removed, "content directory cleared");
        Ok(removed)
    }

    /// List storage names of all complete attachments.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Get total size of all complete attachments.
    pub fn total_size(&self) -> Result<u64> {
        let mut total = 0u64;

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let complete = !entry.file_name().to_string_lossy().starts_with('.');
            if complete && entry.file_type()?.is_file() {
                total += entry.metadata()?.len();
            }
        }

        Ok(total)
    }

    /// Largest accepted upload, in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Get the content directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map a storage name to a path inside the content directory.
    ///
    /// Only plain single-component names resolve; anything that could point
    /// outside the directory, or at a partial file, does not.
    fn resolve(&self, stored_name: &str) -> Option<PathBuf> {
        let plain = !stored_name.is_empty()
            && !stored_name.starts_with('.')
            && !stored_name.contains(['/', '\\'])
            && !stored_name.contains('\0');

        plain.then(|| self.path.join(stored_name))
    }
}

/// Make an uploaded file name safe to use as part of a storage name.
///
/// Keeps only the final path component, collapses each whitespace run into a
/// single `_` and replaces control characters with `_`.
pub fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let mut out = String::with_capacity(base.len());
    let mut in_gap = false;
    for c in base.chars() {
        if c.is_whitespace() || c.is_control() {
            if !in_gap {
                out.push(FILLER);
                in_gap = true;
            }
        } else {
            out.push(c);
            in_gap = false;
        }
    }

    if out.is_empty() || out == "." || out == ".." {
        FALLBACK_NAME.to_string()
    } else {
        out
    }
}

/// Best-effort removal of a partial file.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to discard partial upload");
        }
    }
}
