//! Catalog manager implementation.

use crate::attachments::AttachmentStore;
use crate::catalog::filter::{ListFilter, Listing};
use crate::catalog::import::records_from_payload;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::records::{seed_catalog, RecordStore};
use crate::types::{
    Catalog, CatalogStats, IdClock, NewRecord, Record, RecordId, StagedAttachment,
};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// An attachment opened for download.
#[derive(Debug)]
pub struct AttachmentDownload {
    /// Open handle on the stored file.
    pub file: File,

    /// Name to present to the downloader (the uploaded name).
    pub file_name: String,
}

/// Keeps the record store and the attachment directory consistent.
///
/// Every operation runs its own load-modify-save cycle on the record store.
/// Mutating operations are serialized through a write lock, and a lock file
/// keeps other processes off the same catalog.
pub struct CatalogManager {
    /// Manager configuration.
    config: CatalogConfig,

    /// Lock file for exclusive access.
    _lock_file: File,

    /// Record store.
    records: RecordStore,

    /// Attachment storage.
    attachments: AttachmentStore,

    /// Source of record ids, shared with attachment naming.
    clock: Arc<IdClock>,

    /// Lock for write operations to avoid lost updates.
    write_lock: Mutex<()>,
}

impl CatalogManager {
    /// Open the catalog described by `config`.
    ///
    /// Runs [`reset`](Self::reset) first when the config opts in to a
    /// startup reset.
    pub fn open(config: CatalogConfig) -> Result<Self> {
        let records = RecordStore::new(&config.store_path)?;
        let lock_file = Self::acquire_lock(&config.store_path)?;

        let clock = Arc::new(IdClock::new());
        let attachments =
            AttachmentStore::new(&config.content_dir, config.max_upload_bytes, Arc::clone(&clock))?;

        let manager = Self {
            config,
            _lock_file: lock_file,
            records,
            attachments,
            clock,
            write_lock: Mutex::new(()),
        };

        if manager.config.reset_on_start {
            info!(path = %manager.config.store_path.display(), "startup reset requested");
            manager.reset()?;
        }

        Ok(manager)
    }

    // --- Queries ---

    /// List records matching `filter`, in catalog order.
    pub fn list(&self, filter: &ListFilter) -> Listing {
        Listing::new(self.records.load(), filter)
    }

    /// Get a record by ID.
    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.records.load().get(id).cloned()
    }

    /// Open the attachment of a record for download.
    ///
    /// A missing record, a record without attachment and a record whose file
    /// has disappeared all fail as not found.
    pub fn get_attachment(&self, id: RecordId) -> Result<AttachmentDownload> {
        let catalog = self.records.load();
        let record = catalog.get(id).ok_or(CatalogError::RecordNotFound(id))?;

        let stored_name = record
            .stored_name
            .as_deref()
            .ok_or_else(|| CatalogError::AttachmentNotFound(format!("record {}", id)))?;

        let file = self.attachments.open(stored_name)?;
        let file_name = record
            .file_name
            .clone()
            .unwrap_or_else(|| stored_name.to_string());

        Ok(AttachmentDownload { file, file_name })
    }

    /// The full catalog, unfiltered.
    pub fn export(&self) -> Catalog {
        self.records.load()
    }

    /// The full catalog in its persisted JSON form.
    pub fn export_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.export())?)
    }

    /// Get catalog statistics.
    pub fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            record_count: self.records.load().len() as u64,
            attachment_count: self.attachments.list()?.len() as u64,
            attachment_size_bytes: self.attachments.total_size()?,
        })
    }

    // --- Mutations ---

    /// Create a record from submitted fields and an already staged
    /// attachment.
    ///
    /// Any validation failure removes the staged attachment before the error
    /// is returned. If saving the catalog fails afterwards, the attachment
    /// stays on disk unreferenced and the failure is reported as is.
    pub fn create(
        &self,
        fields: NewRecord,
        attachment: Option<StagedAttachment>,
    ) -> Result<Record> {
        let year = match self.validate(&fields, attachment.as_ref()) {
            Ok(year) => year,
            Err(e) => {
                if let Some(staged) = &attachment {
                    self.discard_staged(staged);
                }
                return Err(e);
            }
        };
        let Some(staged) = attachment else {
            return Err(CatalogError::MissingAttachment);
        };

        let _lock = self.write_lock.lock();

        // A reset may have cleared the content directory since validation.
        if !self.attachments.exists(&staged.stored_name) {
            return Err(CatalogError::MissingAttachment);
        }
        let mut catalog = self.records.load();

        let mut id = RecordId(self.clock.next());
        while catalog.contains(id) {
            id = RecordId(self.clock.next());
        }

        let record = Record {
            id,
            title: fields.title.unwrap_or_default(),
            console: fields.console.unwrap_or_default(),
            developer: fields.developer.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            download_url: fields.download_url.unwrap_or_default(),
            year: Some(year),
            file_name: Some(staged.file_name),
            stored_name: Some(staged.stored_name),
        };

        catalog.push(record.clone());
        if let Err(e) = self.records.save(&catalog) {
            warn!(
                id = %record.id,
                stored_name = record.stored_name.as_deref().unwrap_or_default(),
                error = %e,
                "catalog save failed, attachment left unreferenced"
            );
            return Err(e);
        }

        info!(id = %record.id, title = %record.title, "record created");
        Ok(record)
    }

    /// Stage an upload and create a record referencing it.
    ///
    /// The upload is written before the fields are validated, so a rejected
    /// record still exercises the staged-attachment cleanup in
    /// [`create`](Self::create).
    pub fn create_with_upload(
        &self,
        fields: NewRecord,
        original_name: &str,
        source: impl Read,
    ) -> Result<Record> {
        let stored_name = self.attachments.save(original_name, source)?;
        let staged = StagedAttachment {
            stored_name,
            file_name: original_name.to_string(),
        };
        self.create(fields, Some(staged))
    }

    /// Delete a record and its attachment.
    ///
    /// The attachment goes first: a failure between the two steps leaves an
    /// unreferenced file rather than a record pointing at nothing.
    pub fn delete(&self, id: RecordId) -> Result<()> {
        let _lock = self.write_lock.lock();
        let mut catalog = self.records.load();

        let record = catalog.remove(id).ok_or(CatalogError::RecordNotFound(id))?;
        if let Some(stored_name) = &record.stored_name {
            self.attachments.remove(stored_name)?;
        }

        self.records.save(&catalog)?;

        info!(id = %id, "record deleted");
        Ok(())
    }

    /// Replace the whole catalog with the records in `payload`.
    ///
    /// Imported records never reference attachments, and attachment files
    /// already on disk are left alone. Returns the number of records.
    pub fn import(&self, payload: &serde_json::Value) -> Result<usize> {
        let records = records_from_payload(payload, &self.clock)?;
        let count = records.len();

        let _lock = self.write_lock.lock();
        self.records.save(&Catalog::from(records))?;

        info!(count, "catalog imported");
        Ok(count)
    }

    /// Parse `bytes` as JSON and [`import`](Self::import) it.
    pub fn import_json(&self, bytes: &[u8]) -> Result<usize> {
        let payload: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| CatalogError::InvalidPayload(e.to_string()))?;
        self.import(&payload)
    }

    /// Empty the content directory and restore the seed catalog.
    ///
    /// Both steps are always attempted; the first failure is returned.
    pub fn reset(&self) -> Result<()> {
        let _lock = self.write_lock.lock();

        let cleared = self.attachments.clear();
        if let Err(e) = &cleared {
            warn!(error = %e, "content directory not fully cleared");
        }
        let saved = self.records.save(&seed_catalog());

        let removed = cleared?;
        saved?;

        info!(removed, "catalog reset to seed data");
        Ok(())
    }

    // --- Accessors ---

    /// Attachment storage, for staging uploads.
    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    /// Record store.
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // --- Private Helpers ---

    /// Check submitted fields, returning the parsed year.
    fn validate(&self, fields: &NewRecord, attachment: Option<&StagedAttachment>) -> Result<i64> {
        required(&fields.title, "title")?;
        required(&fields.console, "console")?;
        let year = parse_year(required(&fields.year, "year")?)?;

        match attachment {
            Some(staged) if self.attachments.exists(&staged.stored_name) => Ok(year),
            _ => Err(CatalogError::MissingAttachment),
        }
    }

    fn discard_staged(&self, staged: &StagedAttachment) {
        if let Err(e) = self.attachments.remove(&staged.stored_name) {
            warn!(
                stored_name = %staged.stored_name,
                error = %e,
                "failed to remove rejected upload"
            );
        }
    }

    fn acquire_lock(store_path: &Path) -> Result<File> {
        let lock_path = store_path.with_extension("lock");
        let lock_file = File::create(lock_path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| CatalogError::Locked)?;

        Ok(lock_file)
    }
}

/// A present, non-blank field value.
fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CatalogError::MissingField(field))
}

/// Parse a year given as text. Integral decimals such as `1994.0` are accepted.
fn parse_year(text: &str) -> Result<i64> {
    if let Ok(year) = text.parse::<i64>() {
        return Ok(year);
    }

    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
        .ok_or_else(|| CatalogError::InvalidYear(text.to_string()))
}
