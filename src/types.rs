//! Core types for the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time. A clock set before the epoch reads as zero.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        Timestamp(millis)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Monotonic millisecond clock used for record ids and storage names.
///
/// Each reading is `max(now, previous + 1)`, so two readings inside the same
/// millisecond never collide within one process. Separate processes sharing a
/// catalog can still collide; the lock file prevents that deployment.
#[derive(Debug, Default)]
pub struct IdClock {
    last: AtomicI64,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next reading.
    pub fn next(&self) -> i64 {
        let now = Timestamp::now().0;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Reserve `count` consecutive readings and return the first one.
    pub fn reserve(&self, count: usize) -> i64 {
        let count = count.max(1) as i64;
        let now = Timestamp::now().0;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let first = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                first + count - 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return first,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// A single catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier (assigned at creation).
    pub id: RecordId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub console: String,

    #[serde(default)]
    pub developer: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub download_url: String,

    #[serde(default)]
    pub year: Option<i64>,

    /// Name of the attachment as uploaded.
    #[serde(default)]
    pub file_name: Option<String>,

    /// Name of the attachment inside the content directory.
    #[serde(default)]
    pub stored_name: Option<String>,
}

impl Record {
    /// Whether this record references an attachment.
    pub fn has_attachment(&self) -> bool {
        self.stored_name.is_some()
    }

    /// Text searched by the free-text filter.
    pub(crate) fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.developer, self.description).to_lowercase()
    }
}

/// The ordered set of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Get a record by id.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Append a record, keeping insertion order.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Remove a record by id, returning it if present.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(pos))
    }
}

impl From<Vec<Record>> for Catalog {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for Catalog {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Catalog {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Submitted fields for a new record, as received from a form.
///
/// Values are kept as raw text so validation can distinguish a missing year
/// from a malformed one.
#[derive(Clone, Debug, Default)]
pub struct NewRecord {
    pub title: Option<String>,
    pub console: Option<String>,
    pub year: Option<String>,
    pub developer: Option<String>,
    pub description: Option<String>,
    pub download_url: Option<String>,
}

impl NewRecord {
    /// Create input with the three required fields.
    pub fn new(
        title: impl Into<String>,
        console: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            console: Some(console.into()),
            year: Some(year.into()),
            ..Default::default()
        }
    }

    pub fn with_developer(mut self, developer: impl Into<String>) -> Self {
        self.developer = Some(developer.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }
}

/// An attachment already written to the content directory, not yet
/// referenced by any record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedAttachment {
    /// Name under which the file was saved.
    pub stored_name: String,
    /// Name supplied by the uploader.
    pub file_name: String,
}

/// Catalog statistics.
#[derive(Clone, Debug, Default)]
pub struct CatalogStats {
    pub record_count: u64,
    pub attachment_count: u64,
    pub attachment_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> Record {
        Record {
            id: RecordId(id),
            title: format!("Game {}", id),
            console: "SNES".into(),
            developer: String::new(),
            description: String::new(),
            download_url: String::new(),
            year: Some(1994),
            file_name: None,
            stored_name: None,
        }
    }

    #[test]
    fn test_id_clock_is_strictly_increasing() {
        let clock = IdClock::new();
        let mut last = clock.next();
        for _ in 0..1000 {
            let next = clock.next();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_id_clock_reserve_skips_block() {
        let clock = IdClock::new();
        let first = clock.reserve(5);
        let after = clock.next();
        assert!(after >= first + 5);
    }

    #[test]
    fn test_record_defaults_when_fields_absent() {
        let parsed: Record = serde_json::from_str(r#"{"id": 3, "title": "Only Title"}"#).unwrap();
        assert_eq!(parsed.id, RecordId(3));
        assert_eq!(parsed.console, "");
        assert_eq!(parsed.download_url, "");
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.stored_name, None);
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let mut r = record(1);
        r.file_name = Some("rom.sfc".into());
        r.stored_name = Some("1-rom.sfc".into());
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["fileName"], "rom.sfc");
        assert_eq!(value["storedName"], "1-rom.sfc");
        assert!(value.get("downloadUrl").is_some());
    }

    #[test]
    fn test_catalog_remove_preserves_order() {
        let mut catalog: Catalog = (1..=4).map(record).collect();
        let removed = catalog.remove(RecordId(2)).unwrap();
        assert_eq!(removed.id, RecordId(2));
        let ids: Vec<_> = catalog.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(catalog.remove(RecordId(2)).is_none());
    }

    #[test]
    fn test_catalog_serializes_as_array() {
        let catalog: Catalog = vec![record(1)].into();
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.is_array());
    }
}
