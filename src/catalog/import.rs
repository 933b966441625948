//! Conversion of import payloads into records.

use crate::error::{CatalogError, Result};
use crate::types::{IdClock, Record, RecordId};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Build records from an import payload.
///
/// The payload must be an array of objects. An item keeps its `id` when it
/// carries a truthy integer one; otherwise it gets `base + position`, where
/// `base` is a fresh clock reading covering the whole batch. Attachment
/// fields are always dropped.
pub(crate) fn records_from_payload(payload: &Value, clock: &IdClock) -> Result<Vec<Record>> {
    let items = payload
        .as_array()
        .ok_or_else(|| CatalogError::InvalidPayload("expected an array of records".into()))?;

    let objects = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object().ok_or_else(|| {
                CatalogError::InvalidPayload(format!("item {} is not a record object", i))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let base = clock.reserve(objects.len());
    let mut seen = HashSet::with_capacity(objects.len());
    let mut records = Vec::with_capacity(objects.len());

    for (i, obj) in objects.into_iter().enumerate() {
        let mut id = truthy_id(obj.get("id")).unwrap_or(base + i as i64);
        // Duplicate ids in the input would break catalog uniqueness.
        while !seen.insert(id) {
            id = clock.next();
        }

        records.push(Record {
            id: RecordId(id),
            title: text(obj, "title"),
            console: text(obj, "console"),
            developer: text(obj, "developer"),
            description: text(obj, "description"),
            download_url: text(obj, "downloadUrl"),
            year: year(obj.get("year")),
            file_name: None,
            stored_name: None,
        });
    }

    Ok(records)
}

/// An id worth keeping: a non-zero integer, given as a number or a string.
fn truthy_id(value: Option<&Value>) -> Option<i64> {
    let id = match value? {
        Value::Number(n) => integral(n)?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (id != 0).then_some(id)
}

fn year(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => integral(n),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_array() {
        let clock = IdClock::new();
        let result = records_from_payload(&json!({"title": "x"}), &clock);
        assert!(matches!(result, Err(CatalogError::InvalidPayload(_))));
    }

    #[test]
    fn test_rejects_non_object_items() {
        let clock = IdClock::new();
        let result = records_from_payload(&json!([{"title": "ok"}, 42]), &clock);
        assert!(matches!(result, Err(CatalogError::InvalidPayload(_))));
    }

    #[test]
    fn test_keeps_truthy_ids_and_assigns_the_rest() {
        let clock = IdClock::new();
        let payload = json!([
            {"id": 7, "title": "Kept"},
            {"id": 0, "title": "Zero"},
            {"title": "Missing"},
            {"id": "12", "title": "String id"},
            {"id": "abc", "title": "Bad id"},
        ]);

        let records = records_from_payload(&payload, &clock).unwrap();
        assert_eq!(records[0].id, RecordId(7));
        assert_eq!(records[3].id, RecordId(12));

        let base = records[1].id.0;
        assert_eq!(records[2].id.0, base + 1);
        assert_eq!(records[4].id.0, base + 3);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let clock = IdClock::new();
        let payload = json!([{"id": 5, "title": "A"}, {"id": 5, "title": "B"}]);

        let records = records_from_payload(&payload, &clock).unwrap();
        assert_eq!(records[0].id, RecordId(5));
        assert_ne!(records[1].id, RecordId(5));
    }

    #[test]
    fn test_attachment_fields_are_dropped() {
        let clock = IdClock::new();
        let payload = json!([{
            "id": 1,
            "title": "Has ROM",
            "fileName": "rom.bin",
            "storedName": "123-rom.bin",
        }]);

        let records = records_from_payload(&payload, &clock).unwrap();
        assert_eq!(records[0].file_name, None);
        assert_eq!(records[0].stored_name, None);
    }

    #[test]
    fn test_field_coercion() {
        let clock = IdClock::new();
        let payload = json!([
            {"title": "A", "year": "1991", "downloadUrl": "https://example.org/a"},
            {"title": "B", "year": 1995.0, "console": null},
            {"title": "C", "year": "soon"},
        ]);

        let records = records_from_payload(&payload, &clock).unwrap();
        assert_eq!(records[0].year, Some(1991));
        assert_eq!(records[0].download_url, "https://example.org/a");
        assert_eq!(records[1].year, Some(1995));
        assert_eq!(records[1].console, "");
        assert_eq!(records[2].year, None);
    }

    #[test]
    fn test_empty_array_is_valid() {
        let clock = IdClock::new();
        assert!(records_from_payload(&json!([]), &clock).unwrap().is_empty());
    }
}
