//! Property tests for filtering, import and name sanitizing.

use proptest::prelude::*;
use rom_catalog::attachments::sanitize_file_name;
use rom_catalog::{CatalogConfig, CatalogManager, ListFilter};
use serde_json::json;
use tempfile::TempDir;

fn game() -> impl Strategy<Value = (String, String, Option<i64>)> {
    (
        "[A-Za-z ]{0,12}",
        prop::sample::select(vec!["NES", "SNES", "Genesis", "N64"]),
        prop::option::of(1970i64..2030),
    )
        .prop_map(|(title, console, year)| (title, console.to_string(), year))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn listing_is_ordered_subset_respecting_bounds(
        games in prop::collection::vec(game(), 0..20),
        min in prop::option::of(1970i64..2030),
        max in prop::option::of(1970i64..2030),
        console in prop::option::of(prop::sample::select(vec!["NES", "SNES"])),
    ) {
        let dir = TempDir::new().unwrap();
        let manager = CatalogManager::open(CatalogConfig::in_dir(dir.path().join("data"))).unwrap();

        let payload: Vec<_> = games
            .iter()
            .map(|(title, console, year)| json!({"title": title, "console": console, "year": year}))
            .collect();
        manager.import(&json!(payload)).unwrap();

        let filter = ListFilter {
            query: None,
            console: console.map(str::to_string),
            min_year: min,
            max_year: max,
        };
        let all = manager.export();
        let listed: Vec<_> = manager.list(&filter).to_vec();

        // Same records, same relative order, as a direct scan.
        let expected: Vec<_> = all.iter().filter(|r| filter.matches(r)).cloned().collect();
        prop_assert_eq!(&listed, &expected);

        for r in &listed {
            let year = r.year.unwrap_or(0);
            prop_assert!(min.map_or(true, |m| year >= m));
            prop_assert!(max.map_or(true, |m| year <= m));
        }
    }

    #[test]
    fn import_keeps_count_and_drops_attachments(
        titles in prop::collection::vec("[a-z]{1,8}", 0..15),
    ) {
        let dir = TempDir::new().unwrap();
        let manager = CatalogManager::open(CatalogConfig::in_dir(dir.path().join("data"))).unwrap();

        let payload: Vec<_> = titles
            .iter()
            .map(|t| json!({"title": t, "fileName": "x.bin", "storedName": "1-x.bin"}))
            .collect();
        let count = manager.import(&json!(payload)).unwrap();

        let catalog = manager.export();
        prop_assert_eq!(count, titles.len());
        prop_assert_eq!(catalog.len(), titles.len());
        prop_assert!(catalog.iter().all(|r| r.file_name.is_none() && r.stored_name.is_none()));

        let mut ids: Vec<_> = catalog.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), titles.len());
    }

    #[test]
    fn sanitized_names_are_single_plain_components(name in "\\PC{0,40}") {
        let sanitized = sanitize_file_name(&name);
        prop_assert!(!sanitized.is_empty());
        prop_assert!(!sanitized.contains('/') && !sanitized.contains('\\'));
        prop_assert!(!sanitized.chars().any(|c| c.is_whitespace() || c.is_control()));
    }
}
