//! Performance benchmarks for the catalog.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rom_catalog::{CatalogConfig, CatalogManager, ListFilter, NewRecord};
use serde_json::json;
use std::io::Cursor;
use tempfile::TempDir;

fn create_manager(dir: &TempDir) -> CatalogManager {
    CatalogManager::open(CatalogConfig::in_dir(dir.path().join("data"))).unwrap()
}

fn import_games(manager: &CatalogManager, count: usize) {
    let payload: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "title": format!("Game {}", i),
                "console": if i % 2 == 0 { "NES" } else { "SNES" },
                "developer": format!("Studio {}", i % 17),
                "description": "A platformer with a very long description to search through",
                "year": 1980 + (i % 40) as i64,
            })
        })
        .collect();
    manager.import(&json!(payload)).unwrap();
}

/// Benchmark filtered listing with varying catalog sizes
fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("catalog_size", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let manager = create_manager(&dir);
            import_games(&manager, size);

            let filter = ListFilter::new().query("studio 3").console("NES").min_year(1990);
            b.iter(|| {
                black_box(manager.list(&filter).count());
            });
        });
    }

    group.finish();
}

/// Benchmark create + delete, each rewriting the whole catalog
fn bench_create_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_delete");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("catalog_size", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let manager = create_manager(&dir);
            import_games(&manager, size);

            let rom = vec![0u8; 64 * 1024];
            b.iter(|| {
                let record = manager
                    .create_with_upload(
                        NewRecord::new("Bench", "NES", "1990"),
                        "bench.nes",
                        Cursor::new(&rom),
                    )
                    .unwrap();
                manager.delete(record.id).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_list, bench_create_delete);
criterion_main!(benches);
