//! Built-in sample catalog.

use crate::types::{Catalog, Record, RecordId};
use std::sync::LazyLock;

/// Number of records in the seed dataset.
pub const SEED_RECORD_COUNT: usize = 4;

static SEED: LazyLock<Catalog> = LazyLock::new(|| {
    vec![
        sample(
            1,
            "Star Courier",
            "NES",
            "Pixelwright Studio",
            1989,
            "Deliver parcels across a hostile asteroid belt in this side-scrolling shooter.",
        ),
        sample(
            2,
            "Crystal Caverns",
            "SNES",
            "Lumen Games",
            1994,
            "Puzzle-platformer about light, mirrors and a very lost miner.",
        ),
        sample(
            3,
            "Turbo Tanuki",
            "Genesis",
            "Redline Works",
            1992,
            "High-speed racing through forests, rooftops and a haunted shrine.",
        ),
        sample(
            4,
            "Pocket Dungeon",
            "Game Boy",
            "Tiny Forge",
            1997,
            "Bite-sized roguelike dungeon crawler designed for short sessions.",
        ),
    ]
    .into()
});

fn sample(
    id: i64,
    title: &str,
    console: &str,
    developer: &str,
    year: i64,
    description: &str,
) -> Record {
    Record {
        id: RecordId(id),
        title: title.to_string(),
        console: console.to_string(),
        developer: developer.to_string(),
        description: description.to_string(),
        download_url: String::new(),
        year: Some(year),
        file_name: None,
        stored_name: None,
    }
}

/// A fresh copy of the seed dataset.
pub fn seed_catalog() -> Catalog {
    SEED.clone()
}
