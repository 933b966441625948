//! Catalog configuration.

use std::path::PathBuf;

/// Environment variable that opts in to a reset at startup.
pub const RESET_ENV_VAR: &str = "ROM_CATALOG_RESET";

/// Command-line flag that opts in to a reset at startup.
pub const RESET_FLAG: &str = "--reset";

/// Default upload cap: 200 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Catalog configuration.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Path of the JSON document holding the catalog.
    pub store_path: PathBuf,

    /// Directory holding attachment files.
    pub content_dir: PathBuf,

    /// Largest accepted attachment, in bytes.
    pub max_upload_bytes: u64,

    /// Reset the catalog and content directory when opening.
    pub reset_on_start: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./data/games.json"),
            content_dir: PathBuf::from("./data/roms"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            reset_on_start: false,
        }
    }
}

impl CatalogConfig {
    /// Configuration rooted at a single data directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            store_path: dir.join("games.json"),
            content_dir: dir.join("roms"),
            ..Default::default()
        }
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn with_reset_on_start(mut self, reset: bool) -> Self {
        self.reset_on_start = reset;
        self
    }

    /// Apply the startup opt-in from the process environment and arguments.
    pub fn with_env_overrides(self) -> Self {
        let env_value = std::env::var(RESET_ENV_VAR).ok();
        let requested = reset_requested(env_value.as_deref(), std::env::args().skip(1));
        self.with_reset_on_start(requested)
    }
}

/// Whether a startup reset was explicitly requested.
///
/// Absent both signals the store is left untouched across restarts.
pub fn reset_requested<I, S>(env_value: Option<&str>, args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let from_env = env_value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    from_env || args.into_iter().any(|a| a.as_ref() == RESET_FLAG)
}
