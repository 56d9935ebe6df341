use std::env;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::storage::{FileStore, MemoryStore, Persistence};
use directories::ProjectDirs;
use dotenvy::dotenv;
use log::warn;

/// Browser local storage typically allows about this much per origin.
pub const DEFAULT_STORE_QUOTA: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// JSON file backing the persistent store.
    pub store_path: Option<PathBuf>,
    pub store_quota: usize,
    /// Where exported images are written.
    pub output_dir: PathBuf,
    /// Keep everything in memory for this run.
    pub disable_store: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let store_path = env::var("CATS_EYE_STORE")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(Self::default_store_path);

        let store_quota = match env::var("CATS_EYE_STORE_QUOTA") {
            Ok(quota) => quota.trim().parse::<usize>().map_err(|_| {
                AppError::config(format!(
                    "CATS_EYE_STORE_QUOTA must be a byte count, got {quota:?}"
                ))
            })?,
            Err(_) => DEFAULT_STORE_QUOTA,
        };

        let output_dir = env::var("CATS_EYE_OUTPUT_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let disable_store = env::var("CATS_EYE_DISABLE_STORE").is_ok_and(|value| !value.is_empty());

        Ok(Self {
            store_path,
            store_quota,
            output_dir,
            disable_store,
        })
    }

    /// `store.json` in the platform config directory, e.g.
    /// `~/.config/cats-eye/store.json` on Linux.
    pub fn default_store_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cats-eye").map(|dirs| dirs.config_dir().join("store.json"))
    }

    /// Opens the configured store.
    ///
    /// With storage disabled this is an in-memory store, so the session
    /// still works but forgets everything on exit. With no usable path there
    /// is no store at all.
    pub fn open_persistence(&self) -> Persistence {
        if self.disable_store {
            return Persistence::new(MemoryStore::with_quota(self.store_quota));
        }
        match &self.store_path {
            Some(path) => Persistence::new(FileStore::open(path, Some(self.store_quota))),
            None => {
                warn!("No config directory available; work will not be saved");
                Persistence::unavailable()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: Self::default_store_path(),
            store_quota: DEFAULT_STORE_QUOTA,
            output_dir: PathBuf::from("."),
            disable_store: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_store_is_in_memory() {
        let config = Config {
            store_path: None,
            disable_store: true,
            ..Config::default()
        };
        let mut persistence = config.open_persistence();
        assert!(persistence.is_available());
        persistence
            .store_last_image("a.png", "image/png", &[7])
            .unwrap();
        assert!(persistence.has_image());
    }

    #[test]
    fn missing_path_means_no_store() {
        let config = Config {
            store_path: None,
            ..Config::default()
        };
        assert!(!config.open_persistence().is_available());
    }
}
