//! Locations of the database and preference files.
//!
//! Paths are resolved once by the binary and passed down. Library types never
//! read the environment themselves.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PATHWAY_DATA_DIR";

const APP_DIR_NAME: &str = "pathway";
const DATABASE_FILE: &str = "learning.db";
const PROFILE_PREFS_FILE: &str = "profile_prefs.json";
const PROGRESS_PREFS_FILE: &str = "learning_progress_prefs.json";

/// Resolved file locations for one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// Uses `data_dir` as-is.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolves the data directory.
    ///
    /// `PATHWAY_DATA_DIR` wins when set and non-empty (a `.env` file in the
    /// working directory is loaded first). Otherwise the platform data
    /// directory is used:
    /// - Linux: `~/.local/share/pathway`
    /// - macOS: `~/Library/Application Support/pathway`
    /// - Windows: `C:\Users\<user>\AppData\Roaming\pathway`
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the platform data directory
    /// cannot be determined.
    pub fn resolve() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Ignoring unreadable .env file");
            }
        }

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }

        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;
        Ok(Self::new(data_dir.join(APP_DIR_NAME)))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn profile_prefs_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_PREFS_FILE)
    }

    pub fn progress_prefs_path(&self) -> PathBuf {
        self.data_dir.join(PROGRESS_PREFS_FILE)
    }

    /// Creates the data directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })
    }
}
