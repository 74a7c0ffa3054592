//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// How to open a [`KvStore`](crate::KvStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long a writer waits on a locked database file.
    pub busy_timeout_ms: u64,
    /// Use the WAL journal for file databases.
    pub wal: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            wal: true,
        }
    }
}

impl KvConfig {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }
}
