//! Tunables for the external sort.
//!
//! A [`SortConfig`] can be attached to a single sort stage with
//! [`Graph::sort_with`](crate::Graph::sort_with) or supplied run-wide through
//! [`Bindings::with_sort_config`](crate::Bindings::with_sort_config). Stages without an
//! explicit config use the run-wide one, and that falls back to [`SortConfig::default`].

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default number of rows held in memory per sorted chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 100_000;

/// Memory bound and spill location for the external sort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortConfig {
    /// Rows per in-memory chunk. Inputs no larger than this never touch disk.
    pub chunk_capacity: usize,
    /// Directory for spill files. `None` uses the system temp directory.
    pub spill_dir: Option<PathBuf>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            spill_dir: None,
        }
    }
}

impl SortConfig {
    /// Config with the given chunk capacity; zero is rejected.
    pub fn with_chunk_capacity(chunk_capacity: usize) -> Result<Self> {
        Self::default().chunk_capacity(chunk_capacity)
    }

    pub fn chunk_capacity(mut self, chunk_capacity: usize) -> Result<Self> {
        if chunk_capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "sort chunk capacity must be at least 1".to_string(),
            ));
        }
        self.chunk_capacity = chunk_capacity;
        Ok(self)
    }

    #[must_use]
    pub fn spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    pub(crate) fn spill_path(&self) -> PathBuf {
        self.spill_dir
            .as_deref()
            .map_or_else(std::env::temp_dir, Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            SortConfig::with_chunk_capacity(0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn defaults_to_system_temp_dir() {
        let cfg = SortConfig::default();
        assert_eq!(cfg.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        assert_eq!(cfg.spill_path(), std::env::temp_dir());
    }
}
