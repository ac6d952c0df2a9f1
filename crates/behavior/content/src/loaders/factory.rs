//! Content factory for loading engine tuning from a data directory.

use std::path::{Path, PathBuf};

use behavior_core::{DescriptorTable, EngineConfig};
use tracing::info;

use crate::loaders::{ConfigLoader, DescriptorLoader, LoadResult};

/// Loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── engine.toml        (optional)
/// ├── descriptors.ron    (optional, replaces the built-in table)
/// └── overrides.ron      (optional, patched over the table)
/// ```
///
/// Missing files fall back to the built-in defaults; files that exist but do
/// not parse or validate are errors.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the engine configuration from `engine.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("engine.toml");
        if !path.exists() {
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the descriptor table from `descriptors.ron`, then apply
    /// `overrides.ron`.
    pub fn load_descriptors(&self) -> LoadResult<DescriptorTable> {
        let path = self.data_dir.join("descriptors.ron");
        let mut table = if path.exists() {
            DescriptorLoader::load(&path)?
        } else {
            DescriptorLoader::builtin()?
        };

        let overrides = self.data_dir.join("overrides.ron");
        if overrides.exists() {
            let count = DescriptorLoader::overlay(&mut table, &overrides)?;
            info!(target: "behavior::content", count, "descriptor overrides applied");
        }
        Ok(table)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
