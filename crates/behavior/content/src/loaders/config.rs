//! Engine configuration loader.

use std::path::Path;

use behavior_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`EngineConfig`] from TOML files. Missing keys keep their
/// defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;

        if config.behavior_interval == 0 {
            anyhow::bail!("behavior_interval must be at least one tick");
        }
        if config.sweep_interval == 0 {
            anyhow::bail!("sweep_interval must be at least one tick");
        }
        if config.spawn_attempts == 0 {
            anyhow::bail!("spawn_attempts must be at least one");
        }

        Ok(config)
    }
}
