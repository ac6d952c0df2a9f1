//! Descriptor table loader.

use std::path::Path;

use behavior_core::{BehaviorDescriptor, DescriptorTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

/// Reference tuning shipped with the crate.
const BUILTIN_DESCRIPTORS: &str = include_str!("../../data/descriptors.ron");

/// Descriptor catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorCatalog {
    pub descriptors: Vec<BehaviorDescriptor>,
}

/// Loader for descriptor tables from RON files.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Load a descriptor table from a RON file.
    ///
    /// Every descriptor is validated; a kind listed twice is an error.
    pub fn load(path: &Path) -> LoadResult<DescriptorTable> {
        let content = read_file(path)?;
        let table = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        debug!(target: "behavior::content", path = %path.display(), kinds = table.len(), "descriptors loaded");
        Ok(table)
    }

    pub fn parse(content: &str) -> LoadResult<DescriptorTable> {
        let catalog: DescriptorCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse descriptor catalog RON: {}", e))?;

        DescriptorTable::from_descriptors(catalog.descriptors)
            .map_err(|e| anyhow::anyhow!("Invalid descriptor: {}", e))
    }

    /// The shipped reference table.
    pub fn builtin() -> LoadResult<DescriptorTable> {
        Self::parse(BUILTIN_DESCRIPTORS)
    }

    /// Applies the descriptors in `path` on top of `base`, replacing kinds
    /// listed in both.
    pub fn overlay(base: &mut DescriptorTable, path: &Path) -> LoadResult<usize> {
        let content = read_file(path)?;
        let catalog: DescriptorCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse descriptor catalog RON: {}", e))?;

        let count = catalog.descriptors.len();
        for descriptor in catalog.descriptors {
            let kind = descriptor.kind;
            base.upsert(descriptor)
                .map_err(|e| anyhow::anyhow!("Invalid descriptor for {}: {}", kind, e))?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use behavior_core::VariantKind;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn builtin_matches_reference_tuning() {
        let table = DescriptorLoader::builtin().unwrap();
        assert_eq!(table.len(), VariantKind::iter().count());
        for kind in VariantKind::iter() {
            assert_eq!(
                table.get(kind).map(|d| d.as_ref()),
                Some(&BehaviorDescriptor::standard(kind)),
                "{kind}"
            );
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let content = "(descriptors: [(kind: Walker, category: Basic), (kind: Walker, category: Basic)])";
        let err = DescriptorLoader::parse(content).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let content = "(descriptors: [(kind: Butcher, category: MiniBoss, phase_thresholds: [0.2, 0.5])])";
        assert!(DescriptorLoader::parse(content).is_err());
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let table = DescriptorLoader::parse("(descriptors: [(kind: Runner, category: Basic)])").unwrap();
        assert_eq!(
            table.get(VariantKind::Runner).map(|d| d.as_ref()),
            Some(&BehaviorDescriptor::new(VariantKind::Runner))
        );
    }
}
