//! Data-driven tuning for the behaviour engine.
//!
//! Loads per-kind [`BehaviorDescriptor`](behavior_core::BehaviorDescriptor)
//! tables from RON and the engine cadence from TOML. The reference tables ship
//! with the crate and are available without touching the filesystem through
//! [`DescriptorLoader::builtin`].
//!
//! Content is consumed once at start-up; nothing here runs during a tick.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, DescriptorCatalog, DescriptorLoader, LoadResult};
