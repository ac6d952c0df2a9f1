//! Creature behaviour engine.
//!
//! `behavior-core` decides what hostile creatures do on top of a host world.
//! Every registered creature gets a [`BehaviorInstance`] whose logic is picked
//! from its [`Variant`] category: basic melee variants, elites with a short
//! phase ladder, multi-phase bosses with encounters, summoners and pack
//! hunters.
//!
//! The crate is synchronous and performs no I/O. The host implements
//! [`World`] and drives a [`BehaviorManager`]:
//!
//! * [`BehaviorManager::register`] when a creature spawns,
//! * [`BehaviorManager::advance`] once per logical tick (20 per second),
//! * the `dispatch_*` notifications when the creature attacks, takes damage
//!   or dies.
//!
//! Decisions never fail the caller: errors and panics inside one instance are
//! contained, logged under the `behavior::*` tracing targets and reported as
//! [`BehaviorEvent::Fault`].
//!
//! # Modules
//!
//! * [`primitives`]: cooldowns, phase ladder, leash, participants, minions,
//!   pack bonus, commit cycle and channels.
//! * [`variants`]: per-family decision logic.
//! * [`deferred`]: scheduled follow-up actions.
//! * [`descriptor`]: per-kind tuning tables.
//! * [`env`]: the traits the host implements.
pub mod config;
pub mod deferred;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod events;
pub mod instance;
pub mod manager;
pub mod primitives;
pub mod types;
pub mod variant;
pub mod variants;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::EngineConfig;
pub use deferred::{DeferredAction, DeferredQueue, Impact, ImpactSite, MinionPool};
pub use descriptor::{BehaviorDescriptor, DescriptorError, DescriptorTable, PhaseTransitionSpec};
pub use env::{
    Announcement, Attribute, CreatureSnapshot, EffectSink, EncounterBar, EncounterUpdate, FxKind,
    PlayerSnapshot, Radii, Spawner, StatusEffect, StatusKind, World, WorldOracle,
};
pub use error::{BehaviorError, BehaviorResult, EngineError, ErrorSeverity};
pub use events::{Ability, BehaviorEvent, RemovalReason};
pub use instance::{BehaviorFlags, BehaviorInstance, InstanceCore, TickContext};
pub use manager::{AdvanceReport, BehaviorManager, ManagerMetrics, ManagerStats, MetricsSnapshot, PassReport};
pub use types::{CreatureId, EntityRef, Location, PlayerId, Tick, Vec3};
pub use variant::{Category, Variant, VariantKind};
pub use variants::{EncounterSummary, VariantLogic, VariantState};
