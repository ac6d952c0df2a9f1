//! Variant-specific decision logic.
//!
//! The category of a creature selects its logic once, at registration
//! ([`VariantState::for_descriptor`]). Each family keeps only the data its
//! own decisions need; everything shared sits on [`InstanceCore`].
mod basic;
mod boss;
mod elite;
mod pack;
mod summoner;

pub use basic::BasicState;
pub use boss::{BossAbility, BossState, EncounterSummary};
pub use elite::EliteState;
pub use pack::PackState;
pub use summoner::SummonerState;

use crate::descriptor::BehaviorDescriptor;
use crate::error::BehaviorResult;
use crate::instance::{InstanceCore, TickContext};
use crate::types::{EntityRef, Location, PlayerId};
use crate::variant::Category;

/// Hooks a behaviour family implements. Everything except `tick` defaults to
/// doing nothing.
pub trait VariantLogic {
    /// Runs once, before the first regular tick.
    fn on_spawn(&mut self, _core: &mut InstanceCore, _ctx: &mut TickContext<'_>) -> BehaviorResult {
        Ok(())
    }

    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult;

    /// The creature landed a melee hit on `victim`.
    fn on_attack(
        &mut self,
        _core: &mut InstanceCore,
        _ctx: &mut TickContext<'_>,
        _victim: PlayerId,
    ) -> BehaviorResult {
        Ok(())
    }

    fn on_damaged(
        &mut self,
        _core: &mut InstanceCore,
        _ctx: &mut TickContext<'_>,
        _attacker: Option<EntityRef>,
        _amount: f32,
    ) -> BehaviorResult {
        Ok(())
    }

    fn on_death(
        &mut self,
        _core: &mut InstanceCore,
        _ctx: &mut TickContext<'_>,
        _killer: Option<PlayerId>,
    ) -> BehaviorResult {
        Ok(())
    }

    /// Releases anything the world shows on behalf of this instance. Runs
    /// after `on_death` and on force-stop.
    fn teardown(&mut self, _core: &mut InstanceCore, _ctx: &mut TickContext<'_>) {}
}

/// Per-family state, selected by category.
#[derive(Clone, Debug)]
pub enum VariantState {
    Basic(BasicState),
    Elite(EliteState),
    Boss(BossState),
    Summoner(SummonerState),
    Pack(PackState),
}

impl VariantState {
    pub fn for_descriptor(descriptor: &BehaviorDescriptor, anchor: Location) -> Self {
        match descriptor.category {
            Category::Basic => Self::Basic(BasicState::new(descriptor.kind)),
            Category::Elite => Self::Elite(EliteState::new()),
            Category::MiniBoss | Category::ZoneBoss | Category::FinalBoss => {
                Self::Boss(BossState::new(descriptor, anchor))
            }
            Category::Summoner => Self::Summoner(SummonerState::new()),
            Category::Pack => Self::Pack(PackState::new(descriptor)),
        }
    }

    pub(crate) fn logic_mut(&mut self) -> &mut dyn VariantLogic {
        match self {
            Self::Basic(state) => state,
            Self::Elite(state) => state,
            Self::Boss(state) => state,
            Self::Summoner(state) => state,
            Self::Pack(state) => state,
        }
    }

    pub fn encounter(&self, core: &InstanceCore) -> Option<EncounterSummary> {
        match self {
            Self::Boss(state) => Some(state.summary(core)),
            _ => None,
        }
    }

    pub fn as_boss(&self) -> Option<&BossState> {
        match self {
            Self::Boss(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_pack(&self) -> Option<&PackState> {
        match self {
            Self::Pack(state) => Some(state),
            _ => None,
        }
    }
}
