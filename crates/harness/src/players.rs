//! Simulated players fighting the arena's creatures.
//!
//! Each round every player walks towards the closest creature and swings
//! when in reach. Creatures targeting a player in melee range land hits of
//! their own. The outcome is relayed to the runtime as host notifications,
//! together with any creatures the engine spawned since the last round.

use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime::{RuntimeError, RuntimeHandle};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use behavior_core::EntityRef;

use crate::arena::ArenaWorld;

const MELEE_REACH: f64 = 3.0;
const WALK_STEP: f64 = 1.5;

pub struct PlayerSim {
    world: ArenaWorld,
    handle: RuntimeHandle,
    rng: StdRng,
    round: Duration,
}

impl PlayerSim {
    pub fn new(world: ArenaWorld, handle: RuntimeHandle, seed: Option<u64>, round: Duration) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            world,
            handle,
            rng,
            round,
        }
    }

    /// Runs rounds until `stop` flips to true.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Result<u64> {
        let mut interval = tokio::time::interval(self.round);
        let mut kills = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match self.round().await {
                Ok(round_kills) => kills += round_kills,
                Err(RuntimeError::CommandChannelClosed) => {
                    warn!(target: "harness::players", "runtime stopped, ending player simulation");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(target: "harness::players", kills, "player simulation finished");
        Ok(kills)
    }

    async fn round(&mut self) -> runtime::Result<u64> {
        self.register_pending().await?;

        let mut kills = 0;
        for player in self.world.players() {
            for attacker in self.world.attackers_of(&player, MELEE_REACH) {
                self.handle.attack_landed(attacker, player.id).await?;
            }

            let Some(prey) = self.world.closest_creature(&player) else {
                continue;
            };
            if prey.position.distance(&player.position) > MELEE_REACH {
                self.world.walk_player(player.id, prey.position, WALK_STEP);
                continue;
            }

            let amount = self.rng.gen_range(3.0..9.0);
            let Some(left) = self.world.strike(prey.id, amount) else {
                continue;
            };
            self.handle
                .creature_damaged(prey.id, Some(EntityRef::Player(player.id)), amount)
                .await?;

            if left <= 0.0 {
                self.handle.creature_died(prey.id, Some(player.id)).await?;
                self.world.bury(prey.id);
                kills += 1;
                debug!(
                    target: "harness::players",
                    player = %player.id,
                    creature = %prey.id,
                    kind = %prey.variant.kind.display_name(),
                    "creature slain"
                );
            }
        }
        Ok(kills)
    }

    /// Announces creatures spawned by the arena or by summoners.
    pub async fn register_pending(&self) -> runtime::Result<()> {
        for spawn in self.world.take_pending() {
            match self
                .handle
                .creature_spawned(spawn.creature, spawn.variant, spawn.level, spawn.at)
                .await
            {
                Ok(()) => {}
                Err(RuntimeError::UnrecognisedVariant(variant)) => {
                    warn!(
                        target: "harness::players",
                        creature = %spawn.creature,
                        %variant,
                        "spawned creature has no behaviour"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
