//! Event payloads carried by the bus.

use behavior_core::{BehaviorEvent, Tick};
use serde::{Deserialize, Serialize};

/// A behaviour event stamped with the logical tick it was drained at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub tick: Tick,
    pub event: BehaviorEvent,
}

impl BehaviorRecord {
    pub fn new(tick: Tick, event: BehaviorEvent) -> Self {
        Self { tick, event }
    }
}
