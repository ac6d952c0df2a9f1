//! Topic-based event bus for behaviour events.
//!
//! The simulation worker drains the manager's events after every tick and
//! command and publishes them here, stamped with the logical tick. Consumers
//! subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::BehaviorRecord;
