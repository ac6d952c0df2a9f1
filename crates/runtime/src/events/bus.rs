//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use behavior_core::{BehaviorEvent, Tick};

use super::types::BehaviorRecord;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Registration, removal and contained faults
    Lifecycle,
    /// Boss phases, participants and vulnerability windows
    Encounter,
    /// Everything else a creature does
    Combat,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Lifecycle, Topic::Encounter, Topic::Combat];
}

/// Event wrapper that carries the topic and the stamped behaviour event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Lifecycle(BehaviorRecord),
    Encounter(BehaviorRecord),
    Combat(BehaviorRecord),
}

impl Event {
    /// Routes a behaviour event to its topic.
    pub fn from_behavior(tick: Tick, event: BehaviorEvent) -> Self {
        let lifecycle = event.is_lifecycle();
        let encounter = event.is_encounter();
        let record = BehaviorRecord::new(tick, event);
        if lifecycle {
            Event::Lifecycle(record)
        } else if encounter {
            Event::Encounter(record)
        } else {
            Event::Combat(record)
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Event::Lifecycle(_) => Topic::Lifecycle,
            Event::Encounter(_) => Topic::Encounter,
            Event::Combat(_) => Topic::Combat,
        }
    }

    pub fn record(&self) -> &BehaviorRecord {
        match self {
            Event::Lifecycle(record) | Event::Encounter(record) | Event::Combat(record) => record,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(RwLock::new(channels)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Events are best-effort: skip when the lock is contended
        match self.channels.try_read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
                }
            }
            Err(_) => {
                tracing::debug!(target: "runtime::events", ?topic, "event bus lock contended, event dropped");
            }
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.try_read() {
            Ok(channels) => match channels.get(&topic) {
                Some(tx) => tx.subscribe(),
                None => Self::detached(),
            },
            Err(_) => {
                tracing::warn!(target: "runtime::events", ?topic, "event bus lock contended, subscription detached");
                Self::detached()
            }
        }
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Receiver whose sender is already gone; `recv` reports `Closed`.
    fn detached() -> broadcast::Receiver<Event> {
        broadcast::channel(1).1
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use behavior_core::{CreatureId, RemovalReason};

    use super::*;

    #[test]
    fn routes_by_event_kind() {
        let removed = BehaviorEvent::Removed {
            creature: CreatureId(1),
            reason: RemovalReason::Swept,
        };
        let enraged = BehaviorEvent::Enraged {
            creature: CreatureId(1),
        };
        let closed = BehaviorEvent::VulnerabilityClosed {
            creature: CreatureId(1),
        };

        assert_eq!(Event::from_behavior(Tick(1), removed).topic(), Topic::Lifecycle);
        assert_eq!(Event::from_behavior(Tick(1), enraged).topic(), Topic::Combat);
        assert_eq!(Event::from_behavior(Tick(1), closed).topic(), Topic::Encounter);
    }

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(Event::from_behavior(
            Tick(3),
            BehaviorEvent::Enraged {
                creature: CreatureId(2),
            },
        ));

        let received = combat.recv().await.unwrap();
        assert_eq!(received.record().tick, Tick(3));
        assert!(lifecycle.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::from_behavior(
            Tick(0),
            BehaviorEvent::RitualCompleted {
                creature: CreatureId(9),
            },
        ));
    }
}
