//! Runtime integration tests driving the worker with the in-memory world.

use std::time::Duration;

use behavior_core::mock::MockWorld;
use behavior_core::{
    BehaviorEvent, Category, CreatureId, EngineConfig, Location, PlayerId, RemovalReason,
    Variant, VariantKind,
};
use rand::rngs::mock::StepRng;
use runtime::{BehaviorRecord, Event, Runtime, RuntimeConfig, RuntimeError, Topic};
use tokio::sync::broadcast;

const ORIGIN: Location = Location::new(0.0, 64.0, 0.0);

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        engine: EngineConfig::new().with_rng_seed(11),
        tick_duration: Duration::from_millis(1),
        ..RuntimeConfig::default()
    }
}

async fn start(world: MockWorld) -> Runtime {
    Runtime::builder()
        .config(fast_config())
        .world(world)
        .rng(StepRng::new(0, 0))
        .build()
        .await
        .expect("runtime builds with a world")
}

/// Waits for the first event on `rx` matching `predicate`.
async fn next_matching(
    rx: &mut broadcast::Receiver<Event>,
    predicate: impl Fn(&BehaviorEvent) -> bool,
) -> BehaviorEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(event) if predicate(&event.record().event) => {
                    return event.record().event.clone();
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("event arrives in time")
}

#[tokio::test]
async fn spawn_and_force_stop_publish_lifecycle_events() {
    let mut world = MockWorld::new();
    let walker = world.add_creature(Variant::of(VariantKind::Walker), ORIGIN);
    let runtime = start(world).await;
    let handle = runtime.handle();
    let mut lifecycle = runtime.subscribe(Topic::Lifecycle);

    handle
        .creature_spawned(walker, Variant::of(VariantKind::Walker), 3, ORIGIN)
        .await
        .unwrap();

    let registered = next_matching(&mut lifecycle, |e| {
        matches!(e, BehaviorEvent::Registered { .. })
    })
    .await;
    assert_eq!(registered.creature(), walker);
    assert_eq!(handle.stats().active, 1);

    assert!(handle.force_stop(walker).await.unwrap());
    let removed = next_matching(&mut lifecycle, |e| {
        matches!(e, BehaviorEvent::Removed { .. })
    })
    .await;
    assert_eq!(
        removed,
        BehaviorEvent::Removed {
            creature: walker,
            reason: RemovalReason::ForceStopped
        }
    );
    assert_eq!(handle.stats().active, 0);
    assert!(!handle.force_stop(walker).await.unwrap());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn published_records_survive_json() {
    let mut world = MockWorld::new();
    let walker = world.add_creature(Variant::of(VariantKind::Walker), ORIGIN);
    let runtime = start(world).await;
    let handle = runtime.handle();
    let mut lifecycle = runtime.subscribe(Topic::Lifecycle);

    handle
        .creature_spawned(walker, Variant::of(VariantKind::Walker), 4, ORIGIN)
        .await
        .unwrap();

    let record = tokio::time::timeout(Duration::from_secs(2), lifecycle.recv())
        .await
        .expect("event arrives in time")
        .expect("bus open")
        .record()
        .clone();
    assert_eq!(
        record.event,
        BehaviorEvent::Registered {
            creature: walker,
            variant: Variant::of(VariantKind::Walker),
            level: 4,
        }
    );

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("Registered"));
    let decoded: BehaviorRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, record);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn death_notification_removes_instance() {
    let mut world = MockWorld::new();
    let walker = world.add_creature(Variant::of(VariantKind::Walker), ORIGIN);
    let runtime = start(world).await;
    let handle = runtime.handle();
    let mut lifecycle = runtime.subscribe(Topic::Lifecycle);

    handle
        .creature_spawned(walker, Variant::of(VariantKind::Walker), 1, ORIGIN)
        .await
        .unwrap();
    handle.creature_died(walker, None).await.unwrap();

    let removed = next_matching(&mut lifecycle, |e| {
        matches!(e, BehaviorEvent::Removed { .. })
    })
    .await;
    assert_eq!(
        removed,
        BehaviorEvent::Removed {
            creature: walker,
            reason: RemovalReason::Died
        }
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn boss_encounter_tracks_nearby_players() {
    let mut world = MockWorld::new();
    let boss = world.add_creature(Variant::of(VariantKind::Gravedigger), ORIGIN);
    let player = world.add_player(Location::new(30.0, 64.0, 0.0));
    let runtime = start(world).await;
    let handle = runtime.handle();
    let mut encounter = runtime.subscribe(Topic::Encounter);

    handle
        .creature_spawned(boss, Variant::of(VariantKind::Gravedigger), 10, ORIGIN)
        .await
        .unwrap();

    let joined = next_matching(&mut encounter, |e| {
        matches!(e, BehaviorEvent::EncounterJoined { .. })
    })
    .await;
    assert_eq!(joined, BehaviorEvent::EncounterJoined { boss, player });

    let encounters = handle.encounters().await.unwrap();
    assert_eq!(encounters.len(), 1);
    assert_eq!(encounters[0].boss, boss);
    assert_eq!(encounters[0].participants, vec![player]);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unrecognised_variant_is_rejected_and_worker_survives() {
    let runtime = start(MockWorld::new()).await;
    let handle = runtime.handle();

    let err = handle
        .creature_spawned(
            CreatureId(42),
            Variant::new(Category::Basic, VariantKind::Butcher),
            1,
            ORIGIN,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnrecognisedVariant(_)));

    handle
        .creature_spawned(CreatureId(43), Variant::of(VariantKind::Walker), 1, ORIGIN)
        .await
        .unwrap();
    // Notifications for unregistered creatures are ignored.
    handle.attack_landed(CreatureId(999), PlayerId(1)).await.unwrap();
    assert_eq!(handle.stats().created, 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn clock_advances_and_metrics_accumulate() {
    let runtime = start(MockWorld::new()).await;
    let handle = runtime.handle();

    let first = handle.current_tick().await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let later = handle.current_tick().await.unwrap();

    assert!(later > first);
    let metrics = handle.tick_metrics();
    assert!(metrics.ticks > 0);
    assert!(metrics.commands >= 2);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn handles_fail_after_shutdown() {
    let runtime = start(MockWorld::new()).await;
    let handle = runtime.handle();

    runtime.shutdown().await.unwrap();

    let err = handle.current_tick().await.unwrap_err();
    assert!(matches!(err, RuntimeError::CommandChannelClosed));
}

#[tokio::test]
async fn building_without_world_fails() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingWorld)));
}
