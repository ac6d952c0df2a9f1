//! Headless arena for the creature behaviour engine.
//!
//! Loads engine content, populates a flat arena with creatures and simulated
//! players, and lets the runtime drive every creature for a fixed duration
//! while reporting registry and encounter status.
//!
//! # Examples
//!
//! ```bash
//! HARNESS_SEED=7 HARNESS_DURATION_SECS=10 RUST_LOG=behavior=debug \
//!     cargo run -p behavior-harness
//! ```
mod arena;
mod config;
mod logging;
mod players;

use anyhow::{Context, Result};
use behavior_content::ContentFactory;
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{Event, Runtime, RuntimeConfig, RuntimeHandle, Topic};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::arena::ArenaWorld;
use crate::config::HarnessConfig;
use crate::players::PlayerSim;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = HarnessConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    info!("Starting behaviour harness");
    info!("Content: {}", config.data_dir.display());

    let factory = ContentFactory::new(&config.data_dir);
    let mut engine = factory.load_config().context("loading engine config")?;
    if let Some(seed) = config.seed {
        engine.rng_seed = Some(seed);
    }
    let descriptors = factory
        .load_descriptors()
        .context("loading behaviour descriptors")?;
    info!(descriptors = descriptors.len(), ?engine, "content loaded");

    let world = ArenaWorld::new();
    let mut rng = match engine.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    world.populate(&mut rng, config.creatures, config.players);

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            engine,
            tick_duration: config.tick,
            ..RuntimeConfig::default()
        })
        .descriptors(descriptors)
        .world(world.clone())
        .build()
        .await?;
    let handle = runtime.handle();

    let (stop_tx, stop_rx) = watch::channel(false);
    let sim = PlayerSim::new(world.clone(), handle.clone(), config.seed, config.tick * 4);
    sim.register_pending().await?;
    let sim_task = tokio::spawn(sim.run(stop_rx.clone()));
    let watch_task = tokio::spawn(watch_encounters(
        runtime.subscribe(Topic::Encounter),
        stop_rx,
    ));

    let deadline = tokio::time::sleep(config.run_for);
    tokio::pin!(deadline);
    let mut report = tokio::time::interval(config.report_every);
    report.tick().await;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = report.tick() => report_status(&handle, &world).await?,
        }
    }

    let _ = stop_tx.send(true);
    let kills = sim_task.await??;
    watch_task.await?;

    report_status(&handle, &world).await?;
    info!(kills, player_deaths = world.player_deaths(), "arena closed");

    runtime.shutdown().await?;
    Ok(())
}

async fn report_status(handle: &RuntimeHandle, world: &ArenaWorld) -> Result<()> {
    let tick = handle.current_tick().await?;
    let encounters = handle.encounters().await?;
    let timing = handle.tick_metrics();
    let counters = handle.metrics();

    info!(
        %tick,
        creatures = world.creature_count(),
        faults = counters.faults,
        passes = counters.passes,
        deferred_resolved = counters.deferred_resolved,
        deferred_dropped = counters.deferred_dropped,
        "{}",
        handle.stats()
    );
    info!(
        ticks = timing.ticks,
        overruns = timing.overruns,
        avg_us = timing.avg_tick_time.as_micros() as u64,
        peak_us = timing.peak_tick_time.as_micros() as u64,
        "tick timing"
    );
    if !encounters.is_empty() {
        info!("encounters: {}", serde_json::to_string(&encounters)?);
    }
    Ok(())
}

/// Logs boss phase changes and vulnerability windows as they happen.
async fn watch_encounters(mut events: broadcast::Receiver<Event>, mut stop: watch::Receiver<bool>) {
    use behavior_core::BehaviorEvent;

    loop {
        let event = tokio::select! {
            received = events.recv() => received,
            _ = stop.changed() => break,
        };
        match event {
            Ok(event) => match &event.record().event {
                BehaviorEvent::PhaseChanged { creature, transition } => {
                    info!(tick = %event.record().tick, boss = %creature, ?transition, "phase change");
                }
                BehaviorEvent::VulnerabilityOpened { creature, until } => {
                    info!(boss = %creature, %until, "boss vulnerable");
                }
                _ => {}
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "encounter watcher lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
