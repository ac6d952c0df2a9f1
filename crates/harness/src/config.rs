//! Harness configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Arena size, pacing and content location.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Directory holding `engine.toml` and descriptor files.
    pub data_dir: PathBuf,
    pub creatures: usize,
    pub players: usize,
    pub run_for: Duration,
    pub tick: Duration,
    pub report_every: Duration,
    /// Overrides `rng_seed` from `engine.toml` and seeds the arena.
    pub seed: Option<u64>,
    /// Also write logs under this directory when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("crates/behavior/content/data"),
            creatures: 12,
            players: 3,
            run_for: Duration::from_secs(30),
            tick: Duration::from_millis(50),
            report_every: Duration::from_secs(5),
            seed: None,
            log_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HARNESS_DATA_DIR` - content directory
    /// - `HARNESS_CREATURES` - initial creature count (default: 12)
    /// - `HARNESS_PLAYERS` - simulated players (default: 3, at least 1)
    /// - `HARNESS_DURATION_SECS` - run length (default: 30)
    /// - `HARNESS_TICK_MS` - wall-clock tick length (default: 50)
    /// - `HARNESS_REPORT_SECS` - status report interval (default: 5)
    /// - `HARNESS_SEED` - deterministic seed
    /// - `HARNESS_LOG_DIR` - optional log file directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("HARNESS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(count) = read_env::<usize>("HARNESS_CREATURES") {
            config.creatures = count;
        }
        if let Some(count) = read_env::<usize>("HARNESS_PLAYERS") {
            config.players = count.max(1);
        }
        if let Some(secs) = read_env::<u64>("HARNESS_DURATION_SECS") {
            config.run_for = Duration::from_secs(secs);
        }
        if let Some(ms) = read_env::<u64>("HARNESS_TICK_MS") {
            config.tick = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) = read_env::<u64>("HARNESS_REPORT_SECS") {
            config.report_every = Duration::from_secs(secs.max(1));
        }
        config.seed = read_env::<u64>("HARNESS_SEED");
        config.log_dir = env::var_os("HARNESS_LOG_DIR").map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
