/// Engine-wide cadence and tuning parameters.
///
/// Per-variant tuning lives in [`crate::descriptor::BehaviorDescriptor`]; this
/// struct only carries the knobs that apply to every instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Logical ticks between two behaviour passes.
    pub behavior_interval: u64,
    /// Logical ticks between two registry sweeps.
    pub sweep_interval: u64,
    /// Number of buckets a behaviour pass is split across. With `n > 1` each
    /// pass still validates every instance but only ticks one bucket.
    pub tick_spread: u32,
    /// Candidate positions tried when looking for ground to spawn on.
    pub spawn_attempts: u8,
    /// Vertical distance searched below a candidate position for ground.
    pub ground_search_depth: f64,
    /// Seed for the engine RNG. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl EngineConfig {
    // ===== compile-time constants =====
    pub const TICKS_PER_SECOND: u64 = 20;
    /// Upper bound on phase thresholds per descriptor.
    pub const MAX_PHASES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BEHAVIOR_INTERVAL: u64 = 5;
    pub const DEFAULT_SWEEP_INTERVAL: u64 = 600;
    pub const DEFAULT_TICK_SPREAD: u32 = 1;
    pub const DEFAULT_SPAWN_ATTEMPTS: u8 = 5;
    pub const DEFAULT_GROUND_SEARCH_DEPTH: f64 = 8.0;

    pub fn new() -> Self {
        Self {
            behavior_interval: Self::DEFAULT_BEHAVIOR_INTERVAL,
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
            tick_spread: Self::DEFAULT_TICK_SPREAD,
            spawn_attempts: Self::DEFAULT_SPAWN_ATTEMPTS,
            ground_search_depth: Self::DEFAULT_GROUND_SEARCH_DEPTH,
            rng_seed: None,
        }
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_tick_spread(mut self, spread: u32) -> Self {
        self.tick_spread = spread;
        self
    }

    /// Converts seconds to logical ticks.
    pub const fn seconds(secs: u64) -> u64 {
        secs * Self::TICKS_PER_SECOND
    }

    /// Spread clamped to at least one bucket.
    pub fn effective_spread(&self) -> u64 {
        u64::from(self.tick_spread.max(1))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
