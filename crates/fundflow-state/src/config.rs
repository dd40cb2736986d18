use std::time::Duration;

use fundflow_core::constants::GACHA_PULL_DELAY_MS;
use serde::{Deserialize, Serialize};

/// Runtime knobs for a `LifecycleEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Presentation delay between spending a gacha token and the reveal.
    pub gacha_delay: Duration,
    /// Seed for the gacha RNG. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gacha_delay: Duration::from_millis(GACHA_PULL_DELAY_MS),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// No delay and a fixed seed; outcomes are reproducible.
    pub fn deterministic(seed: u64) -> Self {
        Self {
            gacha_delay: Duration::ZERO,
            rng_seed: Some(seed),
        }
    }
}
