//! Built-in level used when the generator is unreachable
//!
//! Deterministic for a given seed so a run can be reproduced from logs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{LevelData, ObstacleKind, ObstacleSpec};

/// Number of obstacles in the backup level
pub const FALLBACK_OBSTACLES: u32 = 20;
/// First obstacle enters after this delay (ms)
pub const FALLBACK_FIRST_ENTRY_MS: f64 = 2000.0;
/// Gap between consecutive obstacles (ms)
pub const FALLBACK_SPACING_MS: f64 = 1500.0;

/// Alternating shark/mine pattern at random heights
pub fn fallback_level(seed: u64) -> LevelData {
    let mut rng = Pcg32::seed_from_u64(seed);

    let obstacles = (0..FALLBACK_OBSTACLES)
        .map(|i| ObstacleSpec {
            id: i,
            kind: if i % 2 == 0 {
                ObstacleKind::Shark
            } else {
                ObstacleKind::Mine
            },
            y_percent: rng.random_range(20.0..80.0),
            speed_multi: rng.random_range(1.0..2.0),
            entry_time_ms: FALLBACK_FIRST_ENTRY_MS + i as f64 * FALLBACK_SPACING_MS,
        })
        .collect();

    LevelData {
        name: "Emergency Backup Trench".to_string(),
        description: "Communication with AI lost. Manual navigation engaged.".to_string(),
        difficulty: "normal".to_string(),
        obstacles,
    }
}
