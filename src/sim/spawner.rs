//! Obstacle spawner
//!
//! Walks a level's schedule against cumulative elapsed time. Comparing
//! against elapsed time rather than frame deltas means a long frame promotes
//! every obstacle that came due during it instead of skipping any.

use glam::Vec2;

use super::state::{ActiveObstacle, ObstacleSpec};
use crate::tuning::Tuning;

/// Schedule cursor over a level's obstacles
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    /// Indices into the level's obstacle list, stably sorted by entry time
    order: Vec<usize>,
    /// Position in `order` of the next obstacle to promote
    next: usize,
}

impl Spawner {
    pub fn new(specs: &[ObstacleSpec]) -> Self {
        let mut order: Vec<usize> = (0..specs.len()).collect();
        order.sort_by(|&a, &b| specs[a].entry_time_ms.total_cmp(&specs[b].entry_time_ms));
        Self { order, next: 0 }
    }

    /// Spawn index (number of schedule entries already consumed)
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every scheduled obstacle has been consumed
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.order.len()
    }

    /// Entry time of the next pending obstacle
    pub fn next_entry_ms(&self, specs: &[ObstacleSpec]) -> Option<f64> {
        self.order
            .get(self.next)
            .and_then(|&i| specs.get(i))
            .map(|s| s.entry_time_ms)
    }

    /// Promote every obstacle due at `elapsed_ms` into `active`.
    ///
    /// Returns the ids of the obstacles spawned. Malformed entries are
    /// consumed without spawning.
    pub fn promote(
        &mut self,
        specs: &[ObstacleSpec],
        elapsed_ms: f64,
        tuning: &Tuning,
        active: &mut Vec<ActiveObstacle>,
    ) -> Vec<u32> {
        let mut spawned = Vec::new();

        while let Some(&index) = self.order.get(self.next) {
            let Some(spec) = specs.get(index) else {
                // Schedule built for a different level; nothing sane to spawn
                log::warn!("Spawn index {} outside level of {}", index, specs.len());
                self.next = self.order.len();
                break;
            };

            // NaN entry times sort last and never compare as due; consume them
            // here so the level can still finish.
            if spec.entry_time_ms.is_finite() && spec.entry_time_ms > elapsed_ms {
                break;
            }
            self.next += 1;

            if !spec.is_well_formed() {
                log::warn!("Skipping malformed obstacle {} ({:?})", spec.id, spec);
                continue;
            }

            let y = spec.y_percent / 100.0 * tuning.playable_height();
            active.push(ActiveObstacle {
                spec: spec.clone(),
                pos: Vec2::new(tuning.spawn_x(), y),
            });
            log::debug!(
                "Spawned {} {} at y={:.0} (t={:.0}ms)",
                spec.kind.as_str(),
                spec.id,
                y,
                elapsed_ms
            );
            spawned.push(spec.id);
        }

        debug_assert!(self.next <= self.order.len());
        spawned
    }
}
