//! Per-frame simulation tick
//!
//! One call advances the run by one rendered frame. Movement is expressed in
//! pixels per tick, so physics speed follows the display refresh rate: there
//! is no fixed-timestep accumulator and missed frames are not replayed. Spawn
//! timing and the win floor use elapsed wall-clock time, so the schedule
//! itself stays correct under jitter.

use super::collision::first_collision;
use super::state::{GameEvent, LevelData, SimState};
use crate::tuning::Tuning;

/// Result of advancing one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run in progress; nothing was advanced
    Idle,
    /// Run continues
    Running,
    /// Player touched an obstacle; state was left as of the collision
    Collided { obstacle_id: u32 },
    /// Level cleared after the minimum session length
    Victory,
}

impl TickOutcome {
    /// The run ended this tick
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Collided { .. } | TickOutcome::Victory)
    }
}

/// Advance the run by one frame.
///
/// `input` is the normalized control value (0 = top, 1 = bottom) and
/// `now_ms` a monotonic clock reading on the same clock the run started on.
pub fn tick(
    state: &mut SimState,
    level: &LevelData,
    input: f32,
    now_ms: f64,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> TickOutcome {
    // 1. Player eases toward the input target
    state.player.steer(input, tuning);

    // 2. Promote obstacles that came due
    let elapsed = state.elapsed_ms(now_ms);
    for id in state
        .spawner
        .promote(&level.obstacles, elapsed, tuning, &mut state.obstacles)
    {
        events.push(GameEvent::ObstacleSpawned { id });
    }

    // 3. Scroll obstacles left; jellyfish bob on wall-clock time
    let scroll = tuning.base_scroll_speed * tuning.global_speed;
    let bob = ((now_ms / tuning.jelly_bob_period_ms).sin() as f32) * tuning.jelly_bob_amplitude;
    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= scroll * obstacle.spec.speed_multi;
        if obstacle.kind().bobs() {
            obstacle.pos.y += bob;
        }
    }

    // 4. Collisions before retirement: a lethal overlap wins over an exit
    if let Some(hit) = first_collision(&state.player, &state.obstacles, tuning) {
        log::info!(
            "Collision with {} {} at t={:.0}ms",
            hit.kind().as_str(),
            hit.id(),
            elapsed
        );
        return TickOutcome::Collided {
            obstacle_id: hit.id(),
        };
    }

    // 5. Retire obstacles that left the field
    let despawn_x = tuning.despawn_x;
    let mut cleared = Vec::new();
    state.obstacles.retain(|obstacle| {
        let gone = obstacle.pos.x < despawn_x;
        if gone {
            cleared.push(obstacle.id());
        }
        !gone
    });
    for id in cleared {
        state.score += tuning.clear_award;
        log::debug!("Cleared obstacle {} (score {})", id, state.score);
        events.push(GameEvent::ObstacleCleared { id });
        events.push(GameEvent::ScoreChanged(state.score));
    }

    // 6. Level clear, but never before the minimum session length
    if state.spawner.is_exhausted() && state.obstacles.is_empty() && elapsed > tuning.win_floor_ms
    {
        log::info!("Level clear at t={:.0}ms, score {}", elapsed, state.score);
        return TickOutcome::Victory;
    }

    TickOutcome::Running
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ObstacleKind, ObstacleSpec, Player};
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn level(obstacles: Vec<ObstacleSpec>) -> LevelData {
        LevelData {
            name: "Test Trench".into(),
            description: String::new(),
            difficulty: "normal".into(),
            obstacles,
        }
    }

    fn spec(id: u32, kind: ObstacleKind, y_percent: f32, entry_time_ms: f64) -> ObstacleSpec {
        ObstacleSpec {
            id,
            kind,
            y_percent,
            speed_multi: 1.0,
            entry_time_ms,
        }
    }

    /// Run frames at 60 Hz until a terminal outcome or `max_frames`
    fn run(
        state: &mut SimState,
        level: &LevelData,
        input: f32,
        tuning: &Tuning,
        max_frames: u32,
    ) -> (TickOutcome, u32, Vec<GameEvent>) {
        let mut events = Vec::new();
        for frame in 1..=max_frames {
            let now = frame as f64 * FRAME_MS;
            let outcome = tick(state, level, input, now, tuning, &mut events);
            if outcome.is_terminal() {
                return (outcome, frame, events);
            }
        }
        (TickOutcome::Running, max_frames, events)
    }

    #[test]
    fn test_centered_mine_collides_before_floor() {
        let tuning = Tuning::default();
        let level = level(vec![spec(1, ObstacleKind::Mine, 50.0, 0.0)]);
        let mut state = SimState::new(&level, &tuning, 0.0);

        let (outcome, frame, _) = run(&mut state, &level, 0.5, &tuning, 400);
        assert_eq!(outcome, TickOutcome::Collided { obstacle_id: 1 });
        // Mine travels from x=1330 to the submarine's nose at 8px/tick
        assert!(frame < 160, "collided at frame {}", frame);
        assert!(frame as f64 * FRAME_MS < tuning.win_floor_ms);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_empty_level_waits_for_floor() {
        let tuning = Tuning::default();
        let level = level(Vec::new());
        let mut state = SimState::new(&level, &tuning, 1000.0);
        let mut events = Vec::new();

        for now in [1000.0, 2000.0, 5999.0, 6000.0] {
            assert_eq!(
                tick(&mut state, &level, 0.5, now, &tuning, &mut events),
                TickOutcome::Running
            );
        }
        assert_eq!(
            tick(&mut state, &level, 0.5, 6000.5, &tuning, &mut events),
            TickOutcome::Victory
        );
    }

    #[test]
    fn test_dodged_obstacles_score_and_win() {
        let tuning = Tuning::default();
        // Obstacles along the top; the player hugs the bottom
        let level = level(vec![
            spec(1, ObstacleKind::Shark, 0.0, 0.0),
            spec(2, ObstacleKind::Puffer, 5.0, 500.0),
            spec(3, ObstacleKind::Mine, 10.0, 1000.0),
        ]);
        let mut state = SimState::new(&level, &tuning, 0.0);

        let (outcome, _, events) = run(&mut state, &level, 1.0, &tuning, 2000);
        assert_eq!(outcome, TickOutcome::Victory);
        assert_eq!(state.score, 3 * tuning.clear_award);

        let scores: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ScoreChanged(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(scores, vec![100, 200, 300]);
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ObstacleSpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
    }

    #[test]
    fn test_collision_beats_retirement() {
        // A submarine wide enough to reach past the despawn line
        let tuning = Tuning {
            player_x: -400.0,
            player_width: 600.0,
            ..Default::default()
        };
        let level = level(vec![spec(1, ObstacleKind::Mine, 50.0, 0.0)]);
        let mut state = SimState::new(&level, &tuning, 0.0);
        let mut events = Vec::new();

        tick(&mut state, &level, 0.5, 0.0, &tuning, &mut events);
        // Next tick moves the mine from -152 to -160: past the despawn line
        // and level with the player
        state.obstacles[0].pos.x = -152.0;
        state.player = Player { y: 310.0 };
        let input = 310.0 / tuning.player_max_y();

        let outcome = tick(&mut state, &level, input, 16.0, &tuning, &mut events);
        assert_eq!(outcome, TickOutcome::Collided { obstacle_id: 1 });
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_speed_multiplier_and_global_speed() {
        let tuning = Tuning {
            global_speed: 1.5,
            ..Default::default()
        };
        let mut fast = spec(1, ObstacleKind::Shark, 0.0, 0.0);
        fast.speed_multi = 2.0;
        let level = level(vec![fast]);
        let mut state = SimState::new(&level, &tuning, 0.0);
        let mut events = Vec::new();

        tick(&mut state, &level, 1.0, 0.0, &tuning, &mut events);
        assert_eq!(state.obstacles[0].pos.x, tuning.spawn_x() - 8.0 * 2.0 * 1.5);
    }

    #[test]
    fn test_jellyfish_bob_follows_clock() {
        let tuning = Tuning::default();
        let level = level(vec![
            spec(1, ObstacleKind::Jellyfish, 0.0, 0.0),
            spec(2, ObstacleKind::Puffer, 0.0, 0.0),
        ]);
        let mut state = SimState::new(&level, &tuning, 0.0);
        let mut events = Vec::new();

        // sin(785.4 / 500) ~= 1.0
        let now = 500.0 * std::f64::consts::FRAC_PI_2;
        tick(&mut state, &level, 1.0, now, &tuning, &mut events);
        assert!((state.obstacles[0].pos.y - 1.0).abs() < 1e-4);
        assert_eq!(state.obstacles[1].pos.y, 0.0);
    }

    #[test]
    fn test_obstacles_enter_on_schedule() {
        let tuning = Tuning::default();
        let level = level(vec![spec(1, ObstacleKind::Shark, 0.0, 1000.0)]);
        let mut state = SimState::new(&level, &tuning, 200.0);
        let mut events = Vec::new();

        tick(&mut state, &level, 1.0, 1199.0, &tuning, &mut events);
        assert!(state.obstacles.is_empty());
        tick(&mut state, &level, 1.0, 1200.0, &tuning, &mut events);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(events, vec![GameEvent::ObstacleSpawned { id: 1 }]);
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            inputs in prop::collection::vec(
                prop_oneof![
                    -5.0f32..6.0,
                    Just(f32::NAN),
                    Just(f32::INFINITY),
                    Just(f32::NEG_INFINITY),
                ],
                1..200,
            ),
        ) {
            let tuning = Tuning::default();
            let level = level(Vec::new());
            let mut state = SimState::new(&level, &tuning, 0.0);
            let mut events = Vec::new();

            for (i, input) in inputs.into_iter().enumerate() {
                tick(&mut state, &level, input, i as f64 * FRAME_MS, &tuning, &mut events);
                prop_assert!(state.player.y >= 0.0);
                prop_assert!(state.player.y <= tuning.player_max_y());
            }
        }

        #[test]
        fn prop_score_is_award_times_cleared(
            count in 0usize..12,
            gap in 50.0f64..600.0,
        ) {
            let tuning = Tuning::default();
            // Top lane only, the player sits at the bottom
            let obstacles = (0..count)
                .map(|i| spec(i as u32, ObstacleKind::Puffer, 0.0, i as f64 * gap))
                .collect();
            let level = level(obstacles);
            let mut state = SimState::new(&level, &tuning, 0.0);

            let (outcome, _, events) = run(&mut state, &level, 1.0, &tuning, 5000);
            prop_assert_eq!(outcome, TickOutcome::Victory);
            let cleared = events
                .iter()
                .filter(|e| matches!(e, GameEvent::ObstacleCleared { .. }))
                .count() as u64;
            prop_assert_eq!(cleared, count as u64);
            prop_assert_eq!(state.score, cleared * tuning.clear_award);
        }
    }
}
