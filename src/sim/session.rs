//! Session lifecycle
//!
//! `Session` is the only owner of the phase. The tick reports outcomes; the
//! session decides what they mean:
//!
//! ```text
//! Init ──request_level──▶ LoadingLevel ──level_received──▶ WaitingToStart
//!                              ▲                                │ start
//!                              │ request_level                  ▼
//!                      GameOver / Victory ◀──tick outcome──── Playing
//! ```
//!
//! Run state is reset only on entry to `Playing`.

use thiserror::Error;

use super::state::{ActiveObstacle, GameEvent, GamePhase, LevelData, Player, SimState};
use super::tick::{TickOutcome, tick};
use crate::tuning::{Tuning, TuningError};

/// A lifecycle action that is not valid in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} while {}", .from.label())]
    Invalid {
        from: GamePhase,
        action: &'static str,
    },
}

/// One player's play session
#[derive(Debug)]
pub struct Session {
    phase: GamePhase,
    tuning: Tuning,
    level: Option<LevelData>,
    run: Option<SimState>,
    events: Vec<GameEvent>,
}

impl Session {
    /// Rejects tuning the simulation cannot run with
    pub fn new(tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self {
            phase: GamePhase::Init,
            tuning,
            level: None,
            run: None,
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Current level, once one has been received
    pub fn level(&self) -> Option<&LevelData> {
        self.level.as_ref()
    }

    /// Score of the current (or last) run
    pub fn score(&self) -> u64 {
        self.run.as_ref().map_or(0, |run| run.score)
    }

    /// Submarine position; centered before the first run
    pub fn player(&self) -> Player {
        self.run
            .as_ref()
            .map_or_else(|| Player::centered(&self.tuning), |run| run.player)
    }

    /// Active obstacle set
    pub fn obstacles(&self) -> &[ActiveObstacle] {
        self.run.as_ref().map_or(&[], |run| run.obstacles.as_slice())
    }

    /// Time into the current run
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        self.run.as_ref().map_or(0.0, |run| run.elapsed_ms(now_ms))
    }

    /// Spawn index of the current run
    pub fn spawn_index(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.spawner.next_index())
    }

    /// Take all queued notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// A level request was issued
    pub fn request_level(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::Init
            | GamePhase::WaitingToStart
            | GamePhase::GameOver
            | GamePhase::Victory => {
                self.set_phase(GamePhase::LoadingLevel);
                Ok(())
            }
            from => Err(TransitionError::Invalid {
                from,
                action: "request a level",
            }),
        }
    }

    /// The level provider answered
    pub fn level_received(&mut self, level: LevelData) -> Result<(), TransitionError> {
        if self.phase != GamePhase::LoadingLevel {
            return Err(TransitionError::Invalid {
                from: self.phase,
                action: "receive a level",
            });
        }
        log::info!(
            "Level '{}' ({}) loaded with {} obstacles",
            level.name,
            level.difficulty,
            level.obstacles.len()
        );
        self.level = Some(level);
        self.set_phase(GamePhase::WaitingToStart);
        Ok(())
    }

    /// Start trigger: reset the run and begin playing
    pub fn start(&mut self, now_ms: f64) -> Result<(), TransitionError> {
        let level = match (&self.phase, &self.level) {
            (GamePhase::WaitingToStart, Some(level)) => level,
            (&from, _) => {
                return Err(TransitionError::Invalid {
                    from,
                    action: "start",
                });
            }
        };
        self.run = Some(SimState::new(level, &self.tuning, now_ms));
        self.events.push(GameEvent::ScoreChanged(0));
        self.set_phase(GamePhase::Playing);
        Ok(())
    }

    /// Advance one frame. Does nothing outside `Playing`.
    pub fn tick(&mut self, input: f32, now_ms: f64) -> TickOutcome {
        if self.phase != GamePhase::Playing {
            return TickOutcome::Idle;
        }
        let (Some(run), Some(level)) = (self.run.as_mut(), self.level.as_ref()) else {
            return TickOutcome::Idle;
        };

        let outcome = tick(run, level, input, now_ms, &self.tuning, &mut self.events);
        match outcome {
            TickOutcome::Collided { .. } => self.set_phase(GamePhase::GameOver),
            TickOutcome::Victory => self.set_phase(GamePhase::Victory),
            TickOutcome::Running | TickOutcome::Idle => {}
        }
        outcome
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase: {} -> {}", self.phase.label(), phase.label());
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ObstacleKind, ObstacleSpec};

    fn level(obstacles: Vec<ObstacleSpec>) -> LevelData {
        LevelData {
            name: "Kelp Canyon".into(),
            description: "Narrow".into(),
            difficulty: "normal".into(),
            obstacles,
        }
    }

    fn mine(id: u32) -> ObstacleSpec {
        ObstacleSpec {
            id,
            kind: ObstacleKind::Mine,
            y_percent: 50.0,
            speed_multi: 1.0,
            entry_time_ms: 0.0,
        }
    }

    fn ready(level: LevelData) -> Session {
        let mut session = Session::new(Tuning::default()).unwrap();
        session.request_level().unwrap();
        session.level_received(level).unwrap();
        session
    }

    #[test]
    fn test_lifecycle_to_game_over() {
        let mut session = Session::new(Tuning::default()).unwrap();
        assert_eq!(session.phase(), GamePhase::Init);
        assert_eq!(session.tick(0.5, 0.0), TickOutcome::Idle);

        session.request_level().unwrap();
        assert_eq!(session.phase(), GamePhase::LoadingLevel);
        session.level_received(level(vec![mine(1)])).unwrap();
        assert_eq!(session.phase(), GamePhase::WaitingToStart);
        session.start(10_000.0).unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);

        let mut now = 10_000.0;
        let mut outcome = TickOutcome::Running;
        while !outcome.is_terminal() && now < 20_000.0 {
            now += 16.0;
            outcome = session.tick(0.5, now);
        }
        assert_eq!(outcome, TickOutcome::Collided { obstacle_id: 1 });
        assert_eq!(session.phase(), GamePhase::GameOver);

        // Finished sessions stop advancing
        let before = session.obstacles()[0].pos;
        assert_eq!(session.tick(0.5, now + 16.0), TickOutcome::Idle);
        assert_eq!(session.obstacles()[0].pos, before);

        let phases: Vec<GamePhase> = session
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                GamePhase::LoadingLevel,
                GamePhase::WaitingToStart,
                GamePhase::Playing,
                GamePhase::GameOver
            ]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_empty_level_victory_after_floor() {
        let mut session = ready(level(Vec::new()));
        session.start(0.0).unwrap();

        let mut now = 0.0;
        while now <= 5000.0 {
            assert_eq!(session.tick(0.5, now), TickOutcome::Running);
            now += 250.0;
        }
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.tick(0.5, 5000.1), TickOutcome::Victory);
        assert_eq!(session.phase(), GamePhase::Victory);
    }

    #[test]
    fn test_late_obstacle_delays_victory() {
        let mut session = ready(level(vec![ObstacleSpec {
            id: 7,
            kind: ObstacleKind::Shark,
            y_percent: 0.0,
            speed_multi: 1.0,
            entry_time_ms: 9000.0,
        }]));
        session.start(0.0).unwrap();

        let mut now = 0.0;
        let mut cleared_at = None;
        let mut outcome = TickOutcome::Running;
        while !outcome.is_terminal() && now < 30_000.0 {
            now += 16.0;
            // Hug the bottom, away from the shark's lane
            outcome = session.tick(1.0, now);
            if now <= 9000.0 {
                assert_eq!(outcome, TickOutcome::Running, "early finish at {now}ms");
            }
            if cleared_at.is_none()
                && session
                    .drain_events()
                    .contains(&GameEvent::ObstacleCleared { id: 7 })
            {
                cleared_at = Some(now);
            }
        }

        assert_eq!(outcome, TickOutcome::Victory);
        let cleared_at = cleared_at.expect("shark was never cleared");
        assert!(cleared_at > 9000.0);
        assert!(now >= cleared_at);
        assert_eq!(session.score(), session.tuning().clear_award);
        assert_eq!(session.phase(), GamePhase::Victory);
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let tuning = Tuning {
            player_height: 800.0,
            ..Tuning::default()
        };
        assert_eq!(
            Session::new(tuning).err(),
            Some(TuningError::PlayerTooTall {
                player: 800.0,
                field: 720.0
            })
        );

        let tuning = Tuning {
            smoothing: 0.0,
            ..Tuning::default()
        };
        assert!(Session::new(tuning).is_err());
    }

    #[test]
    fn test_invalid_transitions_leave_state() {
        let mut session = Session::new(Tuning::default()).unwrap();
        assert_eq!(
            session.start(0.0),
            Err(TransitionError::Invalid {
                from: GamePhase::Init,
                action: "start"
            })
        );
        assert!(session.level_received(level(Vec::new())).is_err());
        assert_eq!(session.phase(), GamePhase::Init);

        let mut session = ready(level(Vec::new()));
        session.start(0.0).unwrap();
        assert!(session.request_level().is_err());
        assert!(session.start(5.0).is_err());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_start_resets_run() {
        let mut session = ready(level(vec![mine(1)]));
        session.start(0.0).unwrap();
        for i in 1..=40 {
            session.tick(0.0, i as f64 * 16.0);
        }
        assert!(session.player().y < 340.0);
        assert_eq!(session.obstacles().len(), 1);
        assert_eq!(session.spawn_index(), 1);

        // New run: back through loading, then a clean slate on start
        session.set_phase(GamePhase::GameOver);
        session.request_level().unwrap();
        session.level_received(level(vec![mine(1)])).unwrap();
        session.drain_events();
        // Not reset until the run actually starts
        assert_eq!(session.spawn_index(), 1);

        session.start(50_000.0).unwrap();
        assert_eq!(session.player().y, 340.0);
        assert!(session.obstacles().is_empty());
        assert_eq!(session.spawn_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.elapsed_ms(50_100.0), 100.0);
        assert_eq!(
            session.drain_events(),
            vec![
                GameEvent::ScoreChanged(0),
                GameEvent::PhaseChanged(GamePhase::Playing)
            ]
        );
    }

    #[test]
    fn test_error_message() {
        let err = TransitionError::Invalid {
            from: GamePhase::Playing,
            action: "request a level",
        };
        assert_eq!(err.to_string(), "cannot request a level while playing");
    }
}
