//! Game state and core simulation types
//!
//! Levels are immutable descriptions; everything that moves during a run
//! lives in [`SimState`], which only the tick mutates.

use std::collections::HashSet;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Aabb;
use super::spawner::Spawner;
use crate::tuning::Tuning;

/// Obstacle categories the level provider may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Fast horizontal mover
    Shark,
    Puffer,
    /// Static-looking but deadly
    Mine,
    /// Bobs up and down while drifting
    Jellyfish,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Shark,
        ObstacleKind::Puffer,
        ObstacleKind::Mine,
        ObstacleKind::Jellyfish,
    ];

    /// Hitbox size in field pixels
    pub fn size(&self) -> Vec2 {
        match self {
            ObstacleKind::Shark => Vec2::new(100.0, 50.0),
            ObstacleKind::Puffer => Vec2::new(50.0, 50.0),
            ObstacleKind::Mine => Vec2::new(40.0, 40.0),
            ObstacleKind::Jellyfish => Vec2::new(40.0, 60.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Shark => "shark",
            ObstacleKind::Puffer => "puffer",
            ObstacleKind::Mine => "mine",
            ObstacleKind::Jellyfish => "jellyfish",
        }
    }

    /// Whether the kind oscillates vertically
    pub fn bobs(&self) -> bool {
        matches!(self, ObstacleKind::Jellyfish)
    }
}

/// Requested level difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }
}

/// Difficulty label that is not one of the known levels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty \"{0}\"")]
pub struct ParseDifficultyError(pub String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// A scheduled obstacle (part of a level, never mutated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Vertical placement, 0 (top) to 100 (bottom) of the playable height
    pub y_percent: f32,
    /// Multiplier on the base scroll speed
    pub speed_multi: f32,
    /// Offset from session start at which the obstacle enters (ms)
    pub entry_time_ms: f64,
}

impl ObstacleSpec {
    /// Finite, in-range values only
    pub fn is_well_formed(&self) -> bool {
        self.y_percent.is_finite()
            && (0.0..=100.0).contains(&self.y_percent)
            && self.speed_multi.is_finite()
            && self.speed_multi > 0.0
            && self.entry_time_ms.is_finite()
            && self.entry_time_ms >= 0.0
    }
}

/// A spawned obstacle moving across the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveObstacle {
    pub spec: ObstacleSpec,
    /// Top-left corner in field pixels
    pub pos: Vec2,
}

impl ActiveObstacle {
    #[inline]
    pub fn id(&self) -> u32 {
        self.spec.id
    }

    #[inline]
    pub fn kind(&self) -> ObstacleKind {
        self.spec.kind
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.spec.kind.size())
    }
}

/// The player's submarine (only its vertical position moves)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top edge in field pixels
    pub y: f32,
}

impl Player {
    /// Submarine centered on the field
    pub fn centered(tuning: &Tuning) -> Self {
        Self {
            y: tuning.player_rest_y(),
        }
    }

    pub fn bounds(&self, tuning: &Tuning) -> Aabb {
        Aabb::new(
            Vec2::new(tuning.player_x, self.y),
            Vec2::new(tuning.player_width, tuning.player_height),
        )
    }

    /// Ease toward the target derived from a normalized input.
    ///
    /// Inputs outside [0, 1] are clamped; a non-finite input leaves the
    /// submarine where it is.
    pub fn steer(&mut self, input: f32, tuning: &Tuning) {
        let max_y = tuning.player_max_y();
        if input.is_finite() {
            let target = input.clamp(0.0, 1.0) * max_y;
            self.y += (target - self.y) * tuning.smoothing;
        }
        self.y = self.y.clamp(0.0, max_y);
    }
}

/// Level consistency problems
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("obstacle id {0} appears more than once")]
    DuplicateId(u32),
    #[error("obstacle {0} has out-of-range values")]
    Malformed(u32),
}

/// A complete level as produced by a level provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub description: String,
    /// Free-text difficulty label reported by the provider
    pub difficulty: String,
    /// Storage order; not necessarily sorted by entry time
    pub obstacles: Vec<ObstacleSpec>,
}

impl LevelData {
    /// Latest entry time in the level (0 when empty)
    pub fn duration_ms(&self) -> f64 {
        self.obstacles
            .iter()
            .map(|o| o.entry_time_ms)
            .fold(0.0, f64::max)
    }

    /// Check ids are unique and every obstacle is well formed
    pub fn check_invariants(&self) -> Result<(), LevelError> {
        let mut seen = HashSet::with_capacity(self.obstacles.len());
        for obstacle in &self.obstacles {
            if !seen.insert(obstacle.id) {
                return Err(LevelError::DuplicateId(obstacle.id));
            }
            if !obstacle.is_well_formed() {
                return Err(LevelError::Malformed(obstacle.id));
            }
        }
        Ok(())
    }
}

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing requested yet
    Init,
    /// Waiting on the level provider
    LoadingLevel,
    /// Level loaded, waiting for the start trigger
    WaitingToStart,
    /// Simulation running
    Playing,
    /// Collided with an obstacle
    GameOver,
    /// Level cleared
    Victory,
}

impl GamePhase {
    /// Run has ended (win or lose)
    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Init => "init",
            GamePhase::LoadingLevel => "loading level",
            GamePhase::WaitingToStart => "waiting to start",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game over",
            GamePhase::Victory => "victory",
        }
    }
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    ScoreChanged(u64),
    ObstacleSpawned { id: u32 },
    ObstacleCleared { id: u32 },
}

/// Mutable per-run simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub player: Player,
    /// Active set, in spawn order
    pub obstacles: Vec<ActiveObstacle>,
    pub score: u64,
    /// Monotonic clock reading when the run started (ms)
    pub started_at_ms: f64,
    pub spawner: Spawner,
}

impl SimState {
    /// Fresh run state for `level`, starting at `now_ms`
    pub fn new(level: &LevelData, tuning: &Tuning, now_ms: f64) -> Self {
        Self {
            player: Player::centered(tuning),
            obstacles: Vec::new(),
            score: 0,
            started_at_ms: now_ms,
            spawner: Spawner::new(&level.obstacles),
        }
    }

    /// Time since the run started; never negative
    #[inline]
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_at_ms).max(0.0)
    }
}
