//! Obstacle simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - Time comes in as monotonic millisecond readings
//! - Input comes in as a normalized value
//! - Presentation learns about changes through `GameEvent`s

pub mod collision;
pub mod geometry;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{first_collision, player_hitbox, player_hits_obstacle, obstacle_hitbox};
pub use geometry::Aabb;
pub use session::{Session, TransitionError};
pub use spawner::Spawner;
pub use state::{
    ActiveObstacle, Difficulty, GameEvent, GamePhase, LevelData, LevelError, ObstacleKind,
    ObstacleSpec, ParseDifficultyError, Player, SimState,
};
pub use tick::{TickOutcome, tick};
