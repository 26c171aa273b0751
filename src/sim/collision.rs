//! Player/obstacle collision detection
//!
//! Both hitboxes are shrunk by the tuning padding before the overlap test so
//! that grazing an obstacle's visual edge is forgiven.

use super::geometry::Aabb;
use super::state::{ActiveObstacle, Player};
use crate::tuning::Tuning;

/// Padded hitbox of the player
pub fn player_hitbox(player: &Player, tuning: &Tuning) -> Aabb {
    player.bounds(tuning).shrink(tuning.hitbox_padding)
}

/// Padded hitbox of an obstacle
pub fn obstacle_hitbox(obstacle: &ActiveObstacle, tuning: &Tuning) -> Aabb {
    obstacle.bounds().shrink(tuning.hitbox_padding)
}

/// Check whether the player touches an obstacle
pub fn player_hits_obstacle(player: &Player, obstacle: &ActiveObstacle, tuning: &Tuning) -> bool {
    player_hitbox(player, tuning).overlaps(&obstacle_hitbox(obstacle, tuning))
}

/// First obstacle (in active-set order) the player touches
pub fn first_collision<'a>(
    player: &Player,
    obstacles: &'a [ActiveObstacle],
    tuning: &Tuning,
) -> Option<&'a ActiveObstacle> {
    let hitbox = player_hitbox(player, tuning);
    obstacles
        .iter()
        .find(|obstacle| hitbox.overlaps(&obstacle_hitbox(obstacle, tuning)))
}
