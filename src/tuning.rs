//! Data-driven game balance
//!
//! Every constant the simulation reads lives here as a named field, so a
//! level designer can override feel (speed, smoothing, win floor) without
//! touching engine code. Defaults come from [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected tuning values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("player ({player}px) does not fit in a {field}px field")]
    PlayerTooTall { player: f32, field: f32 },
}

/// Simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,

    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Fraction of the remaining distance covered each tick (0 < k <= 1)
    pub smoothing: f32,

    pub base_scroll_speed: f32,
    /// Applied on top of every obstacle's own multiplier
    pub global_speed: f32,

    pub hitbox_padding: f32,
    pub spawn_margin: f32,
    pub spawn_vertical_margin: f32,
    pub despawn_x: f32,

    pub clear_award: u64,
    pub win_floor_ms: f64,

    pub jelly_bob_period_ms: f64,
    pub jelly_bob_amplitude: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            player_x: PLAYER_X,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            smoothing: PLAYER_SMOOTHING,
            base_scroll_speed: BASE_SCROLL_SPEED,
            global_speed: 1.0,
            hitbox_padding: HITBOX_PADDING,
            spawn_margin: SPAWN_MARGIN,
            spawn_vertical_margin: SPAWN_VERTICAL_MARGIN,
            despawn_x: DESPAWN_X,
            clear_award: CLEAR_AWARD,
            win_floor_ms: WIN_FLOOR_MS,
            jelly_bob_period_ms: JELLY_BOB_PERIOD_MS,
            jelly_bob_amplitude: JELLY_BOB_AMPLITUDE,
        }
    }
}

impl Tuning {
    /// Parse a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Highest valid top edge for the player
    #[inline]
    pub fn player_max_y(&self) -> f32 {
        self.field_height - self.player_height
    }

    /// Player top edge that centers the submarine on the field
    #[inline]
    pub fn player_rest_y(&self) -> f32 {
        self.player_max_y() / 2.0
    }

    /// Vertical extent obstacles are placed across
    #[inline]
    pub fn playable_height(&self) -> f32 {
        (self.field_height - self.spawn_vertical_margin).max(0.0)
    }

    /// x coordinate new obstacles enter at
    #[inline]
    pub fn spawn_x(&self) -> f32 {
        self.field_width + self.spawn_margin
    }

    /// Check that the simulation can run with these values
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width as f64),
            ("field_height", self.field_height as f64),
            ("player_width", self.player_width as f64),
            ("player_height", self.player_height as f64),
            ("base_scroll_speed", self.base_scroll_speed as f64),
            ("global_speed", self.global_speed as f64),
            ("jelly_bob_period_ms", self.jelly_bob_period_ms),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let ranged = [
            ("smoothing", self.smoothing as f64, f64::MIN_POSITIVE, 1.0),
            ("win_floor_ms", self.win_floor_ms, 0.0, f64::MAX),
            ("hitbox_padding", self.hitbox_padding as f64, 0.0, f64::MAX),
        ];
        for (field, value, min, max) in ranged {
            if !(value >= min && value <= max) {
                return Err(TuningError::OutOfRange {
                    field,
                    min,
                    max,
                    value,
                });
            }
        }

        if self.player_height >= self.field_height {
            return Err(TuningError::PlayerTooTall {
                player: self.player_height,
                field: self.field_height,
            });
        }

        Ok(())
    }
}
