//! Deep Dodge - submarine side-scroller with AI-generated levels
//!
//! Core modules:
//! - `sim`: Obstacle simulation (spawning, motion, collisions, session phases)
//! - `services`: Level provider, similarity judge and commentary contracts with fallbacks
//! - `face`: Face-presence signal and similarity analysis state
//! - `renderer`: WebGPU rendering of the play field
//! - `platform`: Clock, input signal, frame loops and browser transport
//! - `tuning`: Data-driven game balance

pub mod face;
pub mod platform;
pub mod renderer;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (pixels, top-left origin)
    pub const FIELD_WIDTH: f32 = 1280.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Submarine geometry - fixed horizontal position
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 80.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Horizontal scroll per tick at speed multiplier 1.0
    pub const BASE_SCROLL_SPEED: f32 = 8.0;
    /// Exponential smoothing factor for the submarine's vertical tracking
    pub const PLAYER_SMOOTHING: f32 = 0.1;

    /// Hitboxes shrink by this much on every side
    pub const HITBOX_PADDING: f32 = 5.0;

    /// Obstacles enter this far beyond the right edge
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Vertical space excluded from obstacle placement (UI/edge clearance)
    pub const SPAWN_VERTICAL_MARGIN: f32 = 100.0;
    /// Obstacles left of this x are retired
    pub const DESPAWN_X: f32 = -150.0;

    /// Score for each obstacle that leaves the field
    pub const CLEAR_AWARD: u64 = 100;
    /// Minimum session length before a cleared level counts as a win (ms)
    pub const WIN_FLOOR_MS: f64 = 5000.0;

    /// Jellyfish bob: y += sin(t / period) * amplitude
    pub const JELLY_BOB_PERIOD_MS: f64 = 500.0;
    pub const JELLY_BOB_AMPLITUDE: f32 = 1.0;
}
