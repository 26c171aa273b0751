//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time
//! - The normalized control signal
//! - Cancellable frame loops (requestAnimationFrame on web)
//! - HTTP transport for the AI services (web only)

pub mod frame_loop;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod input;
pub mod time;

pub use frame_loop::{FrameLoop, FrameScheduler};
pub use input::{InputSignal, pointer_to_normalized, tilt_to_normalized};
pub use time::{Clock, ManualClock};
