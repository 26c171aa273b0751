//! Normalized control signal
//!
//! Input callbacks only ever write the signal; the game tick reads it once
//! per frame. 0.0 is the top of the field, 1.0 the bottom.

use std::cell::Cell;
use std::rc::Rc;

/// Phone pitch (degrees) treated as "centered"
pub const TILT_REST_DEG: f64 = 45.0;
/// Pitch change (degrees) from rest that reaches either edge
pub const TILT_RANGE_DEG: f64 = 30.0;

/// Shared, single-threaded control value in [0, 1]
#[derive(Debug, Clone)]
pub struct InputSignal {
    value: Rc<Cell<f32>>,
}

impl Default for InputSignal {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InputSignal {
    pub fn new(initial: f32) -> Self {
        let signal = Self {
            value: Rc::new(Cell::new(0.5)),
        };
        signal.set(initial);
        signal
    }

    pub fn get(&self) -> f32 {
        self.value.get()
    }

    /// Store a new value; clamped into [0, 1], non-finite values are ignored
    pub fn set(&self, value: f32) {
        if value.is_finite() {
            self.value.set(value.clamp(0.0, 1.0));
        }
    }
}

/// Map a pointer's client y onto the element it is over
///
/// Returns `None` for a degenerate element height.
pub fn pointer_to_normalized(client_y: f64, rect_top: f64, rect_height: f64) -> Option<f32> {
    if !(rect_height.is_finite() && rect_height > 0.0) || !client_y.is_finite() {
        return None;
    }
    Some(((client_y - rect_top) / rect_height).clamp(0.0, 1.0) as f32)
}

/// Map device pitch (`DeviceOrientationEvent.beta`, degrees) to the signal
///
/// Tilting the top of the device away dives, towards surfaces.
pub fn tilt_to_normalized(beta_deg: f64) -> Option<f32> {
    if !beta_deg.is_finite() {
        return None;
    }
    let offset = (beta_deg - TILT_REST_DEG) / TILT_RANGE_DEG;
    Some((0.5 - offset * 0.5).clamp(0.0, 1.0) as f32)
}
