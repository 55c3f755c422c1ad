//! Persistent interaction state accumulated from gestures.

use serde::{Deserialize, Serialize};

/// Lower clamp bound for the accumulated field scale
pub const SCALE_MIN: f64 = 0.1;
/// Upper clamp bound for the accumulated field scale
pub const SCALE_MAX: f64 = 5.0;

/// Scale and two-axis rotation accumulated across a session.
///
/// Mutated incrementally by the gesture accumulator, never replaced
/// wholesale. `rotation_x` is pitch (radians, driven by vertical anchor
/// movement), `rotation_y` is yaw (driven by horizontal movement).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionState {
    pub scale: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
}

impl InteractionState {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Multiply the scale by `factor`, keeping it inside the clamp bounds
    pub fn apply_scale_factor(&mut self, factor: f64) {
        self.scale = (self.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new()
    }
}

/// The smoothed copy of [`InteractionState`] consumed by rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresentedTransform {
    pub scale: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
}

impl PresentedTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }
}

impl Default for PresentedTransform {
    fn default() -> Self {
        Self::identity()
    }
}
