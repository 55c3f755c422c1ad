//! Incremental accumulation of gesture deltas into interaction state.

use serde::{Deserialize, Serialize};

use holomorph_core::{Anchor, InteractionState};

use crate::classifier::{GestureSignal, PinchKind};

/// Default rotation sensitivity (radians per unit of anchor travel)
pub const ROTATION_SENSITIVITY: f64 = 4.0;
/// Default guard band for frame-to-frame scale ratios, exclusive bounds
pub const SCALE_GUARD: (f64, f64) = (0.8, 1.2);

/// Last frame's raw pinch measurements, the reference for this frame's deltas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchBaseline {
    pub kind: PinchKind,
    pub distance: f64,
    pub anchor: Anchor,
}

/// Integrates per-frame gesture signals into persistent scale and rotation.
///
/// The baseline goes null on every `none` signal, so the first frame after
/// hands reappear only seeds a new baseline and applies no delta. A pinch
/// of a different kind than the baseline re-seeds the same way, since the
/// two kinds measure different distances.
#[derive(Debug, Clone)]
pub struct GestureAccumulator {
    state: InteractionState,
    baseline: Option<PinchBaseline>,
    sensitivity: f64,
    scale_guard: (f64, f64),
}

impl GestureAccumulator {
    pub fn new(sensitivity: f64, scale_guard: (f64, f64)) -> Self {
        Self {
            state: InteractionState::new(),
            baseline: None,
            sensitivity,
            scale_guard,
        }
    }

    /// Fold one classified signal into the accumulated state
    pub fn apply(&mut self, signal: &GestureSignal) {
        let (kind, distance, anchor) = match signal.measurement() {
            Some(m) => m,
            None => {
                // Hands gone or not pinching. State holds its last value.
                self.baseline = None;
                return;
            }
        };

        match self.baseline {
            Some(baseline) if baseline.kind == kind => {
                let ratio = distance / baseline.distance;
                if ratio > self.scale_guard.0 && ratio < self.scale_guard.1 {
                    self.state.apply_scale_factor(ratio);
                } else {
                    tracing::debug!(
                        "scale ratio {:.3} outside guard band, ignored",
                        ratio
                    );
                }

                // Mirrored camera: anchor moving right swings the field left
                let dx = anchor.x - baseline.anchor.x;
                let dy = anchor.y - baseline.anchor.y;
                self.state.rotation_x += dy * self.sensitivity;
                self.state.rotation_y -= dx * self.sensitivity;
            }
            _ => {}
        }

        self.baseline = Some(PinchBaseline {
            kind,
            distance,
            anchor,
        });
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn baseline(&self) -> Option<PinchBaseline> {
        self.baseline
    }

    pub fn reset(&mut self) {
        self.state = InteractionState::new();
        self.baseline = None;
    }
}

impl Default for GestureAccumulator {
    fn default() -> Self {
        Self::new(ROTATION_SENSITIVITY, SCALE_GUARD)
    }
}
