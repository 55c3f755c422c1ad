//! Presentation-edge smoothing of accumulated interaction state.
//!
//! Accumulation is immediate; only the value handed to rendering lags,
//! so a completed gesture never loses its permanent effect to smoothing.

use holomorph_core::{InteractionState, PresentedTransform};

/// Default smoothing factor for presented values
pub const SMOOTHING_ALPHA: f64 = 0.15;

/// Exponential moving average (EMA) filter
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    alpha: f64,
    state: Option<f64>,
}

impl ExponentialFilter {
    /// Create new EMA filter
    ///
    /// # Arguments
    /// * `alpha` - Smoothing factor (0-1). Higher = less smoothing
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            state: None,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        match self.state {
            Some(prev) => {
                let y = self.alpha * x + (1.0 - self.alpha) * prev;
                self.state = Some(y);
                y
            }
            None => {
                self.state = Some(x);
                x
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// Smooths the full `(scale, rotation)` triple for the render side.
///
/// One filter per channel, ticked together so the presented transform is
/// always a coherent snapshot.
#[derive(Debug, Clone)]
pub struct TransformSmoother {
    scale: ExponentialFilter,
    rotation_x: ExponentialFilter,
    rotation_y: ExponentialFilter,
}

impl TransformSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            scale: ExponentialFilter::new(alpha),
            rotation_x: ExponentialFilter::new(alpha),
            rotation_y: ExponentialFilter::new(alpha),
        }
    }

    /// Advance the filters one render tick toward `state`
    pub fn smooth(&mut self, state: &InteractionState) -> PresentedTransform {
        PresentedTransform {
            scale: self.scale.filter(state.scale),
            rotation_x: self.rotation_x.filter(state.rotation_x),
            rotation_y: self.rotation_y.filter(state.rotation_y),
        }
    }

    pub fn reset(&mut self) {
        self.scale.reset();
        self.rotation_x.reset();
        self.rotation_y.reset();
    }
}

impl Default for TransformSmoother {
    fn default() -> Self {
        Self::new(SMOOTHING_ALPHA)
    }
}
