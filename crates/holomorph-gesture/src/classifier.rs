//! Per-frame gesture classification.
//!
//! Stateless: one [`HandFrame`] in, one [`GestureSignal`] out. Anything
//! the accumulator needs to remember between frames lives there, not here.

use nalgebra::center;
use serde::{Deserialize, Serialize};

use holomorph_core::{Anchor, Hand, HandFrame};

/// Default pinch threshold in normalized image units
pub const PINCH_THRESHOLD: f64 = 0.12;

/// Which pinch variant produced a measurement.
///
/// Single and double pinches measure different distances (thumb-to-index
/// vs. wrist-to-wrist), so deltas are only meaningful within one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinchKind {
    Single,
    Double,
}

/// Classified gesture state for one frame, recomputed every detection tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureSignal {
    /// No usable gesture: no hands, malformed hands, or hands not pinching
    None,
    /// One hand pinching; distance is thumb-tip to index-tip, anchor is the wrist
    SinglePinch { distance: f64, anchor: Anchor },
    /// Both hands pinching; distance is wrist to wrist, anchor is their midpoint
    DoublePinch { distance: f64, anchor: Anchor },
}

impl GestureSignal {
    pub fn is_pinch(&self) -> bool {
        !matches!(self, GestureSignal::None)
    }

    /// Raw measurement carried by a pinch signal
    pub fn measurement(&self) -> Option<(PinchKind, f64, Anchor)> {
        match *self {
            GestureSignal::None => None,
            GestureSignal::SinglePinch { distance, anchor } => {
                Some((PinchKind::Single, distance, anchor))
            }
            GestureSignal::DoublePinch { distance, anchor } => {
                Some((PinchKind::Double, distance, anchor))
            }
        }
    }
}

impl Default for GestureSignal {
    fn default() -> Self {
        GestureSignal::None
    }
}

/// Stateless classifier mapping hand frames to gesture signals
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    pinch_threshold: f64,
}

impl GestureClassifier {
    pub fn new(pinch_threshold: f64) -> Self {
        Self { pinch_threshold }
    }

    /// Thumb-tip to index-tip distance on the image plane
    fn pinch_distance(hand: &Hand) -> f64 {
        nalgebra::distance(&hand.thumb_tip().planar(), &hand.index_tip().planar())
    }

    fn is_pinching(&self, hand: &Hand) -> bool {
        Self::pinch_distance(hand) < self.pinch_threshold
    }

    /// Classify one frame.
    ///
    /// Malformed hands (non-finite or out-of-range landmarks) are treated
    /// as absent. With two valid hands, both must pinch or the frame
    /// classifies as none; a lone pinching hand out of two contributes no
    /// transform.
    pub fn classify(&self, frame: &HandFrame) -> GestureSignal {
        let valid: Vec<&Hand> = frame.hands.iter().filter(|h| h.is_valid()).collect();

        match valid.as_slice() {
            [] => GestureSignal::None,
            [hand] => {
                if self.is_pinching(hand) {
                    GestureSignal::SinglePinch {
                        distance: Self::pinch_distance(hand),
                        anchor: Anchor::from_point2(hand.wrist().planar()),
                    }
                } else {
                    GestureSignal::None
                }
            }
            [first, second] => {
                if self.is_pinching(first) && self.is_pinching(second) {
                    let a = first.wrist().planar();
                    let b = second.wrist().planar();
                    GestureSignal::DoublePinch {
                        distance: nalgebra::distance(&a, &b),
                        anchor: Anchor::from_point2(center(&a, &b)),
                    }
                } else {
                    GestureSignal::None
                }
            }
            _ => GestureSignal::None,
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(PINCH_THRESHOLD)
    }
}
