//! Hand landmark frames as delivered by a pose-estimation source.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{HandLandmark, LandmarkPoint, Timestamp};

/// Maximum number of hands a frame may carry
pub const MAX_HANDS: usize = 2;

/// One detected hand, exactly 21 ordered landmarks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: [LandmarkPoint; HandLandmark::COUNT],
}

impl Hand {
    pub fn new(landmarks: [LandmarkPoint; HandLandmark::COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a hand from a landmark slice, enforcing the 21-point layout
    pub fn from_points(points: &[LandmarkPoint]) -> Result<Self> {
        if points.len() != HandLandmark::COUNT {
            return Err(Error::LandmarkCount {
                expected: HandLandmark::COUNT,
                actual: points.len(),
            });
        }
        let mut landmarks = [LandmarkPoint::new(0.0, 0.0, 0.0); HandLandmark::COUNT];
        landmarks.copy_from_slice(points);
        Ok(Self { landmarks })
    }

    pub fn landmark(&self, which: HandLandmark) -> &LandmarkPoint {
        &self.landmarks[which as usize]
    }

    pub fn wrist(&self) -> &LandmarkPoint {
        self.landmark(HandLandmark::Wrist)
    }

    pub fn thumb_tip(&self) -> &LandmarkPoint {
        self.landmark(HandLandmark::ThumbTip)
    }

    pub fn index_tip(&self) -> &LandmarkPoint {
        self.landmark(HandLandmark::IndexTip)
    }

    /// A hand is usable only when every landmark is finite and in range
    pub fn is_valid(&self) -> bool {
        self.landmarks.iter().all(|lm| lm.is_valid())
    }
}

/// One detection call's worth of hands (0 to 2) plus the source timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub timestamp: Timestamp,
    pub hands: Vec<Hand>,
}

impl HandFrame {
    pub fn new(timestamp: Timestamp, hands: Vec<Hand>) -> Result<Self> {
        if hands.len() > MAX_HANDS {
            return Err(Error::InvalidFrame(format!(
                "{} hands exceeds the limit of {}",
                hands.len(),
                MAX_HANDS
            )));
        }
        Ok(Self { timestamp, hands })
    }

    /// A frame with no hands detected
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }
}
