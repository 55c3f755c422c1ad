//! Last-value-wins shared cells between the detection and render tasks.
//!
//! No queue, no backpressure. A slow detector leaves the renderer reading
//! a stale but always coherent value; a fast detector overwrites before
//! the next read. The mutex guarantees the `(scale, rotation)` triple is
//! never observed torn.

use parking_lot::Mutex;
use std::sync::Arc;

use holomorph_core::InteractionState;

use crate::classifier::GestureSignal;
use crate::source::SourceStatus;

/// Single-writer, single-reader snapshot cell
#[derive(Debug)]
pub struct SharedCell<T> {
    slot: Arc<Mutex<T>>,
}

impl<T: Clone> SharedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value)),
        }
    }

    /// Overwrite the cell with a new value
    pub fn publish(&self, value: T) {
        *self.slot.lock() = value;
    }

    /// Copy out the latest value
    pub fn snapshot(&self) -> T {
        self.slot.lock().clone()
    }
}

impl<T> Clone for SharedCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// The cells the detection task writes and the render side reads
#[derive(Debug, Clone)]
pub struct DetectionCells {
    /// Latest classified signal, written once per processed frame
    pub signal: SharedCell<GestureSignal>,
    /// Latest accumulated interaction state
    pub interaction: SharedCell<InteractionState>,
    /// Source lifecycle status
    pub status: SharedCell<SourceStatus>,
}

impl DetectionCells {
    pub fn new() -> Self {
        Self {
            signal: SharedCell::new(GestureSignal::None),
            interaction: SharedCell::new(InteractionState::new()),
            status: SharedCell::new(SourceStatus::Initializing),
        }
    }
}

impl Default for DetectionCells {
    fn default() -> Self {
        Self::new()
    }
}
