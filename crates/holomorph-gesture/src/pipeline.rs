//! Complete gesture detection pipeline.
//!
//! Wires a landmark source into the classifier and accumulator on a
//! detection task, publishing results through shared cells for the
//! render side. Detection cadence is whatever the source delivers; the
//! renderer is never blocked by it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

use holomorph_core::{HandFrame, InteractionState, Result, Timestamp};

use crate::accumulator::{GestureAccumulator, ROTATION_SENSITIVITY, SCALE_GUARD};
use crate::classifier::{GestureClassifier, GestureSignal, PINCH_THRESHOLD};
use crate::smoother::SMOOTHING_ALPHA;
use crate::source::{LandmarkSource, SourceStatus};
use crate::state::DetectionCells;

/// Configuration for the gesture pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Pinch threshold in normalized image units
    pub pinch_threshold: f64,

    /// Frame-to-frame scale ratios outside this band are rejected as jitter
    pub scale_guard_low: f64,
    pub scale_guard_high: f64,

    /// Radians of rotation per unit of anchor travel
    pub rotation_sensitivity: f64,

    /// Presentation smoothing factor
    pub smoothing_alpha: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: PINCH_THRESHOLD,
            scale_guard_low: SCALE_GUARD.0,
            scale_guard_high: SCALE_GUARD.1,
            rotation_sensitivity: ROTATION_SENSITIVITY,
            smoothing_alpha: SMOOTHING_ALPHA,
        }
    }
}

/// The main gesture processing pipeline
pub struct GesturePipeline {
    config: GestureConfig,
    classifier: GestureClassifier,
    accumulator: GestureAccumulator,
    last_timestamp: Option<Timestamp>,
}

impl GesturePipeline {
    pub fn new(config: GestureConfig) -> Self {
        let classifier = GestureClassifier::new(config.pinch_threshold);
        let accumulator = GestureAccumulator::new(
            config.rotation_sensitivity,
            (config.scale_guard_low, config.scale_guard_high),
        );

        Self {
            config,
            classifier,
            accumulator,
            last_timestamp: None,
        }
    }

    /// Process a single frame.
    ///
    /// Returns `None` when the frame is dropped for a non-advancing
    /// timestamp; otherwise the classified signal, already folded into
    /// the accumulated state.
    pub fn process_frame(&mut self, frame: &HandFrame) -> Option<GestureSignal> {
        if let Some(last) = self.last_timestamp {
            if frame.timestamp <= last {
                tracing::debug!(
                    "dropping frame with non-advancing timestamp {} <= {}",
                    frame.timestamp.as_nanos(),
                    last.as_nanos()
                );
                return None;
            }
        }
        self.last_timestamp = Some(frame.timestamp);

        let signal = self.classifier.classify(frame);
        self.accumulator.apply(&signal);
        Some(signal)
    }

    /// Accumulated interaction state after the frames processed so far
    pub fn state(&self) -> InteractionState {
        self.accumulator.state()
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Reset accumulated state and the timestamp guard
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.last_timestamp = None;
    }

    /// Start draining a source on a detection task.
    ///
    /// Each processed frame publishes its signal and the updated state to
    /// `cells`. The task ends when the source dries up or the handle is
    /// stopped; either way the source's `stop` runs so the capture device
    /// is released. An in-flight `recv` is allowed to finish, only its
    /// continuation is dropped.
    pub async fn start_streaming<S: LandmarkSource + 'static>(
        &self,
        mut source: S,
        cells: DetectionCells,
    ) -> Result<DetectionHandle> {
        if let Err(e) = source.start().await {
            cells.status.publish(SourceStatus::Failed(e.to_string()));
            tracing::error!("Landmark source failed to start: {}", e);
            return Err(e);
        }
        cells.status.publish(SourceStatus::Running);

        let is_running = Arc::new(RwLock::new(true));
        let flag = is_running.clone();
        let config = self.config.clone();

        let join = tokio::spawn(async move {
            let mut pipeline = GesturePipeline::new(config);

            loop {
                if !*flag.read() {
                    break;
                }

                match source.recv().await {
                    Ok(frame) => {
                        if let Some(signal) = pipeline.process_frame(&frame) {
                            cells.signal.publish(signal);
                            cells.interaction.publish(pipeline.state());
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Landmark source ended: {}", e);
                        break;
                    }
                }
            }

            let _ = source.stop().await;
            *flag.write() = false;
            cells.status.publish(SourceStatus::Stopped);
            tracing::info!("detection task stopped");
        });

        Ok(DetectionHandle { is_running, join })
    }
}

/// Handle to a running detection task
pub struct DetectionHandle {
    is_running: Arc<RwLock<bool>>,
    join: JoinHandle<()>,
}

impl DetectionHandle {
    /// Stop scheduling further detection ticks
    pub fn stop(&self) {
        *self.is_running.write() = false;
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    /// Wait for the detection task to finish
    pub async fn wait(self) {
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use holomorph_core::{Hand, HandLandmark, LandmarkPoint};

    fn pinching_hand_at(wrist: (f64, f64)) -> Hand {
        let mut landmarks =
            [LandmarkPoint::new(wrist.0, wrist.1, 0.0); HandLandmark::COUNT];
        landmarks[HandLandmark::ThumbTip as usize] =
            LandmarkPoint::new(wrist.0 + 0.01, wrist.1, 0.0);
        landmarks[HandLandmark::IndexTip as usize] =
            LandmarkPoint::new(wrist.0 + 0.02, wrist.1, 0.0);
        Hand::new(landmarks)
    }

    fn two_hand_frame(nanos: i64, separation: f64) -> HandFrame {
        let left = pinching_hand_at((0.5 - separation / 2.0, 0.5));
        let right = pinching_hand_at((0.5 + separation / 2.0, 0.5));
        HandFrame::new(Timestamp::from_nanos(nanos), vec![left, right]).unwrap()
    }

    #[test]
    fn test_stale_timestamps_dropped() {
        let mut pipeline = GesturePipeline::new(GestureConfig::default());

        assert!(pipeline
            .process_frame(&HandFrame::empty(Timestamp::from_nanos(10)))
            .is_some());
        assert!(pipeline
            .process_frame(&HandFrame::empty(Timestamp::from_nanos(10)))
            .is_none());
        assert!(pipeline
            .process_frame(&HandFrame::empty(Timestamp::from_nanos(5)))
            .is_none());
        assert!(pipeline
            .process_frame(&HandFrame::empty(Timestamp::from_nanos(11)))
            .is_some());
    }

    #[test]
    fn test_two_hand_scale_scenario() {
        let mut pipeline = GesturePipeline::new(GestureConfig::default());

        pipeline.process_frame(&two_hand_frame(1, 0.30));
        pipeline.process_frame(&two_hand_frame(2, 0.33));

        assert!((pipeline.state().scale - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_hands_never_changes_state() {
        let mut pipeline = GesturePipeline::new(GestureConfig::default());

        pipeline.process_frame(&two_hand_frame(1, 0.30));
        pipeline.process_frame(&two_hand_frame(2, 0.33));
        let held = pipeline.state();

        let signal = pipeline
            .process_frame(&HandFrame::empty(Timestamp::from_nanos(3)))
            .unwrap();
        assert_eq!(signal, GestureSignal::None);
        assert_eq!(pipeline.state(), held);

        // The next pinch seeds a fresh baseline instead of jumping
        pipeline.process_frame(&two_hand_frame(4, 0.60));
        assert_eq!(pipeline.state(), held);
    }

    #[tokio::test]
    async fn test_streaming_publishes_accumulated_state() {
        let frames = vec![two_hand_frame(1, 0.30), two_hand_frame(2, 0.33)];
        let source = ScriptedSource::new(frames);
        let cells = DetectionCells::new();

        let pipeline = GesturePipeline::new(GestureConfig::default());
        let handle = pipeline
            .start_streaming(source, cells.clone())
            .await
            .unwrap();
        handle.wait().await;

        let state = cells.interaction.snapshot();
        assert!((state.scale - 1.1).abs() < 1e-9);
        assert!(cells.signal.snapshot().is_pinch());
        assert_eq!(cells.status.snapshot(), SourceStatus::Stopped);
    }

    #[tokio::test]
    async fn test_streaming_stop_releases_task() {
        // Endless empty frames, so only stop() can end the task
        let frames = (0..10_000)
            .map(|i| HandFrame::empty(Timestamp::from_nanos(i)))
            .collect();
        let source = ScriptedSource::new(frames);
        let cells = DetectionCells::new();

        let pipeline = GesturePipeline::new(GestureConfig::default());
        let handle = pipeline
            .start_streaming(source, cells.clone())
            .await
            .unwrap();
        assert_eq!(cells.status.snapshot(), SourceStatus::Running);

        handle.stop();
        handle.wait().await;
        assert_eq!(cells.status.snapshot(), SourceStatus::Stopped);
    }
}
