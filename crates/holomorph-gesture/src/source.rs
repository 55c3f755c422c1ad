//! Landmark acquisition interfaces.
//!
//! The pose-estimation service itself (camera, model) lives outside this
//! crate; everything here talks to it through [`LandmarkSource`]. Callers
//! of a real backend are expected to pass strictly increasing timestamps
//! and to skip detection calls for an unchanged camera frame; the
//! pipeline additionally drops any frame whose timestamp fails to
//! advance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use holomorph_core::{Error, HandFrame, Result};

/// Lifecycle status of a landmark source, surfaced to the embedding
/// application. A failed source never halts rendering; the field just
/// keeps running without gestures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceStatus {
    Initializing,
    Running,
    Stopped,
    Failed(String),
}

/// Trait for hand landmark acquisition backends
#[async_trait]
pub trait LandmarkSource: Send + Sync {
    /// Start producing frames
    async fn start(&mut self) -> Result<()>;

    /// Stop producing frames and release the capture device
    async fn stop(&mut self) -> Result<()>;

    /// Check if acquisition is active
    fn is_running(&self) -> bool;

    /// Current lifecycle status
    fn status(&self) -> SourceStatus;

    /// Receive the next frame (blocking)
    async fn recv(&mut self) -> Result<HandFrame>;

    /// Try to receive a frame (non-blocking)
    fn try_recv(&mut self) -> Option<HandFrame>;
}

/// Replays a prerecorded frame sequence at a fixed cadence.
///
/// Stands in for the external pose-estimation service in tests and
/// benchmarks. Frames are delivered in order on a spawned task; when the
/// script runs out the channel closes and `recv` reports the end.
pub struct ScriptedSource {
    frames: Vec<HandFrame>,
    interval: Duration,
    rx: Option<mpsc::Receiver<HandFrame>>,
    status: SourceStatus,
}

impl ScriptedSource {
    pub fn new(frames: Vec<HandFrame>) -> Self {
        Self {
            frames,
            interval: Duration::from_millis(1),
            rx: None,
            status: SourceStatus::Initializing,
        }
    }

    /// Delay between replayed frames (default 1ms)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[async_trait]
impl LandmarkSource for ScriptedSource {
    async fn start(&mut self) -> Result<()> {
        if self.rx.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(64);
        self.rx = Some(rx);
        self.status = SourceStatus::Running;

        let frames = self.frames.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            for frame in frames {
                tokio::time::sleep(interval).await;
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.rx = None;
        self.status = SourceStatus::Stopped;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.rx.is_some()
    }

    fn status(&self) -> SourceStatus {
        self.status.clone()
    }

    async fn recv(&mut self) -> Result<HandFrame> {
        match &mut self.rx {
            Some(rx) => rx
                .recv()
                .await
                .ok_or_else(|| Error::Source("Frame stream ended".into())),
            None => Err(Error::Source("Source not started".into())),
        }
    }

    fn try_recv(&mut self) -> Option<HandFrame> {
        self.rx.as_mut()?.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holomorph_core::Timestamp;

    #[tokio::test]
    async fn test_scripted_replay_in_order() {
        let frames = (0..5)
            .map(|i| HandFrame::empty(Timestamp::from_nanos(i)))
            .collect();
        let mut source = ScriptedSource::new(frames);

        source.start().await.unwrap();
        assert!(source.is_running());
        assert_eq!(source.status(), SourceStatus::Running);

        for i in 0..5 {
            let frame = source.recv().await.unwrap();
            assert_eq!(frame.timestamp.as_nanos(), i);
        }

        // Script exhausted, channel closed
        assert!(source.recv().await.is_err());

        source.stop().await.unwrap();
        assert!(!source.is_running());
        assert_eq!(source.status(), SourceStatus::Stopped);
    }

    #[tokio::test]
    async fn test_recv_before_start_errors() {
        let mut source = ScriptedSource::new(Vec::new());
        assert!(source.recv().await.is_err());
        assert_eq!(source.status(), SourceStatus::Initializing);
    }
}
