//! Render sink boundary.
//!
//! The engine does not draw. Each tick it hands the finished frame to a
//! [`RenderSink`], and the embedding application decides what a frame
//! becomes: GPU buffers, a network stream, or nothing at all.

use holomorph_core::Result;

use crate::field::FieldFrame;

/// Receives finished frames from the update task.
pub trait RenderSink: Send {
    /// Hands one frame to the sink. The borrow ends with the call, so a
    /// sink that keeps data must copy it out.
    fn submit(&mut self, frame: &FieldFrame) -> Result<()>;
}

/// Discards every frame. Used for headless runs and benchmarks.
#[derive(Debug, Default)]
pub struct NullSink {
    submitted: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl RenderSink for NullSink {
    fn submit(&mut self, _frame: &FieldFrame) -> Result<()> {
        self.submitted += 1;
        Ok(())
    }
}

/// Keeps the most recent frame. Used by tests and snapshot capture.
#[derive(Debug, Default)]
pub struct CollectingSink {
    last: Option<FieldFrame>,
    submitted: u64,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&FieldFrame> {
        self.last.as_ref()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl RenderSink for CollectingSink {
    fn submit(&mut self, frame: &FieldFrame) -> Result<()> {
        self.last = Some(frame.clone());
        self.submitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_counts_frames() {
        let mut sink = NullSink::new();
        let frame = FieldFrame::new();
        sink.submit(&frame).unwrap();
        sink.submit(&frame).unwrap();
        assert_eq!(sink.submitted(), 2);
    }

    #[test]
    fn test_collecting_sink_keeps_latest() {
        let mut sink = CollectingSink::new();

        let mut first = FieldFrame::new();
        first.positions.push([1.0, 0.0, 0.0]);
        first.colors.push([1.0, 1.0, 1.0]);
        sink.submit(&first).unwrap();

        let mut second = FieldFrame::new();
        second.positions.push([0.0, 2.0, 0.0]);
        second.positions.push([0.0, 0.0, 3.0]);
        second.colors.push([0.5, 0.5, 0.5]);
        second.colors.push([0.5, 0.5, 0.5]);
        sink.submit(&second).unwrap();

        let last = sink.last_frame().unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last.positions[1], [0.0, 0.0, 3.0]);
        assert_eq!(sink.submitted(), 2);
    }
}
