//! The [`FrameSink`] boundary (spec.md §4.9, §6): where the composited
//! frame goes. How the transport backend actually gets bytes to a device
//! is out of scope; the core only needs `send`.

use crate::error::SinkError;
use oled_primitives::Frame;

pub trait FrameSink: Send {
    fn send(&mut self, frame: &Frame) -> Result<(), SinkError>;
}

/// A sink that discards every frame; used by tests and as a safe fallback
/// when no real backend is configured.
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames_sent: u64,
}

impl FrameSink for NullSink {
    fn send(&mut self, _frame: &Frame) -> Result<(), SinkError> {
        self.frames_sent += 1;
        Ok(())
    }
}
