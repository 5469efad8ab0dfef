use super::{CaptureError, FrameSize, FrameSource, RawFrame, ResolvedWindow};
use std::collections::VecDeque;

/// Scripted frame source for poller and session tests.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pub(crate) resolve_results: VecDeque<Result<ResolvedWindow, CaptureError>>,
    pub(crate) capture_results: VecDeque<Result<RawFrame, CaptureError>>,
    pub(crate) resolved: Vec<u32>,
    pub(crate) captures: usize,
}

impl FakeSource {
    /// Solid-color BGRX frame of the given size.
    pub(crate) fn solid_frame(size: FrameSize, b: u8, g: u8, r: u8) -> RawFrame {
        let mut data = Vec::with_capacity(size.pixel_count() * 4);
        for _ in 0..size.pixel_count() {
            data.extend_from_slice(&[b, g, r, 0]);
        }
        RawFrame {
            width: size.width,
            height: size.height,
            depth: 24,
            data,
        }
    }
}

impl FrameSource for FakeSource {
    fn resolve(&mut self, xid: u32) -> Result<ResolvedWindow, CaptureError> {
        self.resolved.push(xid);
        self.resolve_results
            .pop_front()
            .unwrap_or(Ok(ResolvedWindow { xid, parent: None }))
    }

    fn capture(&mut self, _window: &ResolvedWindow, size: FrameSize) -> Result<RawFrame, CaptureError> {
        self.captures += 1;
        self.capture_results
            .pop_front()
            .unwrap_or_else(|| Ok(Self::solid_frame(size, 0, 0, 0)))
    }
}
