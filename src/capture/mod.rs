//! Child window tracking and pixel capture.
//!
//! The poller only talks to a [`FrameSource`]; the X11 implementation lives in
//! [`x11`]. [`WindowLink`] tracks whether an announced window is usable yet.

mod x11;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;

use std::fmt;

pub use self::x11::X11FrameSource;

/// Capture region size; the origin is always (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u16,
    pub height: u16,
}

impl FrameSize {
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Raw 32-bit-per-pixel capture in BGRX byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub data: Vec<u8>,
}

/// A window the source has bound to and can capture from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub xid: u32,
    /// Parent reported by the window tree at resolution time. Recorded only.
    pub parent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Announced id is not a base-10 window number.
    InvalidId(String),
    /// The window exists but has no mapped pixels yet.
    NotReady,
    Connection(String),
    Protocol(String),
}

impl CaptureError {
    pub fn is_not_ready(&self) -> bool {
        matches!(self, CaptureError::NotReady)
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InvalidId(raw) => write!(f, "invalid window id {raw:?}"),
            CaptureError::NotReady => write!(f, "window not mapped yet"),
            CaptureError::Connection(msg) => write!(f, "display connection failed: {msg}"),
            CaptureError::Protocol(msg) => write!(f, "capture failed: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Parse an announced window id (base 10, surrounding whitespace ignored).
pub fn parse_xid(raw: &str) -> Result<u32, CaptureError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| CaptureError::InvalidId(raw.to_string()))
}

/// Windowing-system access used by the frame poller.
pub trait FrameSource {
    /// Bind to window `xid`. Called again whenever the child re-announces.
    fn resolve(&mut self, xid: u32) -> Result<ResolvedWindow, CaptureError>;

    /// Capture `size` pixels from the window's origin.
    fn capture(&mut self, window: &ResolvedWindow, size: FrameSize) -> Result<RawFrame, CaptureError>;
}

/// Lifecycle of the captured window: nothing announced, announced but not
/// bound yet, or bound and capturable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WindowLink {
    #[default]
    NoWindow,
    Pending { xid: u32, attempts: u32 },
    Ready(ResolvedWindow),
}

impl WindowLink {
    /// Record a window announcement. Any previous binding is dropped so the
    /// next [`WindowLink::resolve`] binds afresh.
    pub fn announce(&mut self, raw: &str) -> Result<(), CaptureError> {
        let xid = parse_xid(raw)?;
        *self = WindowLink::Pending { xid, attempts: 0 };
        Ok(())
    }

    /// Try to bind a pending window. No-op in the other states.
    pub fn resolve<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<(), CaptureError> {
        let WindowLink::Pending { xid, attempts } = *self else {
            return Ok(());
        };
        match source.resolve(xid) {
            Ok(window) => {
                tracing::debug!(xid = window.xid, parent = ?window.parent, "child window resolved");
                *self = WindowLink::Ready(window);
                Ok(())
            }
            Err(err) => {
                *self = WindowLink::Pending {
                    xid,
                    attempts: attempts.saturating_add(1),
                };
                Err(err)
            }
        }
    }

    pub fn ready(&self) -> Option<&ResolvedWindow> {
        match self {
            WindowLink::Ready(window) => Some(window),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WindowLink::Pending { .. })
    }
}
