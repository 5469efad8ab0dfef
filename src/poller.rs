//! Periodic UI-thread work: drain child output, follow window announcements,
//! and refresh the canvas from the child's window.
//!
//! [`FramePoller::tick`] must only run on the UI thread. The caller schedules
//! it; a tick never blocks on the child.

use crate::capture::{FrameSize, FrameSource, WindowLink};
use crate::protocol::{
    decode_chunks, parse_stderr_line, parse_stdout_line, sanitize_for_log, AnnouncementKind,
    ChildLine, Severity,
};
use crate::surface::{timestamp_label, RgbImage, Surface, CLOCK_COLOR, CLOCK_SHADOW};
use crossbeam_channel::Receiver;

const CLOCK_MARGIN: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    NoWindow,
    Pending,
    Drawn,
    NotReady,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub stdout_lines: usize,
    pub stderr_lines: usize,
    pub frame: FrameOutcome,
}

pub struct FramePoller<S> {
    stdout: Receiver<Vec<u8>>,
    stderr: Receiver<Vec<u8>>,
    source: S,
    link: WindowLink,
    gui_xid: Option<String>,
    parent_xid: Option<String>,
    size: FrameSize,
    origin: (usize, usize),
    clock: bool,
}

impl<S: FrameSource> FramePoller<S> {
    pub fn new(
        stdout: Receiver<Vec<u8>>,
        stderr: Receiver<Vec<u8>>,
        source: S,
        size: FrameSize,
    ) -> Self {
        Self {
            stdout,
            stderr,
            source,
            link: WindowLink::default(),
            gui_xid: None,
            parent_xid: None,
            size,
            origin: (0, 0),
            clock: false,
        }
    }

    /// Where captured frames land on the surface.
    pub fn with_origin(mut self, x: usize, y: usize) -> Self {
        self.origin = (x, y);
        self
    }

    /// Overlay the wall-clock time on every drawn frame.
    pub fn with_clock(mut self, enabled: bool) -> Self {
        self.clock = enabled;
        self
    }

    /// Last announced GUI window id, as the child printed it.
    pub fn gui_xid(&self) -> Option<&str> {
        self.gui_xid.as_deref()
    }

    /// Last announced parent window id. Stored for diagnostics only.
    pub fn parent_xid(&self) -> Option<&str> {
        self.parent_xid.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn link(&self) -> &WindowLink {
        &self.link
    }

    pub fn tick(&mut self, surface: &mut Surface) -> TickReport {
        let stdout_lines = self.drain_stdout();
        let stderr_lines = self.drain_stderr();
        let frame = self.refresh(surface);
        TickReport {
            stdout_lines,
            stderr_lines,
            frame,
        }
    }

    fn drain_stdout(&mut self) -> usize {
        let batch = decode_chunks(self.stdout.try_iter());
        if batch.lossy {
            tracing::warn!(stream = "stdout", "child output was not valid UTF-8");
        }
        for line in &batch.lines {
            tracing::info!(target: "emuface::child", "{}", sanitize_for_log(line));
            if let ChildLine::Announcement(kind, value) = parse_stdout_line(line) {
                self.on_announcement(kind, value);
            }
        }
        batch.lines.len()
    }

    fn on_announcement(&mut self, kind: AnnouncementKind, value: String) {
        match kind {
            AnnouncementKind::GuiWindow => {
                if let Err(err) = self.link.announce(&value) {
                    tracing::error!("ignoring window announcement: {err}");
                }
                self.gui_xid = Some(value);
            }
            AnnouncementKind::ParentWindow => {
                self.parent_xid = Some(value);
            }
        }
    }

    fn drain_stderr(&mut self) -> usize {
        let batch = decode_chunks(self.stderr.try_iter());
        if batch.lossy {
            tracing::warn!(stream = "stderr", "child output was not valid UTF-8");
        }
        for line in &batch.lines {
            if let ChildLine::Log(severity, message) = parse_stderr_line(line) {
                let message = sanitize_for_log(&message);
                match severity {
                    Severity::Debug => tracing::debug!(target: "emuface::child", "{message}"),
                    Severity::Info => tracing::info!(target: "emuface::child", "{message}"),
                    Severity::Error => tracing::error!(target: "emuface::child", "{message}"),
                }
            }
        }
        batch.lines.len()
    }

    fn refresh(&mut self, surface: &mut Surface) -> FrameOutcome {
        if let WindowLink::Pending { xid, attempts } = self.link {
            if let Err(err) = self.link.resolve(&mut self.source) {
                if attempts == 0 {
                    tracing::warn!(xid, "cannot resolve child window yet: {err}");
                } else {
                    tracing::debug!(xid, attempts, "window resolution retry failed: {err}");
                }
                return FrameOutcome::Pending;
            }
        }
        let Some(window) = self.link.ready().copied() else {
            return FrameOutcome::NoWindow;
        };

        let frame = match self.source.capture(&window, self.size) {
            Ok(frame) => frame,
            Err(err) if err.is_not_ready() => return FrameOutcome::NotReady,
            Err(err) => {
                tracing::error!(xid = window.xid, "error capturing child window: {err}");
                return FrameOutcome::Failed;
            }
        };
        let image = match RgbImage::from_bgrx(&frame) {
            Ok(image) => image,
            Err(err) => {
                tracing::error!(xid = window.xid, "error converting capture: {err}");
                return FrameOutcome::Failed;
            }
        };

        let (x, y) = self.origin;
        surface.draw_image(x, y, &image);
        if self.clock {
            surface.draw_outlined_text(
                x as i32 + CLOCK_MARGIN,
                y as i32 + CLOCK_MARGIN,
                1,
                CLOCK_COLOR,
                CLOCK_SHADOW,
                &timestamp_label(),
            );
        }
        FrameOutcome::Drawn
    }
}
