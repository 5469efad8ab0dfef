//! Application context shared by the window's event loop.
//!
//! Owns the child (if it started), the poller fed by its output, and the
//! control relay. Launch problems never abort the harness: the session
//! falls back to "no subprocess" and keeps the window alive.

use crate::capture::FrameSource;
use crate::child::{ChildState, ChildSupervisor};
use crate::config::AppConfig;
use crate::poller::{FramePoller, TickReport};
use crate::relay::{ButtonMapping, ControlEvent, InputRelay};
use crate::surface::Surface;

pub const NO_SUBPROCESS: &str = "No subprocess";

/// Line printed to stdout once the launch attempt has settled.
pub fn launch_banner(pid: Option<u32>) -> String {
    match pid {
        Some(pid) => format!("Read output for {pid}"),
        None => NO_SUBPROCESS.to_string(),
    }
}

pub struct HarnessSession<S> {
    child: Option<ChildSupervisor>,
    poller: Option<FramePoller<S>>,
    relay: Option<InputRelay>,
    status: String,
}

impl<S: FrameSource> HarnessSession<S> {
    /// Launch the child and wire its output into a poller whose frames land at `canvas_origin`.
    pub fn start(
        config: &AppConfig,
        embed_xid: u64,
        source: S,
        canvas_origin: (usize, usize),
    ) -> Self {
        let relay = if config.controls_enabled() {
            let relay = InputRelay::realtime(ButtonMapping::standard());
            if relay.is_none() {
                tracing::warn!("real-time signals unavailable; control panel is inert");
            }
            relay
        } else {
            None
        };

        let (program, args) = config.launch_command();
        let emubin = config.emubin_dir();
        match ChildSupervisor::launch(&program, &args, &emubin, embed_xid) {
            Ok((child, streams)) => {
                let pid = child.pid();
                let poller = FramePoller::new(streams.stdout, streams.stderr, source, config.frame_size())
                    .with_origin(canvas_origin.0, canvas_origin.1)
                    .with_clock(config.clock_enabled());
                println!("{}", launch_banner(Some(pid)));
                Self {
                    child: Some(child),
                    poller: Some(poller),
                    relay,
                    status: format!("Zynthian PID={pid}"),
                }
            }
            Err(err) => {
                tracing::error!("Can't start subprocess: {err:#}");
                println!("{}", launch_banner(None));
                Self {
                    child: None,
                    poller: None,
                    relay,
                    status: NO_SUBPROCESS.to_string(),
                }
            }
        }
    }

    /// Text for the status strip above the canvas.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn child_pid(&self) -> Option<u32> {
        self.child.as_ref().map(ChildSupervisor::pid)
    }

    pub fn child_state(&self) -> ChildState {
        self.child
            .as_ref()
            .map(ChildSupervisor::state)
            .unwrap_or(ChildState::NotStarted)
    }

    pub fn child_mut(&mut self) -> Option<&mut ChildSupervisor> {
        self.child.as_mut()
    }

    pub fn controls_active(&self) -> bool {
        self.relay.is_some()
    }

    /// One poll cycle. `None` when there is no child to poll.
    pub fn tick(&mut self, surface: &mut Surface) -> Option<TickReport> {
        let poller = self.poller.as_mut()?;
        Some(poller.tick(surface))
    }

    /// Relay a control panel event. Returns the signal sent, if any.
    pub fn control(&self, event: ControlEvent) -> Option<i32> {
        self.relay.as_ref()?.dispatch(event, self.child.as_ref())
    }

    /// Force-kill the child. Returns the pid the kill was sent to.
    pub fn shutdown(&mut self) -> Option<u32> {
        let child = self.child.as_mut()?;
        let pid = child.pid();
        self.status = format!("Closing PID={pid}");
        tracing::info!(pid, "closing; killing child");
        child.kill().then_some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::fake::FakeSource;
    use crate::relay::{ControlAction, Edge, PointerButton};
    use clap::Parser;
    use std::os::unix::process::ExitStatusExt;

    fn config(launcher: &str) -> AppConfig {
        let mut cfg = AppConfig::parse_from([
            "test-app",
            "--launcher",
            launcher,
            "--emubin",
            "/tmp/emuface-emubin",
            "--no-logs",
        ]);
        cfg.validate().unwrap();
        cfg
    }

    #[test]
    fn launch_banner_names_pid_or_missing_child() {
        assert_eq!(launch_banner(Some(4242)), "Read output for 4242");
        assert_eq!(launch_banner(None), "No subprocess");
    }

    #[test]
    fn missing_launcher_degrades_to_no_subprocess() {
        let cfg = config("/nonexistent/zynthian_gui_emu.sh");
        let mut session = HarnessSession::start(&cfg, 1, FakeSource::default(), (0, 0));
        assert_eq!(session.status(), NO_SUBPROCESS);
        assert_eq!(session.child_pid(), None);
        assert_eq!(session.child_state(), ChildState::NotStarted);
        let mut surface = Surface::new(4, 4);
        assert_eq!(session.tick(&mut surface), None);
        assert_eq!(session.shutdown(), None);
        let event = ControlEvent {
            group: 0,
            action: ControlAction::Select,
            pointer: PointerButton::Left,
            edge: Edge::Press,
        };
        assert_eq!(session.control(event), None);
    }

    #[test]
    fn shutdown_kills_the_recorded_pid() {
        let cfg = config("sleep");
        let mut session = HarnessSession::start(&cfg, 30, FakeSource::default(), (0, 0));
        let pid = session.child_pid().expect("child started");
        assert_eq!(session.status(), format!("Zynthian PID={pid}"));
        assert_eq!(session.child_state(), ChildState::Running);

        assert_eq!(session.shutdown(), Some(pid));
        assert_eq!(session.status(), format!("Closing PID={pid}"));
        let status = session.child_mut().unwrap().wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGKILL));
    }

    #[test]
    fn control_events_are_signalled_to_the_child() {
        let Some((base, _)) = crate::child::realtime_range() else {
            return;
        };
        let cfg = config("sleep");
        let mut session = HarnessSession::start(&cfg, 30, FakeSource::default(), (0, 0));
        assert!(session.controls_active());
        let event = ControlEvent {
            group: 0,
            action: ControlAction::Select,
            pointer: PointerButton::Left,
            edge: Edge::Press,
        };
        assert_eq!(session.control(event), Some(base));
        session.shutdown();
        session.child_mut().unwrap().wait().unwrap();
    }

    #[test]
    fn disabled_controls_send_nothing() {
        let mut cfg = config("sleep");
        cfg.no_controls = true;
        let mut session = HarnessSession::start(&cfg, 30, FakeSource::default(), (0, 0));
        assert!(!session.controls_active());
        let event = ControlEvent {
            group: 1,
            action: ControlAction::Increment,
            pointer: PointerButton::Left,
            edge: Edge::Press,
        };
        assert_eq!(session.control(event), None);
        assert!(session.shutdown().is_some());
        session.child_mut().unwrap().wait().unwrap();
    }
}
