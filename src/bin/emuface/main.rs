//! emuface entrypoint: one window that hosts the emulator's framebuffer.
//!
//! # Architecture
//!
//! - Reader threads: drain the child's stdout and stderr into channels
//! - UI thread: pumps the window, relays control clicks as signals, and runs
//!   the frame poller every poll interval
//!
//! The window is a status strip, the canvas the child's pixels are copied
//! into, and (unless `--no-controls`) the control panel.

mod event_loop;
mod panel;

use anyhow::{anyhow, Result};
use minifb::{Window, WindowOptions};
use std::time::Instant;

use emuface::capture::X11FrameSource;
use emuface::surface::Surface;
use emuface::telemetry::{init_tracing, install_panic_hook};
use emuface::{AppConfig, HarnessSession};

use crate::event_loop::{run_event_loop, EventLoopState, EventLoopTimers, STATUS_HEIGHT};
use crate::panel::{ControlPanel, PANEL_HEIGHT};

const TARGET_FPS: usize = 60;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_tracing(&config);
    install_panic_hook();
    tracing::debug!(?config, "emuface starting");

    let width = config.width as usize;
    let canvas_height = config.height as usize;
    let panel_height = if config.controls_enabled() {
        PANEL_HEIGHT
    } else {
        0
    };
    let height = STATUS_HEIGHT + canvas_height + panel_height;

    let mut window = Window::new(&config.title, width, height, WindowOptions::default())
        .map_err(|err| anyhow!("failed to open window: {err}"))?;
    window.set_target_fps(TARGET_FPS);
    let embed_xid = window.get_window_handle() as usize as u64;

    let mut session = HarnessSession::start(
        &config,
        embed_xid,
        X11FrameSource::new(None),
        (0, STATUS_HEIGHT),
    );
    let panel = (config.controls_enabled() && session.controls_active())
        .then(|| ControlPanel::new(STATUS_HEIGHT + canvas_height, width));

    let mut state = EventLoopState {
        surface: Surface::new(width, height),
        panel,
        held: [None; 3],
        pointer_down: [false; 3],
    };
    let mut timers = EventLoopTimers {
        poll_interval: config.poll_interval(),
        next_poll: Instant::now(),
    };

    run_event_loop(&mut window, &mut session, &mut state, &mut timers);

    if let Some(pid) = session.shutdown() {
        tracing::info!(pid, "child killed");
    }
    tracing::debug!("emuface exiting");
    Ok(())
}
