//! Single-threaded window loop: pumps input, relays control clicks, and runs
//! the frame poller on its timer.

use std::time::{Duration, Instant};

use emuface::capture::FrameSource;
use emuface::relay::{ControlEvent, Edge, PointerButton};
use emuface::surface::{rgb, Surface};
use emuface::HarnessSession;
use minifb::{Key, MouseButton, MouseMode, Window};

use crate::panel::{ControlPanel, PanelButton};

pub(crate) const STATUS_HEIGHT: usize = 16;
const STATUS_BG: u32 = rgb(0x18, 0x18, 0x1c);
const STATUS_FG: u32 = rgb(0xe0, 0xe0, 0xe0);

const POINTERS: [PointerButton; 3] = [
    PointerButton::Left,
    PointerButton::Middle,
    PointerButton::Right,
];

pub(crate) struct EventLoopState {
    pub(crate) surface: Surface,
    pub(crate) panel: Option<ControlPanel>,
    /// Button that received the press for each pointer, released against the same button.
    pub(crate) held: [Option<PanelButton>; 3],
    pub(crate) pointer_down: [bool; 3],
}

pub(crate) struct EventLoopTimers {
    pub(crate) poll_interval: Duration,
    pub(crate) next_poll: Instant,
}

fn pointer_index(pointer: PointerButton) -> usize {
    match pointer {
        PointerButton::Left => 0,
        PointerButton::Middle => 1,
        PointerButton::Right => 2,
    }
}

fn minifb_button(pointer: PointerButton) -> MouseButton {
    match pointer {
        PointerButton::Left => MouseButton::Left,
        PointerButton::Middle => MouseButton::Middle,
        PointerButton::Right => MouseButton::Right,
    }
}

/// Turn the latest pointer sample into control events.
///
/// A press on a panel button emits a press for it; the release of that
/// pointer emits a release for the same button even if the cursor moved off.
pub(crate) fn pointer_events(
    state: &mut EventLoopState,
    now_down: [bool; 3],
    pos: Option<(i32, i32)>,
) -> Vec<ControlEvent> {
    let mut events = Vec::new();
    for pointer in POINTERS {
        let idx = pointer_index(pointer);
        let was_down = state.pointer_down[idx];
        let is_down = now_down[idx];
        state.pointer_down[idx] = is_down;
        if is_down && !was_down {
            let hit = state
                .panel
                .as_ref()
                .zip(pos)
                .and_then(|(panel, (x, y))| panel.find_at(x, y));
            if let Some(button) = hit {
                state.held[idx] = Some(button);
                events.push(ControlEvent {
                    group: button.group,
                    action: button.action,
                    pointer,
                    edge: Edge::Press,
                });
            }
        } else if !is_down && was_down {
            if let Some(button) = state.held[idx].take() {
                events.push(ControlEvent {
                    group: button.group,
                    action: button.action,
                    pointer,
                    edge: Edge::Release,
                });
            }
        }
    }
    events
}

fn draw_status(surface: &mut Surface, text: &str) {
    surface.fill_rect(0, 0, surface.width() as i32, STATUS_HEIGHT as i32, STATUS_BG);
    surface.draw_text(4, 4, 1, STATUS_FG, text);
}

pub(crate) fn run_event_loop<S: FrameSource>(
    window: &mut Window,
    session: &mut HarnessSession<S>,
    state: &mut EventLoopState,
    timers: &mut EventLoopTimers,
) {
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now_down = POINTERS.map(|pointer| window.get_mouse_down(minifb_button(pointer)));
        let pos = window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| (x as i32, y as i32));
        for event in pointer_events(state, now_down, pos) {
            session.control(event);
        }

        let now = Instant::now();
        if now >= timers.next_poll {
            session.tick(&mut state.surface);
            timers.next_poll = now + timers.poll_interval;
        }

        draw_status(&mut state.surface, session.status());
        if let Some(panel) = &state.panel {
            let held: Vec<PanelButton> = state.held.iter().flatten().copied().collect();
            panel.render(&mut state.surface, &held);
        }

        let (width, height) = (state.surface.width(), state.surface.height());
        if let Err(err) = window.update_with_buffer(state.surface.pixels(), width, height) {
            tracing::error!("window update failed: {err}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emuface::relay::ControlAction;

    fn state_with_panel() -> EventLoopState {
        EventLoopState {
            surface: Surface::new(480, 100),
            panel: Some(ControlPanel::new(50, 480)),
            held: [None; 3],
            pointer_down: [false; 3],
        }
    }

    fn center(button: &PanelButton) -> (i32, i32) {
        (button.x + button.w / 2, button.y + button.h / 2)
    }

    #[test]
    fn press_and_release_on_button() {
        let mut state = state_with_panel();
        let button = state.panel.as_ref().unwrap().buttons()[2];
        let pos = Some(center(&button));

        let events = pointer_events(&mut state, [true, false, false], pos);
        assert_eq!(
            events,
            vec![ControlEvent {
                group: 0,
                action: ControlAction::Increment,
                pointer: PointerButton::Left,
                edge: Edge::Press,
            }]
        );
        assert!(pointer_events(&mut state, [true, false, false], pos).is_empty());

        let events = pointer_events(&mut state, [false, false, false], Some((0, 0)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].edge, Edge::Release);
        assert_eq!(events[0].action, ControlAction::Increment);
    }

    #[test]
    fn press_outside_panel_sends_nothing() {
        let mut state = state_with_panel();
        assert!(pointer_events(&mut state, [true, false, false], Some((10, 10))).is_empty());
        assert!(pointer_events(&mut state, [false, false, false], Some((10, 10))).is_empty());
    }

    #[test]
    fn right_click_keeps_pointer_identity() {
        let mut state = state_with_panel();
        let button = state.panel.as_ref().unwrap().buttons()[4];
        let events = pointer_events(&mut state, [false, false, true], Some(center(&button)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pointer, PointerButton::Right);
        assert_eq!(events[0].group, 1);
        assert_eq!(events[0].action, ControlAction::Select);
    }

    #[test]
    fn no_panel_means_no_events() {
        let mut state = state_with_panel();
        state.panel = None;
        assert!(pointer_events(&mut state, [true, true, true], Some((100, 60))).is_empty());
    }
}
