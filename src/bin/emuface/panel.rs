//! Clickable control panel under the canvas.
//!
//! Four control groups, each a row of decrement / select / increment buttons.

use emuface::relay::{ControlAction, CONTROL_GROUPS};
use emuface::surface::{rgb, text_width, Surface};

pub(crate) const PANEL_HEIGHT: usize = 40;
const GAP: i32 = 4;
const LABEL_SCALE: i32 = 2;

const PANEL_BG: u32 = rgb(0x20, 0x20, 0x24);
const BUTTON_BG: u32 = rgb(0x50, 0x50, 0x58);
const BUTTON_PRESSED: u32 = rgb(0xc0, 0x80, 0x30);
const GROUP_EDGE: u32 = rgb(0x80, 0x80, 0x88);
const LABEL_COLOR: u32 = rgb(0xf0, 0xf0, 0xf0);

/// A clickable button region on the panel (surface coordinates, inclusive start, exclusive end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PanelButton {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
    pub(crate) group: usize,
    pub(crate) action: ControlAction,
}

impl PanelButton {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ControlPanel {
    top: i32,
    width: i32,
    buttons: Vec<PanelButton>,
}

impl ControlPanel {
    /// Lay out the panel across `width` pixels starting at row `top`.
    pub(crate) fn new(top: usize, width: usize) -> Self {
        let top = top as i32;
        let width = width as i32;
        let group_w = width / CONTROL_GROUPS as i32;
        let button_w = ((group_w - GAP * 4) / 3).max(1);
        let button_h = PANEL_HEIGHT as i32 - GAP * 2;
        let mut buttons = Vec::with_capacity(CONTROL_GROUPS * 3);
        for group in 0..CONTROL_GROUPS {
            let group_x = group as i32 * group_w;
            for (slot, action) in ControlAction::ALL.into_iter().enumerate() {
                buttons.push(PanelButton {
                    x: group_x + GAP + slot as i32 * (button_w + GAP),
                    y: top + GAP,
                    w: button_w,
                    h: button_h,
                    group,
                    action,
                });
            }
        }
        Self {
            top,
            width,
            buttons,
        }
    }

    /// Find the button under surface position (`x`, `y`).
    pub(crate) fn find_at(&self, x: i32, y: i32) -> Option<PanelButton> {
        self.buttons.iter().copied().find(|button| button.contains(x, y))
    }

    #[cfg(test)]
    pub(crate) fn buttons(&self) -> &[PanelButton] {
        &self.buttons
    }

    /// Repaint the panel, highlighting any held buttons.
    pub(crate) fn render(&self, surface: &mut Surface, held: &[PanelButton]) {
        surface.fill_rect(0, self.top, self.width, PANEL_HEIGHT as i32, PANEL_BG);
        let group_w = self.width / CONTROL_GROUPS as i32;
        for group in 1..CONTROL_GROUPS as i32 {
            surface.fill_rect(group * group_w, self.top + GAP, 1, PANEL_HEIGHT as i32 - GAP * 2, GROUP_EDGE);
        }
        for button in &self.buttons {
            let color = if held.contains(button) {
                BUTTON_PRESSED
            } else {
                BUTTON_BG
            };
            surface.fill_rect(button.x, button.y, button.w, button.h, color);
            let label = button.action.label();
            let label_x = button.x + (button.w - text_width(label, LABEL_SCALE)) / 2;
            let label_y = button.y + (button.h - 8 * LABEL_SCALE) / 2;
            surface.draw_text(label_x, label_y, LABEL_SCALE, LABEL_COLOR, label);
        }
    }
}
