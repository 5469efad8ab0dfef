//! Simulated hardware controls relayed to the child as real-time signals.
//!
//! Each control group (one rotary encoder with its push switch) owns three
//! signal offsets. A press sends `base + 2 * offset`; the matching release
//! sends the next number up.

use crate::child::{realtime_range, ChildSupervisor};

pub const CONTROL_GROUPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Decrement,
    Select,
    Increment,
}

impl ControlAction {
    pub const ALL: [ControlAction; 3] = [
        ControlAction::Decrement,
        ControlAction::Select,
        ControlAction::Increment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ControlAction::Decrement => "-",
            ControlAction::Select => "o",
            ControlAction::Increment => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// One press or release on the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    pub group: usize,
    pub action: ControlAction,
    pub pointer: PointerButton,
    pub edge: Edge,
}

/// Signal offsets for one control group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGroup {
    pub select: u8,
    pub up: u8,
    pub down: u8,
}

impl ControlGroup {
    pub fn offset(&self, action: ControlAction) -> u8 {
        match action {
            ControlAction::Decrement => self.down,
            ControlAction::Select => self.select,
            ControlAction::Increment => self.up,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMapping {
    groups: [ControlGroup; CONTROL_GROUPS],
}

impl ButtonMapping {
    /// Switches 0-3 are the encoder pushes; 4-11 are the up/down pairs.
    pub fn standard() -> Self {
        let mut groups = [ControlGroup {
            select: 0,
            up: 0,
            down: 0,
        }; CONTROL_GROUPS];
        for (index, group) in groups.iter_mut().enumerate() {
            let index = index as u8;
            *group = ControlGroup {
                select: index,
                up: 4 + 2 * index,
                down: 5 + 2 * index,
            };
        }
        Self { groups }
    }

    pub fn group(&self, index: usize) -> Option<&ControlGroup> {
        self.groups.get(index)
    }
}

/// Left click keeps the button's own action; middle and right clicks act as
/// the group's decrement and increment regardless of the button clicked.
pub fn effective_action(action: ControlAction, pointer: PointerButton) -> ControlAction {
    match pointer {
        PointerButton::Left => action,
        PointerButton::Middle => ControlAction::Decrement,
        PointerButton::Right => ControlAction::Increment,
    }
}

pub fn signal_number(base: i32, offset: u8, edge: Edge) -> i32 {
    let release = match edge {
        Edge::Press => 0,
        Edge::Release => 1,
    };
    base + 2 * i32::from(offset) + release
}

pub struct InputRelay {
    mapping: ButtonMapping,
    base: i32,
    max: i32,
}

impl InputRelay {
    pub fn new(mapping: ButtonMapping, base: i32, max: i32) -> Self {
        Self { mapping, base, max }
    }

    /// Relay bound to the platform's real-time signal range, if it has one.
    pub fn realtime(mapping: ButtonMapping) -> Option<Self> {
        realtime_range().map(|(base, max)| Self::new(mapping, base, max))
    }

    /// Signal number for `event`, or `None` for an unknown group or a number
    /// past the end of the real-time range.
    pub fn signal_for(&self, event: ControlEvent) -> Option<i32> {
        let group = self.mapping.group(event.group)?;
        let action = effective_action(event.action, event.pointer);
        let signo = signal_number(self.base, group.offset(action), event.edge);
        (signo <= self.max).then_some(signo)
    }

    /// Send the signal for `event` to the child, if there is one.
    pub fn dispatch(&self, event: ControlEvent, child: Option<&ChildSupervisor>) -> Option<i32> {
        let child = child?;
        let Some(signo) = self.signal_for(event) else {
            tracing::warn!(?event, "control event has no signal mapping");
            return None;
        };
        tracing::debug!(pid = child.pid(), signo, ?event, "relaying control");
        child.signal(signo).then_some(signo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: i32 = 34;
    const MAX: i32 = 64;

    fn relay() -> InputRelay {
        InputRelay::new(ButtonMapping::standard(), BASE, MAX)
    }

    fn event(group: usize, action: ControlAction, pointer: PointerButton, edge: Edge) -> ControlEvent {
        ControlEvent {
            group,
            action,
            pointer,
            edge,
        }
    }

    #[test]
    fn standard_mapping_offsets() {
        let mapping = ButtonMapping::standard();
        assert!(mapping.group(3).is_some());
        assert!(mapping.group(4).is_none());
        assert_eq!(
            mapping.group(0),
            Some(&ControlGroup {
                select: 0,
                up: 4,
                down: 5
            })
        );
        assert_eq!(
            mapping.group(3),
            Some(&ControlGroup {
                select: 3,
                up: 10,
                down: 11
            })
        );
        assert_eq!(mapping.group(4), None);
    }

    #[test]
    fn increment_press_on_first_group() {
        let signo = relay().signal_for(event(
            0,
            ControlAction::Increment,
            PointerButton::Left,
            Edge::Press,
        ));
        assert_eq!(signo, Some(BASE + 8));
    }

    #[test]
    fn decrement_release_on_last_group() {
        let signo = relay().signal_for(event(
            3,
            ControlAction::Decrement,
            PointerButton::Left,
            Edge::Release,
        ));
        assert_eq!(signo, Some(BASE + 23));
    }

    #[test]
    fn select_uses_group_index() {
        let r = relay();
        assert_eq!(
            r.signal_for(event(2, ControlAction::Select, PointerButton::Left, Edge::Press)),
            Some(BASE + 4)
        );
        assert_eq!(
            r.signal_for(event(2, ControlAction::Select, PointerButton::Left, Edge::Release)),
            Some(BASE + 5)
        );
    }

    #[test]
    fn middle_and_right_clicks_remap_to_extremes() {
        for action in ControlAction::ALL {
            assert_eq!(
                effective_action(action, PointerButton::Middle),
                ControlAction::Decrement
            );
            assert_eq!(
                effective_action(action, PointerButton::Right),
                ControlAction::Increment
            );
            assert_eq!(effective_action(action, PointerButton::Left), action);
        }
        let r = relay();
        assert_eq!(
            r.signal_for(event(1, ControlAction::Select, PointerButton::Right, Edge::Press)),
            Some(BASE + 2 * 6)
        );
        assert_eq!(
            r.signal_for(event(1, ControlAction::Increment, PointerButton::Middle, Edge::Press)),
            Some(BASE + 2 * 7)
        );
    }

    #[test]
    fn out_of_range_signals_are_refused() {
        let r = InputRelay::new(ButtonMapping::standard(), BASE, BASE + 20);
        assert_eq!(
            r.signal_for(event(3, ControlAction::Decrement, PointerButton::Left, Edge::Press)),
            None
        );
        assert_eq!(
            r.signal_for(event(9, ControlAction::Select, PointerButton::Left, Edge::Press)),
            None
        );
    }

    #[test]
    fn dispatch_without_child_sends_nothing() {
        let sent = relay().dispatch(
            event(0, ControlAction::Select, PointerButton::Left, Edge::Press),
            None,
        );
        assert_eq!(sent, None);
    }

    #[test]
    fn signal_arithmetic() {
        assert_eq!(signal_number(10, 0, Edge::Press), 10);
        assert_eq!(signal_number(10, 0, Edge::Release), 11);
        assert_eq!(signal_number(10, 11, Edge::Release), 33);
    }
}
