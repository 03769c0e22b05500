//! Folds one cycle's worth of control changes into a single [`MotionUpdate`].

use crate::event::ControlChange;
use crate::keys::Direction;
use crate::knob::{Axis, KnobTracker};
use crate::preset::ControllerPreset;

/// Everything requested during one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionUpdate {
    /// Accelerated and clamped x steps
    pub x_change: f64,
    /// Accelerated and clamped y steps
    pub y_change: f64,
    pub pen_toggle: bool,
    pub go_home: bool,
    pub go_top_left: bool,
    pub go_top_right: bool,
    pub go_bottom_left: bool,
    pub go_bottom_right: bool,
}

enum Action {
    Knob(Axis),
    PenToggle,
    Home,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Button(Direction),
}

pub struct Interpreter {
    preset: ControllerPreset,
    knobs: KnobTracker,
    buttons: Vec<Direction>,
}

impl Interpreter {
    pub fn new(preset: ControllerPreset) -> Self {
        Self {
            preset,
            knobs: KnobTracker::new(),
            buttons: Vec::new(),
        }
    }

    pub fn knobs(&self) -> &KnobTracker {
        &self.knobs
    }

    /// Directions currently held down via MIDI buttons.
    pub fn held_buttons(&self) -> &[Direction] {
        &self.buttons
    }

    fn action(&self, controller: u8) -> Option<Action> {
        let p = &self.preset;
        // axes first: a preset may reuse a number, the knob wins
        let action = match controller {
            c if c == p.x_control => Action::Knob(Axis::X),
            c if c == p.y_control => Action::Knob(Axis::Y),
            c if c == p.pen_toggle_control => Action::PenToggle,
            c if c == p.home_control => Action::Home,
            c if c == p.top_left_control => Action::TopLeft,
            c if c == p.top_right_control => Action::TopRight,
            c if c == p.bottom_left_control => Action::BottomLeft,
            c if c == p.bottom_right_control => Action::BottomRight,
            c if Some(c) == p.left_button => Action::Button(Direction::Left),
            c if Some(c) == p.right_button => Action::Button(Direction::Right),
            c if Some(c) == p.up_button => Action::Button(Direction::Up),
            c if Some(c) == p.down_button => Action::Button(Direction::Down),
            _ => return None,
        };
        Some(action)
    }

    /// Drains `events` into one update. Off-channel and unmapped messages are
    /// dropped without a trace.
    pub fn interpret<I>(&mut self, events: I) -> MotionUpdate
    where
        I: IntoIterator<Item = ControlChange>,
    {
        let mut update = MotionUpdate::default();

        for event in events {
            if let Some(channel) = self.preset.control_channel
                && event.channel != channel
            {
                continue;
            }
            let Some(action) = self.action(event.controller) else {
                continue;
            };

            match action {
                Action::Knob(axis) => {
                    let delta = self.knobs.decode(axis, event.value) as f64;
                    // Fold the delta in, then accelerate and clamp the running
                    // total after every event, so a burst saturates immediately
                    // and later events in the same cycle start from the clamp.
                    let (total, accel, max) = match axis {
                        Axis::X => (
                            &mut update.x_change,
                            self.preset.x_acceleration,
                            self.preset.max_x_speed,
                        ),
                        Axis::Y => (
                            &mut update.y_change,
                            self.preset.y_acceleration,
                            self.preset.max_y_speed,
                        ),
                    };
                    *total = ((*total + delta) * accel).clamp(-max, max);
                }
                Action::PenToggle => update.pen_toggle = true,
                Action::Home => update.go_home = true,
                Action::TopLeft => update.go_top_left = true,
                Action::TopRight => update.go_top_right = true,
                Action::BottomLeft => update.go_bottom_left = true,
                Action::BottomRight => update.go_bottom_right = true,
                Action::Button(direction) => {
                    let held = self.buttons.contains(&direction);
                    if event.value > 0 && !held {
                        self.buttons.push(direction);
                    } else if event.value == 0 && held {
                        self.buttons.retain(|d| *d != direction);
                    }
                }
            }
        }

        if update != MotionUpdate::default() {
            log::debug!("{update:?}");
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(controller: u8, value: u8) -> ControlChange {
        ControlChange::new(0, controller, value)
    }

    #[test]
    fn knob_deltas_accumulate() {
        let mut interp = Interpreter::new(ControllerPreset::bcr2000());
        let update = interp.interpret([cc(6, 64), cc(6, 60), cc(6, 58), cc(2, 10), cc(2, 13)]);
        assert_eq!(update.x_change, 6.0);
        assert_eq!(update.y_change, -3.0);
        assert!(!update.pen_toggle);
    }

    #[test]
    fn baseline_survives_across_cycles() {
        let mut interp = Interpreter::new(ControllerPreset::bcr2000());
        assert_eq!(interp.interpret([cc(6, 64)]), MotionUpdate::default());
        assert_eq!(interp.interpret([cc(6, 70)]).x_change, -6.0);
        assert_eq!(interp.knobs().last(Axis::X), Some(70));
    }

    #[test]
    fn acceleration_compounds_on_the_running_total() {
        let mut interp = Interpreter::new(ControllerPreset::digitakt());
        let ch = |c, v| ControlChange::new(9, c, v);
        // two +1 steps: (1 * 1.25 + 1) * 1.25
        let update = interp.interpret([ch(74, 20), ch(74, 19), ch(74, 18)]);
        assert_eq!(update.x_change, 2.8125);

        // y accelerates 2.5x per event and saturates at the speed limit
        let update = interp.interpret([ch(77, 50), ch(77, 49), ch(77, 48), ch(77, 47), ch(77, 46)]);
        assert_eq!(update.y_change, 30.0);
    }

    #[test]
    fn acceleration_scales_each_event() {
        let mut interp = Interpreter::new(ControllerPreset::digitakt());
        let events = [(74, 20), (74, 18), (77, 50), (77, 48)]
            .map(|(c, v)| ControlChange::new(9, c, v));
        let update = interp.interpret(events);
        assert_eq!(update.x_change, 2.5);
        assert_eq!(update.y_change, 5.0);
    }

    #[test]
    fn clamping_happens_per_event() {
        let mut interp = Interpreter::new(ControllerPreset::bcr2000());
        interp.interpret([cc(6, 100)]);
        // +40 saturates to 30, then -10 lands at 20 (an end-of-cycle clamp
        // would have given 30)
        let update = interp.interpret([cc(6, 60), cc(6, 70)]);
        assert_eq!(update.x_change, 20.0);

        let update = interp.interpret([cc(6, 127), cc(6, 0)]);
        assert_eq!(update.x_change, 30.0);
    }

    #[test]
    fn wrong_channel_is_discarded() {
        let mut interp = Interpreter::new(ControllerPreset::digitakt());
        let update = interp.interpret([
            ControlChange::new(0, 40, 127),
            ControlChange::new(9, 72, 127),
        ]);
        assert!(!update.pen_toggle);
        assert!(update.go_top_right);
    }

    #[test]
    fn no_channel_filter_accepts_everything() {
        let mut preset = ControllerPreset::bcr2000();
        preset.control_channel = None;
        let mut interp = Interpreter::new(preset);
        let update = interp.interpret([ControlChange::new(5, 40, 127)]);
        assert!(update.pen_toggle);
    }

    #[test]
    fn discrete_flags_stay_set() {
        let mut interp = Interpreter::new(ControllerPreset::bcr2000());
        let update =
            interp.interpret([cc(39, 127), cc(39, 0), cc(71, 127), cc(80, 127), cc(99, 1)]);
        assert!(update.go_home);
        assert!(update.go_top_left);
        assert!(update.go_bottom_right);
        assert!(!update.go_top_right);
        assert!(!update.go_bottom_left);
        assert_eq!(update.x_change, 0.0);
    }

    #[test]
    fn buttons_hold_until_released() {
        let mut interp = Interpreter::new(ControllerPreset::digitakt());
        let ch = |c, v| ControlChange::new(9, c, v);
        interp.interpret([ch(48, 127), ch(50, 127), ch(48, 127)]);
        assert_eq!(interp.held_buttons(), &[Direction::Left, Direction::Up]);
        interp.interpret([ch(48, 0)]);
        assert_eq!(interp.held_buttons(), &[Direction::Up]);
    }
}
