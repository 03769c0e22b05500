//! Endless rotary knobs that only report an absolute 0..=127 position.
//!
//! The hardware position can't be reset, so once a knob sits on an endstop we
//! treat a repeated endstop value as "still turning". This occasionally drops
//! or doubles a count at the extremes.

const KNOB_MIN: u8 = 0;
const KNOB_MAX: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Default, Clone)]
pub struct KnobTracker {
    x: Option<u8>,
    y: Option<u8>,
}

impl KnobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last raw value seen for `axis`, `None` until the first message.
    pub fn last(&self, axis: Axis) -> Option<u8> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Returns the signed step delta for a new raw value, already inverted to
    /// match the logical direction of motion (the knobs are mounted backwards).
    pub fn decode(&mut self, axis: Axis, raw: u8) -> i32 {
        let value = raw.min(KNOB_MAX);
        let slot = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        };

        let delta = match *slot {
            None => 0,
            Some(KNOB_MIN) if value == KNOB_MIN => -1,
            Some(KNOB_MAX) if value == KNOB_MAX => 1,
            Some(prev) => value as i32 - prev as i32,
        };
        *slot = Some(value);

        -delta
    }
}
