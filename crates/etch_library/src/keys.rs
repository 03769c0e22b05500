//! Held directional input shared with the input layer.
//!
//! Press/release notifications may arrive on any thread; the tick only reads
//! a snapshot. This set is the only state crossing that boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in planner axis sense (same sense as the knobs: +x heads left).
    pub fn step(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (1.0, 0.0),
            Direction::Right => (-1.0, 0.0),
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Lock-free set of currently held directions. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    bits: Arc<AtomicU8>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, direction: Direction) {
        self.bits.fetch_or(direction.bit(), Ordering::SeqCst);
    }

    pub fn release(&self, direction: Direction) {
        self.bits.fetch_and(!direction.bit(), Ordering::SeqCst);
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.bits.load(Ordering::SeqCst) & direction.bit() != 0
    }

    pub fn snapshot(&self) -> Vec<Direction> {
        let bits = self.bits.load(Ordering::SeqCst);
        Direction::ALL
            .into_iter()
            .filter(|d| bits & d.bit() != 0)
            .collect()
    }
}
