//! Turns a cycle's steps into a heading and distance, and moves the cursor.
//!
//! Canvas coordinates are centred on the window: x grows right, y grows up,
//! headings are compass-style degrees with 0 pointing right and 90 pointing up.

use crate::interpreter::MotionUpdate;
use crate::keys::Direction;
use crate::pen::PenState;

/// Size of one canvas pixel on paper (1/72 inch).
pub const MM_PER_PIXEL: f64 = 0.352777778;

pub const DEFAULT_KEY_STEP: f64 = 4.0;
pub const DEFAULT_PEN_UP_STRIDE: f64 = 1.5;
pub const DEFAULT_PEN_DOWN_STRIDE: f64 = 0.45;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of a window of the given pixel size, centred on the origin.
    pub fn from_window(width: u32, height: u32) -> Self {
        let max_x = width as f64 / 2.0;
        let max_y = height as f64 / 2.0;
        Self {
            min_x: -max_x,
            max_x,
            min_y: -max_y,
            max_y,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_y..=self.max_y).contains(&pos.y)
    }

    /// Clamps each axis independently to the edge.
    pub fn clamp(&self, pos: Position) -> Position {
        Position {
            x: pos.x.clamp(self.min_x, self.max_x),
            y: pos.y.clamp(self.min_y, self.max_y),
        }
    }

    pub fn target(&self, jump: Jump) -> Position {
        match jump {
            // the plotter's origin sits at the top-left corner of the canvas
            Jump::Home | Jump::TopLeft => Position::new(self.min_x, self.max_y),
            Jump::TopRight => Position::new(self.max_x, self.max_y),
            Jump::BottomLeft => Position::new(self.min_x, self.min_y),
            Jump::BottomRight => Position::new(self.max_x, self.min_y),
        }
    }
}

/// Absolute jumps, in descending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Home,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Jump {
    /// Picks the single jump honored this cycle; lower-priority requests are dropped.
    pub fn select(update: &MotionUpdate) -> Option<Self> {
        [
            (update.go_home, Jump::Home),
            (update.go_top_left, Jump::TopLeft),
            (update.go_top_right, Jump::TopRight),
            (update.go_bottom_left, Jump::BottomLeft),
            (update.go_bottom_right, Jump::BottomRight),
        ]
        .into_iter()
        .find_map(|(requested, jump)| requested.then_some(jump))
    }
}

/// Heading in degrees, linearly blended between the axis directions by the
/// relative size of each component. This is not atan2: `angle(5, 5)` is 135.
pub fn angle(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let total = dx.abs() + dy.abs();
    let wx = dx.abs() / total;
    let wy = dy.abs() / total;

    let mut heading = 90.0 * wy + 180.0 * wx;
    if dx < 0.0 {
        heading = 180.0 - heading;
    }
    if dy < 0.0 {
        heading = 360.0 - heading;
    }
    heading
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plan {
    Idle,
    Jump(Jump),
    Move { heading: f64, distance: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planner {
    bounds: Bounds,
    key_step: f64,
    pen_up_stride: f64,
    pen_down_stride: f64,
}

impl Planner {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            key_step: DEFAULT_KEY_STEP,
            pen_up_stride: DEFAULT_PEN_UP_STRIDE,
            pen_down_stride: DEFAULT_PEN_DOWN_STRIDE,
        }
    }

    pub fn with_key_step(mut self, key_step: f64) -> Self {
        self.key_step = key_step;
        self
    }

    pub fn with_strides(mut self, pen_up: f64, pen_down: f64) -> Self {
        self.pen_up_stride = pen_up;
        self.pen_down_stride = pen_down;
        self
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn stride(&self, pen: PenState) -> f64 {
        match pen {
            PenState::Up => self.pen_up_stride,
            PenState::Down => self.pen_down_stride,
        }
    }

    /// Knob steps plus one fixed step per held direction.
    pub fn steps(&self, update: &MotionUpdate, held: &[Direction]) -> (f64, f64) {
        held.iter().fold((update.x_change, update.y_change), |(x, y), d| {
            let (sx, sy) = d.step();
            (x + sx * self.key_step, y + sy * self.key_step)
        })
    }

    /// Resolves one cycle. A jump wins over any relative motion.
    pub fn plan(&self, update: &MotionUpdate, held: &[Direction], pen: PenState) -> Plan {
        if let Some(jump) = Jump::select(update) {
            return Plan::Jump(jump);
        }
        let (dx, dy) = self.steps(update, held);
        if dx == 0.0 && dy == 0.0 {
            return Plan::Idle;
        }
        Plan::Move {
            heading: angle(dx, dy),
            distance: (dx.abs() + dy.abs()) * self.stride(pen),
        }
    }

    /// Moves forward along `heading`, clamping to the canvas edge.
    pub fn advance(&self, from: Position, heading: f64, distance: f64) -> Position {
        let rad = heading.to_radians();
        self.bounds.clamp(Position {
            x: from.x + distance * rad.cos(),
            y: from.y + distance * rad.sin(),
        })
    }

    /// Canvas position to plotter millimetres: origin top-left, y downwards.
    pub fn to_millimeters(&self, pos: Position) -> (f64, f64) {
        (
            (pos.x - self.bounds.min_x) * MM_PER_PIXEL,
            (self.bounds.max_y - pos.y) * MM_PER_PIXEL,
        )
    }
}
