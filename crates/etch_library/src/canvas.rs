//! Visual mirror of the plotter.

use crate::planner::Position;
use crate::raster::Raster;

/// Receives the same motion the plotter does, in canvas pixel coordinates.
pub trait Canvas {
    fn draw_to(&mut self, pos: Position);
    fn clear(&mut self);
    fn pen_up(&mut self);
    fn pen_down(&mut self);
}

/// A canvas that rasterises pen-down motion into a 1-bit image.
///
/// Positions are canvas-centred (y up); the raster is row-major from the
/// top-left corner.
#[derive(Debug, Clone)]
pub struct Sketch {
    raster: Raster,
    cursor: Position,
    pen_down: bool,
}

impl Sketch {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            // +1 so both edges of the clamped range are drawable
            raster: Raster::new(width as usize + 1, height as usize + 1),
            cursor: Position::default(),
            pen_down: false,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    /// Pixel (column, row) for a canvas-centred position.
    pub fn pixel(&self, pos: Position) -> (i64, i64) {
        let half_w = (self.raster.width() - 1) as f64 / 2.0;
        let half_h = (self.raster.height() - 1) as f64 / 2.0;
        (
            (pos.x + half_w).round() as i64,
            (half_h - pos.y).round() as i64,
        )
    }
}

impl Canvas for Sketch {
    fn draw_to(&mut self, pos: Position) {
        if self.pen_down {
            let from = self.pixel(self.cursor);
            let to = self.pixel(pos);
            self.raster.line(from, to);
        }
        self.cursor = pos;
    }

    fn clear(&mut self) {
        self.raster.reset();
    }

    fn pen_up(&mut self) {
        self.pen_down = false;
    }

    fn pen_down(&mut self) {
        self.pen_down = true;
    }
}
