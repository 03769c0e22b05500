use crate::canvas::Canvas;
use crate::plotter::Plotter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PenState {
    #[default]
    Up,
    Down,
}

/// Tracks the pen and re-asserts it on both the canvas and the plotter.
///
/// Every call notifies both sides, even when the state doesn't change: the
/// physical pen may have drifted from what we think it is.
#[derive(Debug, Default)]
pub struct Pen {
    state: PenState,
}

impl Pen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PenState {
        self.state
    }

    pub fn is_down(&self) -> bool {
        self.state == PenState::Down
    }

    pub fn toggle(&mut self, canvas: &mut impl Canvas, plotter: &mut impl Plotter) -> PenState {
        match self.state {
            PenState::Up => self.lower(canvas, plotter),
            PenState::Down => self.lift(canvas, plotter),
        }
    }

    pub fn lift(&mut self, canvas: &mut impl Canvas, plotter: &mut impl Plotter) -> PenState {
        self.state = PenState::Up;
        canvas.pen_up();
        plotter.pen_up();
        self.state
    }

    pub fn lower(&mut self, canvas: &mut impl Canvas, plotter: &mut impl Plotter) -> PenState {
        self.state = PenState::Down;
        canvas.pen_down();
        plotter.pen_down();
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Sketch;
    use crate::plotter::PlotterDevice;

    #[test]
    fn toggle_flips_and_forced_states_stick() {
        let mut canvas = Sketch::new(10, 10);
        let mut plotter = PlotterDevice::disconnected();
        let mut pen = Pen::new();
        assert_eq!(pen.state(), PenState::Up);

        assert_eq!(pen.toggle(&mut canvas, &mut plotter), PenState::Down);
        assert!(canvas.is_pen_down());
        assert_eq!(pen.toggle(&mut canvas, &mut plotter), PenState::Up);
        assert!(!canvas.is_pen_down());

        assert_eq!(pen.lower(&mut canvas, &mut plotter), PenState::Down);
        assert_eq!(pen.lower(&mut canvas, &mut plotter), PenState::Down);
        assert_eq!(pen.lift(&mut canvas, &mut plotter), PenState::Up);
        assert!(!pen.is_down());
    }
}
