use etch_library::canvas::Canvas;
use etch_library::planner::Jump;
use etch_library::plotter::Plotter;
use etch_library::session::Session;

/// Traces the canvas border with the pen down, then returns home. A quick
/// check that the paper, the pen height and the canvas mapping line up.
pub(crate) fn self_test<C: Canvas, P: Plotter>(session: &mut Session<C, P>) {
    log::info!("Self test: tracing the canvas border");

    session.lift_pen();
    session.jump(Jump::TopLeft);
    session.lower_pen();
    for corner in [Jump::TopRight, Jump::BottomRight, Jump::BottomLeft, Jump::TopLeft] {
        session.jump(corner);
    }
    session.jump(Jump::Home);
}

#[cfg(test)]
mod tests {
    use super::*;
    use etch_library::canvas::Sketch;
    use etch_library::keys::HeldKeys;
    use etch_library::pen::PenState;
    use etch_library::planner::{Bounds, Planner, Position};
    use etch_library::plotter::PlotterDevice;
    use etch_library::preset::ControllerPreset;

    #[test]
    fn traces_exactly_the_border() {
        let mut session = Session::new(
            ControllerPreset::bcr2000(),
            Planner::new(Bounds::from_window(600, 450)),
            Sketch::new(600, 450),
            PlotterDevice::disconnected(),
            HeldKeys::new(),
        );
        session.start();
        self_test(&mut session);

        let raster = session.canvas().raster();
        assert_eq!(raster.count(), 2 * 601 + 2 * 451 - 4);
        assert!(raster.get(0, 0) && raster.get(600, 450));
        assert!(!raster.get(300, 225));
        assert_eq!(session.pen_state(), PenState::Up);
        assert_eq!(session.position(), Position::new(-300.0, 225.0));
    }
}
