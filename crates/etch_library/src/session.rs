//! Application context: everything one tick needs, built once at startup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::canvas::Canvas;
use crate::event::ControlChange;
use crate::interpreter::Interpreter;
use crate::keys::HeldKeys;
use crate::pen::{Pen, PenState};
use crate::planner::{Jump, Plan, Planner, Position};
use crate::plotter::Plotter;
use crate::preset::ControllerPreset;

/// Exit request that can be raised from any thread (key handler, signal
/// handler, MIDI callback). Raising it more than once has no extra effect.
#[derive(Debug, Clone, Default)]
pub struct ExitRequest {
    flag: Arc<AtomicBool>,
}

impl ExitRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct Session<C: Canvas, P: Plotter> {
    interpreter: Interpreter,
    planner: Planner,
    pen: Pen,
    cursor: Position,
    canvas: C,
    plotter: P,
    keys: HeldKeys,
    shut_down: bool,
}

impl<C: Canvas, P: Plotter> Session<C, P> {
    pub fn new(
        preset: ControllerPreset,
        planner: Planner,
        canvas: C,
        plotter: P,
        keys: HeldKeys,
    ) -> Self {
        Self {
            interpreter: Interpreter::new(preset),
            planner,
            pen: Pen::new(),
            cursor: Position::default(),
            canvas,
            plotter,
            keys,
            shut_down: false,
        }
    }

    pub fn position(&self) -> Position {
        self.cursor
    }

    pub fn pen_state(&self) -> PenState {
        self.pen.state()
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn plotter(&self) -> &P {
        &self.plotter
    }

    /// Blank canvas, pen raised, cursor parked at home.
    pub fn start(&mut self) {
        self.canvas.clear();
        self.pen.lift(&mut self.canvas, &mut self.plotter);
        let home = self.planner.bounds().target(Jump::Home);
        self.move_to(home);
        log::info!(
            "Session started, plotter {}",
            if self.plotter.is_connected() { "connected" } else { "absent (visual only)" }
        );
    }

    /// One poll-compute-render cycle over the control changes received since
    /// the previous tick.
    pub fn tick<I>(&mut self, events: I) -> Plan
    where
        I: IntoIterator<Item = ControlChange>,
    {
        let update = self.interpreter.interpret(events);

        if update.pen_toggle {
            let state = self.pen.toggle(&mut self.canvas, &mut self.plotter);
            log::info!("Pen {state:?}");
        }

        let mut held = self.keys.snapshot();
        for direction in self.interpreter.held_buttons() {
            if !held.contains(direction) {
                held.push(*direction);
            }
        }

        let plan = self.planner.plan(&update, &held, self.pen.state());
        match plan {
            Plan::Idle => {}
            Plan::Jump(jump) => self.jump(jump),
            Plan::Move { heading, distance } => {
                let to = self.planner.advance(self.cursor, heading, distance);
                self.move_to(to);
            }
        }
        plan
    }

    /// Direct relative move by a number of steps, as a knob would request.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let heading = crate::planner::angle(dx, dy);
        let distance = (dx.abs() + dy.abs()) * self.planner.stride(self.pen.state());
        let to = self.planner.advance(self.cursor, heading, distance);
        self.move_to(to);
    }

    /// Absolute jump to a corner. Home raises the pen first; corners keep the
    /// pen as it is and so draw an edge when it is down.
    pub fn jump(&mut self, jump: Jump) {
        if jump == Jump::Home {
            self.pen.lift(&mut self.canvas, &mut self.plotter);
        }
        log::info!("Jump to {jump:?}");
        let target = self.planner.bounds().target(jump);
        self.move_to(target);
    }

    pub fn toggle_pen(&mut self) -> PenState {
        self.pen.toggle(&mut self.canvas, &mut self.plotter)
    }

    pub fn lift_pen(&mut self) -> PenState {
        self.pen.lift(&mut self.canvas, &mut self.plotter)
    }

    pub fn lower_pen(&mut self) -> PenState {
        self.pen.lower(&mut self.canvas, &mut self.plotter)
    }

    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
    }

    fn move_to(&mut self, pos: Position) {
        let pos = self.planner.bounds().clamp(pos);
        self.cursor = pos;
        self.canvas.draw_to(pos);
        let (x, y) = self.planner.to_millimeters(pos);
        match self.pen.state() {
            PenState::Down => self.plotter.draw_to(x, y),
            PenState::Up => self.plotter.travel_to(x, y),
        }
    }

    /// Lifts the pen, homes and releases the plotter. Runs at most once;
    /// failures are logged and the sequence carries on.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("Shutting down");

        self.pen.lift(&mut self.canvas, &mut self.plotter);
        self.plotter.home();
        if let Err(e) = self.plotter.disconnect() {
            log::warn!("Plotter disconnect failed: {e}");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl<C: Canvas, P: Plotter> Drop for Session<C, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
