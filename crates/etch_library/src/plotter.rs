//! Physical plotter driven over an EiBotBoard (EBB) serial link.
//!
//! Every command is a no-op when no board is attached, so the rest of the
//! program runs unchanged in visual-only mode.

use std::io::{self, Write};

/// Motor steps per millimetre at 16x microstepping.
pub const STEPS_PER_MM: f64 = 80.0;

pub trait Plotter {
    fn is_connected(&self) -> bool;
    /// Pen-up repositioning move, absolute millimetres from the origin.
    fn travel_to(&mut self, x: f64, y: f64);
    /// Pen-down mark-making move, absolute millimetres from the origin.
    fn draw_to(&mut self, x: f64, y: f64);
    fn pen_up(&mut self);
    fn pen_down(&mut self);
    /// Raise the pen and return to the origin.
    fn home(&mut self);
    fn disconnect(&mut self) -> crate::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotterOptions {
    /// mm/s with the pen raised
    pub travel_speed: f64,
    /// mm/s with the pen lowered
    pub draw_speed: f64,
    /// Servo settle time after a pen move
    pub pen_delay_ms: u32,
}

impl Default for PlotterOptions {
    fn default() -> Self {
        Self {
            travel_speed: 75.0,
            draw_speed: 40.0,
            pen_delay_ms: 0,
        }
    }
}

pub struct PlotterDevice<W: Write> {
    link: Option<W>,
    options: PlotterOptions,
    /// Current position in motor steps, (x, y)
    steps: (i64, i64),
}

impl PlotterDevice<io::Sink> {
    pub fn disconnected() -> Self {
        Self::new(None, PlotterOptions::default())
    }
}

impl<W: Write> PlotterDevice<W> {
    /// Wraps an optional link. A present link gets its motors enabled; if
    /// that fails the device starts out disconnected.
    pub fn new(link: Option<W>, options: PlotterOptions) -> Self {
        let mut device = Self {
            link,
            options,
            steps: (0, 0),
        };
        if device.link.is_some() {
            device.send("EM,1,1");
        }
        device
    }

    pub fn position_mm(&self) -> (f64, f64) {
        (
            self.steps.0 as f64 / STEPS_PER_MM,
            self.steps.1 as f64 / STEPS_PER_MM,
        )
    }

    pub fn link(&self) -> Option<&W> {
        self.link.as_ref()
    }

    fn write_command(link: &mut W, command: &str) -> io::Result<()> {
        link.write_all(command.as_bytes())?;
        link.write_all(b"\r")?;
        link.flush()
    }

    /// Sends one command; a failed write drops the link for the rest of the session.
    fn send(&mut self, command: &str) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        log::trace!("ebb <- {command}");
        if let Err(e) = Self::write_command(link, command) {
            log::warn!("Plotter write failed, continuing without it: {e}");
            self.link = None;
        }
    }

    fn move_to(&mut self, x: f64, y: f64, speed: f64) {
        if self.link.is_none() {
            return;
        }
        let target = (
            (x * STEPS_PER_MM).round() as i64,
            (y * STEPS_PER_MM).round() as i64,
        );
        let dx = target.0 - self.steps.0;
        let dy = target.1 - self.steps.1;
        if dx == 0 && dy == 0 {
            return;
        }

        let distance_mm = (dx as f64).hypot(dy as f64) / STEPS_PER_MM;
        let duration_ms = ((distance_mm / speed) * 1000.0).ceil().max(1.0) as u64;
        // the two motors drive x+y and x-y
        self.send(&format!("SM,{},{},{}", duration_ms, dx + dy, dx - dy));
        self.steps = target;
    }
}

impl<W: Write> Plotter for PlotterDevice<W> {
    fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    fn travel_to(&mut self, x: f64, y: f64) {
        log::debug!("Plotter travel to ({x:.2}, {y:.2})");
        self.move_to(x, y, self.options.travel_speed);
    }

    fn draw_to(&mut self, x: f64, y: f64) {
        log::debug!("Plotter draw to ({x:.2}, {y:.2})");
        self.move_to(x, y, self.options.draw_speed);
    }

    fn pen_up(&mut self) {
        self.send(&format!("SP,1,{}", self.options.pen_delay_ms));
    }

    fn pen_down(&mut self) {
        self.send(&format!("SP,0,{}", self.options.pen_delay_ms));
    }

    fn home(&mut self) {
        if self.link.is_some() {
            log::info!("Homing plotter");
        }
        self.pen_up();
        self.travel_to(0.0, 0.0);
    }

    fn disconnect(&mut self) -> crate::Result<()> {
        let Some(mut link) = self.link.take() else {
            return Ok(());
        };
        log::info!("Releasing plotter motors");
        Self::write_command(&mut link, "EM,0,0")?;
        Ok(())
    }
}
