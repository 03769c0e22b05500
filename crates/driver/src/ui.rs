//! Terminal mirror of the plotter and keyboard input.

use std::io;
use std::time::Duration;

use etch_library::canvas::Sketch;
use etch_library::keys::{Direction, HeldKeys};
use etch_library::pen::PenState;
use etch_library::planner::Position;
use etch_library::plotter::Plotter;
use etch_library::session::{ExitRequest, Session};
use ratatui::Frame;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::{execute, terminal};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Stylize};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas as Surface, Points};
use ratatui::widgets::{Block, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    TogglePen,
    ClearCanvas,
}

/// Translates terminal key events into held directions, commands and exit requests.
///
/// Terminals that can't report key releases get one-tick taps instead: a
/// press (or auto-repeat) holds the key until the end of the current tick.
pub(crate) struct Keyboard {
    keys: HeldKeys,
    exit: ExitRequest,
    reports_releases: bool,
    taps: Vec<Direction>,
}

impl Keyboard {
    pub(crate) fn new(keys: HeldKeys, exit: ExitRequest) -> Self {
        let reports_releases = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        if !reports_releases {
            log::info!("Terminal doesn't report key releases, arrow keys act as taps");
        }
        Self {
            keys,
            exit,
            reports_releases,
            taps: Vec::new(),
        }
    }

    /// Waits up to `timeout` for input, then drains everything pending.
    pub(crate) fn poll(&mut self, timeout: Duration) -> io::Result<Vec<Command>> {
        let mut commands = Vec::new();
        let mut wait = timeout;
        while event::poll(wait)? {
            if let Event::Key(key) = event::read()?
                && let Some(command) = self.handle(key)
            {
                commands.push(command);
            }
            wait = Duration::ZERO;
        }
        Ok(commands)
    }

    pub(crate) fn handle(&mut self, key: KeyEvent) -> Option<Command> {
        let direction = match key.code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            match key.kind {
                KeyEventKind::Release => self.keys.release(direction),
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    self.keys.press(direction);
                    if !self.reports_releases && !self.taps.contains(&direction) {
                        self.taps.push(direction);
                    }
                }
            }
            return None;
        }

        if key.kind == KeyEventKind::Release {
            return None;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (_, KeyCode::Esc)
            | (_, KeyCode::Char('q')) => {
                log::info!("Exit requested from keyboard");
                self.exit.request();
                None
            }
            (_, KeyCode::Char(' ')) => Some(Command::TogglePen),
            (_, KeyCode::Char('c')) => Some(Command::ClearCanvas),
            _ => None,
        }
    }

    /// Releases keys that were only tapped this tick.
    pub(crate) fn end_tick(&mut self) {
        for direction in self.taps.drain(..) {
            self.keys.release(direction);
        }
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        if self.reports_releases {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
    }
}

/// Set pixels of the sketch, in canvas-centred coordinates.
fn sketch_points(sketch: &Sketch) -> Vec<(f64, f64)> {
    let raster = sketch.raster();
    let half_w = (raster.width() - 1) as f64 / 2.0;
    let half_h = (raster.height() - 1) as f64 / 2.0;
    raster
        .points()
        .map(|(col, row)| (col as f64 - half_w, half_h - row as f64))
        .collect()
}

fn status_line(
    position: Position,
    pen: PenState,
    plotter: bool,
    midi: Option<&str>,
) -> Line<'static> {
    Line::from(vec![
        Span::from(format!(" x {:>7.1}  y {:>7.1} ", position.x, position.y)).bold(),
        Span::from(format!(" pen {pen:?} ")),
        if plotter {
            " plotter ".green()
        } else {
            " visual only ".yellow()
        },
        Span::from(format!(" midi: {} ", midi.unwrap_or("none"))),
        " arrows move, space pen, c clear, q quit".dark_gray(),
    ])
}

pub(crate) fn render<P: Plotter>(
    frame: &mut Frame,
    session: &Session<Sketch, P>,
    midi: Option<&str>,
) {
    let [canvas_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let bounds = *session.planner().bounds();
    let points = sketch_points(session.canvas());
    let cursor = session.position();
    let cursor_color = match session.pen_state() {
        PenState::Down => Color::Red,
        PenState::Up => Color::Blue,
    };

    let surface = Surface::default()
        .block(Block::bordered().title(" Etch-a-Sketch "))
        .marker(Marker::Braille)
        .x_bounds([bounds.min_x, bounds.max_x])
        .y_bounds([bounds.min_y, bounds.max_y])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &points,
                color: Color::White,
            });
            ctx.draw(&Points {
                coords: &[(cursor.x, cursor.y)],
                color: cursor_color,
            });
        });
    frame.render_widget(surface, canvas_area);

    let status = status_line(
        cursor,
        session.pen_state(),
        session.plotter().is_connected(),
        midi,
    );
    frame.render_widget(Paragraph::new(status), status_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use etch_library::canvas::Canvas;

    fn keyboard(reports_releases: bool) -> (Keyboard, HeldKeys, ExitRequest) {
        let keys = HeldKeys::new();
        let exit = ExitRequest::new();
        let kb = Keyboard {
            keys: keys.clone(),
            exit: exit.clone(),
            reports_releases,
            taps: Vec::new(),
        };
        (kb, keys, exit)
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn press_and_release() {
        let (mut kb, keys, _) = keyboard(true);
        kb.handle(key(KeyCode::Left, KeyEventKind::Press));
        kb.end_tick();
        assert!(keys.is_held(Direction::Left));
        kb.handle(key(KeyCode::Left, KeyEventKind::Release));
        assert!(!keys.is_held(Direction::Left));
    }

    #[test]
    fn taps_without_release_reports() {
        let (mut kb, keys, _) = keyboard(false);
        kb.handle(key(KeyCode::Up, KeyEventKind::Press));
        kb.handle(key(KeyCode::Up, KeyEventKind::Repeat));
        assert!(keys.is_held(Direction::Up));
        kb.end_tick();
        assert!(!keys.is_held(Direction::Up));
    }

    #[test]
    fn commands_and_exit_keys() {
        let (mut kb, _, exit) = keyboard(true);
        assert_eq!(
            kb.handle(key(KeyCode::Char(' '), KeyEventKind::Press)),
            Some(Command::TogglePen)
        );
        assert_eq!(kb.handle(key(KeyCode::Char(' '), KeyEventKind::Release)), None);
        assert_eq!(
            kb.handle(key(KeyCode::Char('c'), KeyEventKind::Press)),
            Some(Command::ClearCanvas)
        );
        assert!(!exit.is_requested());
        kb.handle(key(KeyCode::Esc, KeyEventKind::Press));
        kb.handle(key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(exit.is_requested());
    }

    #[test]
    fn ctrl_c_requests_exit() {
        let (mut kb, _, exit) = keyboard(true);
        kb.handle(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(exit.is_requested());
    }

    #[test]
    fn points_are_canvas_centred() {
        let mut sketch = Sketch::new(4, 2);
        sketch.draw_to(Position::new(-2.0, 1.0));
        sketch.pen_down();
        sketch.draw_to(Position::new(-1.0, 1.0));
        assert_eq!(sketch_points(&sketch), vec![(-2.0, 1.0), (-1.0, 1.0)]);
    }
}
