mod midi;
mod self_test;
mod serial;
mod settings;
mod signals;
mod ui;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use etch_library::canvas::Sketch;
use etch_library::keys::HeldKeys;
use etch_library::plotter::{Plotter, PlotterDevice};
use etch_library::session::{ExitRequest, Session};
use ratatui::DefaultTerminal;

use crate::midi::MidiFeed;
use crate::self_test::self_test;
use crate::settings::Settings;
use crate::ui::{Command, Keyboard};

/// Upper bound on one tick when no key is pressed (~60 fps).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[clap(
    name = "MIDI Etch-a-Sketch plotter driver",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Args {
    #[clap(short, long, help = "Config file (see example_config.toml)")]
    config: Option<String>,

    #[clap(short, long, help = "Controller preset: bcr2000 or digitakt")]
    preset: Option<String>,

    #[clap(short, long, help = "Plotter serial port (auto-detected if omitted)")]
    serial_port: Option<String>,

    #[clap(short, long, help = "List MIDI inputs and serial ports, then exit")]
    list: bool,

    #[clap(long, help = "Trace the canvas border before starting")]
    self_test: bool,

    #[clap(short, long, help = "Debug logging, including every MIDI message")]
    verbose: bool,
}

fn init_logging(settings: &Settings, verbose: bool) -> std::io::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if !settings.log_file.is_empty() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn print_ports(settings: &Settings) {
    println!("MIDI inputs:");
    match midi::list_ports(&settings.client_name) {
        Ok(ports) if ports.is_empty() => println!("    (none)"),
        Ok(ports) => ports.iter().for_each(|p| println!("    {p}")),
        Err(e) => println!("    unavailable: {e}"),
    }
    println!("Serial ports:");
    let ports = serial::list_ports();
    if ports.is_empty() {
        println!("    (none)");
    }
    ports.iter().for_each(|p| println!("    {p}"));
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut settings = settings::load(args.config.as_deref().map(Path::new))?;
    if let Some(preset) = args.preset {
        settings.preset = preset;
        settings.controller = None;
    }
    if let Some(port) = args.serial_port {
        settings.serial_port = port;
    }
    settings.validate()?;

    if args.list {
        print_ports(&settings);
        return Ok(());
    }

    init_logging(&settings, args.verbose)?;
    log::info!("Running with settings: {settings:?}");

    let keys = HeldKeys::new();
    let exit = ExitRequest::new();
    if let Err(e) = signals::install(&exit) {
        log::warn!("Can't install signal handler, only the quit keys will shut down cleanly: {e}");
    }
    let plotter = PlotterDevice::new(serial::open(&settings), settings.plotter_options());
    let midi = MidiFeed::open(&settings);

    let mut session = Session::new(
        settings.controller_preset()?,
        settings.planner(),
        Sketch::new(settings.window_width, settings.window_height),
        plotter,
        keys.clone(),
    );
    session.start();
    if args.self_test {
        self_test(&mut session);
    }

    let mut terminal = ratatui::init();
    let result = {
        let mut keyboard = Keyboard::new(keys, exit.clone());
        main_loop(&mut terminal, &mut session, &mut keyboard, &midi, &exit)
    };
    ratatui::restore();

    session.shutdown();
    result?;
    Ok(())
}

fn main_loop<P: Plotter>(
    terminal: &mut DefaultTerminal,
    session: &mut Session<Sketch, P>,
    keyboard: &mut Keyboard,
    midi: &MidiFeed,
    exit: &ExitRequest,
) -> std::io::Result<()> {
    while !exit.is_requested() {
        for command in keyboard.poll(FRAME)? {
            match command {
                Command::TogglePen => {
                    let state = session.toggle_pen();
                    log::info!("Pen {state:?}");
                }
                Command::ClearCanvas => session.clear_canvas(),
            }
        }

        session.tick(midi.drain());
        keyboard.end_tick();

        terminal.draw(|frame| ui::render(frame, session, midi.port_name()))?;
    }
    Ok(())
}
