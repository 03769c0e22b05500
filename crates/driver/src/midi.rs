use std::sync::mpsc::{self, Receiver, Sender};

use etch_library::event::ControlChange;
use midir::{Ignore, MidiInput, MidiInputConnection};

use crate::settings::Settings;

/// Control changes pushed by the midir callback thread, drained once per tick.
pub(crate) struct MidiFeed {
    port_name: Option<String>,
    receiver: Receiver<ControlChange>,
    _connection: Option<MidiInputConnection<Sender<ControlChange>>>,
}

pub(crate) fn list_ports(client_name: &str) -> Result<Vec<String>, midir::InitError> {
    let input = MidiInput::new(client_name)?;
    Ok(input
        .ports()
        .iter()
        .filter_map(|port| input.port_name(port).ok())
        .collect())
}

impl MidiFeed {
    /// Opens the configured input port. Without one the feed stays empty and
    /// the keyboard still drives the plotter.
    pub(crate) fn open(settings: &Settings) -> Self {
        let (sender, receiver) = mpsc::channel();
        let (port_name, connection) = match connect(settings, sender) {
            Ok((name, connection)) => {
                log::info!("Using MIDI input: {name}");
                (Some(name), Some(connection))
            }
            Err(e) => {
                log::warn!("No MIDI input ({e}), continuing with keyboard only");
                (None, None)
            }
        };
        Self {
            port_name,
            receiver,
            _connection: connection,
        }
    }

    pub(crate) fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Everything received since the last call, without blocking.
    pub(crate) fn drain(&self) -> Vec<ControlChange> {
        self.receiver.try_iter().collect()
    }
}

fn connect(
    settings: &Settings,
    sender: Sender<ControlChange>,
) -> Result<(String, MidiInputConnection<Sender<ControlChange>>), String> {
    let mut input = MidiInput::new(&settings.client_name).map_err(|e| e.to_string())?;
    input.ignore(Ignore::All);

    let ports = input.ports();
    let port = ports
        .iter()
        .find(|port| {
            input
                .port_name(port)
                .map(|name| name.contains(&settings.midi_port))
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            if settings.midi_port.is_empty() {
                "no MIDI input ports found".to_string()
            } else {
                format!("no MIDI input port matching {:?}", settings.midi_port)
            }
        })?;
    let name = input.port_name(port).map_err(|e| e.to_string())?;

    let connection = input
        .connect(
            port,
            &format!("{} In", settings.client_name),
            |_timestamp, message, sender| {
                log::debug!("MIDI {message:02x?}");
                if let Some(event) = ControlChange::parse(message) {
                    // the receiver only goes away during shutdown
                    let _ = sender.send(event);
                }
            },
            sender,
        )
        .map_err(|e| e.to_string())?;

    Ok((name, connection))
}
