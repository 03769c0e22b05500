use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use crate::settings::Settings;

// EiBotBoard (AxiDraw controller) USB ids
const EBB_VID: u16 = 0x04d8;
const EBB_PID: u16 = 0xfd92;

fn is_ebb(port_type: &SerialPortType) -> bool {
    matches!(port_type, SerialPortType::UsbPort(info) if info.vid == EBB_VID && info.pid == EBB_PID)
}

pub(crate) fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|port| {
                if is_ebb(&port.port_type) {
                    format!("{} (EiBotBoard)", port.port_name)
                } else {
                    port.port_name
                }
            })
            .collect(),
        Err(e) => {
            log::warn!("Can't enumerate serial ports: {e}");
            Vec::new()
        }
    }
}

fn find_ebb() -> Option<String> {
    serialport::available_ports()
        .ok()?
        .into_iter()
        .find(|port| is_ebb(&port.port_type))
        .map(|port| port.port_name)
}

/// Opens the plotter link. `None` means visual-only mode.
pub(crate) fn open(settings: &Settings) -> Option<Box<dyn SerialPort>> {
    let path = if settings.serial_port.is_empty() {
        match find_ebb() {
            Some(path) => path,
            None => {
                log::warn!("No plotter found, running visual only");
                return None;
            }
        }
    } else {
        settings.serial_port.clone()
    };

    // USB CDC, the baud rate is ignored by the board
    match serialport::new(path.as_str(), 115200)
        .timeout(Duration::from_secs(2))
        .open()
    {
        Ok(port) => {
            log::info!("Plotter connected on {path}");
            Some(port)
        }
        Err(e) => {
            log::warn!("Can't open plotter on {path}: {e}, running visual only");
            None
        }
    }
}
