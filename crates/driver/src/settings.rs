use std::path::Path;

use config::{Config, ConfigError};
use etch_library::planner::{Bounds, Planner};
use etch_library::plotter::PlotterOptions;
use etch_library::preset::ControllerPreset;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct Settings {
    /// Built-in controller layout: "bcr2000" or "digitakt".
    pub preset: String,
    /// Custom controller layout; overrides `preset` when present.
    pub controller: Option<ControllerPreset>,
    pub client_name: String,
    /// Substring of the MIDI input port to open. Empty picks the first port.
    pub midi_port: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Plotter serial device. Empty searches for an EiBotBoard by USB id.
    pub serial_port: String,
    /// Pen-up speed in mm/s.
    pub travel_speed: f64,
    /// Pen-down speed in mm/s.
    pub draw_speed: f64,
    pub pen_delay_ms: u32,
    /// Steps added per tick for each held arrow key.
    pub key_step: f64,
    pub pen_up_stride: f64,
    pub pen_down_stride: f64,
    /// Log destination. The terminal shows the canvas, so logs go to a file.
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        let plotter = PlotterOptions::default();
        Self {
            preset: "bcr2000".to_string(),
            controller: None,
            client_name: "Etch Plotter".to_string(),
            midi_port: "".to_string(),
            window_width: 500,
            window_height: 500,
            serial_port: "".to_string(),
            travel_speed: plotter.travel_speed,
            draw_speed: plotter.draw_speed,
            pen_delay_ms: plotter.pen_delay_ms,
            key_step: etch_library::planner::DEFAULT_KEY_STEP,
            pen_up_stride: etch_library::planner::DEFAULT_PEN_UP_STRIDE,
            pen_down_stride: etch_library::planner::DEFAULT_PEN_DOWN_STRIDE,
            log_file: "etch-driver.log".to_string(),
        }
    }
}

/// Defaults, overlaid with the config file if one is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut cfg = Config::builder();
    if let Some(path) = path {
        cfg = cfg.add_source(config::File::from(path));
    }
    cfg.build()?.try_deserialize()
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<(), String> {
        self.controller_preset()?.validate()?;

        if self.client_name.is_empty() {
            return Err("Client name must not be empty".to_string());
        }

        let sides = 2..=10_000;
        if !sides.contains(&self.window_width) || !sides.contains(&self.window_height) {
            return Err(format!(
                "Window must be between 2 and 10000 pixels on each side (found {}x{})",
                self.window_width, self.window_height
            ));
        }

        for (name, value) in [
            ("travel_speed", self.travel_speed),
            ("draw_speed", self.draw_speed),
            ("pen_up_stride", self.pen_up_stride),
            ("pen_down_stride", self.pen_down_stride),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive number"));
            }
        }

        if !self.key_step.is_finite() || self.key_step < 0.0 {
            return Err("key_step must not be negative".to_string());
        }

        Ok(())
    }

    pub(crate) fn controller_preset(&self) -> Result<ControllerPreset, String> {
        match &self.controller {
            Some(custom) => Ok(custom.clone()),
            None => ControllerPreset::named(&self.preset).ok_or_else(|| {
                format!(
                    "Unknown preset {:?} (expected bcr2000, digitakt or a [controller] table)",
                    self.preset
                )
            }),
        }
    }

    pub(crate) fn planner(&self) -> Planner {
        Planner::new(Bounds::from_window(self.window_width, self.window_height))
            .with_key_step(self.key_step)
            .with_strides(self.pen_up_stride, self.pen_down_stride)
    }

    pub(crate) fn plotter_options(&self) -> PlotterOptions {
        PlotterOptions {
            travel_speed: self.travel_speed,
            draw_speed: self.draw_speed,
            pen_delay_ms: self.pen_delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let settings = load(None).unwrap();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.controller_preset(), Ok(ControllerPreset::bcr2000()));
        assert_eq!(settings.planner().bounds(), &Bounds::from_window(500, 500));
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            r#"
preset = "digitakt"
window_width = 600
window_height = 450
draw_speed = 12.5
"#,
        );
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.controller_preset(), Ok(ControllerPreset::digitakt()));
        assert_eq!(settings.planner().bounds().max_x, 300.0);
        assert_eq!(settings.plotter_options().draw_speed, 12.5);
        assert_eq!(settings.client_name, "Etch Plotter");
    }

    #[test]
    fn custom_controller_table() {
        let file = write_config(
            r#"
[controller]
x_control = 16
y_control = 17
pen_toggle_control = 64
home_control = 65
top_left_control = 66
top_right_control = 67
bottom_left_control = 68
bottom_right_control = 69
control_channel = 3
y_acceleration = 2.0
"#,
        );
        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.validate(), Ok(()));
        let preset = settings.controller_preset().unwrap();
        assert_eq!(preset.x_control, 16);
        assert_eq!(preset.control_channel, Some(3));
        assert_eq!(preset.x_acceleration, 1.0);
        assert_eq!(preset.y_acceleration, 2.0);
        assert_eq!(preset.max_y_speed, 30.0);
        assert_eq!(preset.left_button, None);
    }

    #[test]
    fn rejects_bad_values() {
        let settings = Settings {
            preset: "launchpad".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            draw_speed: 0.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            window_width: 1,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
