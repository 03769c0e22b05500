//! Per-device controller layouts.

use serde::Deserialize;

fn default_acceleration() -> f64 {
    1.0
}

fn default_max_speed() -> f64 {
    30.0
}

/// Maps logical plotter actions to MIDI controller numbers for one device.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ControllerPreset {
    pub x_control: u8,
    pub y_control: u8,
    pub pen_toggle_control: u8,
    pub home_control: u8,
    pub top_left_control: u8,
    pub top_right_control: u8,
    pub bottom_left_control: u8,
    pub bottom_right_control: u8,
    /// Only messages on this channel are honored. `None` accepts every channel.
    #[serde(default)]
    pub control_channel: Option<u8>,
    /// Buttons that behave like held arrow keys (value > 0 = pressed).
    #[serde(default)]
    pub left_button: Option<u8>,
    #[serde(default)]
    pub right_button: Option<u8>,
    #[serde(default)]
    pub up_button: Option<u8>,
    #[serde(default)]
    pub down_button: Option<u8>,
    #[serde(default = "default_acceleration")]
    pub x_acceleration: f64,
    #[serde(default = "default_acceleration")]
    pub y_acceleration: f64,
    #[serde(default = "default_max_speed")]
    pub max_x_speed: f64,
    #[serde(default = "default_max_speed")]
    pub max_y_speed: f64,
}

impl Default for ControllerPreset {
    fn default() -> Self {
        Self::bcr2000()
    }
}

impl ControllerPreset {
    /// Rotary-bank layout: two endless encoders and a row of buttons.
    pub fn bcr2000() -> Self {
        Self {
            x_control: 6,
            y_control: 2,
            pen_toggle_control: 40,
            home_control: 39,
            top_left_control: 71,
            top_right_control: 72,
            bottom_left_control: 79,
            bottom_right_control: 80,
            control_channel: Some(0),
            left_button: None,
            right_button: None,
            up_button: None,
            down_button: None,
            x_acceleration: default_acceleration(),
            y_acceleration: default_acceleration(),
            max_x_speed: default_max_speed(),
            max_y_speed: default_max_speed(),
        }
    }

    /// Drum-machine layout, listening on channel 10 (zero-based 9).
    pub fn digitakt() -> Self {
        Self {
            x_control: 74,
            y_control: 77,
            control_channel: Some(9),
            left_button: Some(48),
            right_button: Some(49),
            up_button: Some(50),
            down_button: Some(51),
            x_acceleration: 1.25,
            y_acceleration: 2.5,
            ..Self::bcr2000()
        }
    }

    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bcr2000" => Some(Self::bcr2000()),
            "digitakt" => Some(Self::digitakt()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let controls = [
            ("x_control", Some(self.x_control)),
            ("y_control", Some(self.y_control)),
            ("pen_toggle_control", Some(self.pen_toggle_control)),
            ("home_control", Some(self.home_control)),
            ("top_left_control", Some(self.top_left_control)),
            ("top_right_control", Some(self.top_right_control)),
            ("bottom_left_control", Some(self.bottom_left_control)),
            ("bottom_right_control", Some(self.bottom_right_control)),
            ("left_button", self.left_button),
            ("right_button", self.right_button),
            ("up_button", self.up_button),
            ("down_button", self.down_button),
        ];
        for (name, cc) in controls {
            if let Some(cc) = cc
                && cc >= 128
            {
                return Err(format!("{name} must be a controller number 0 to 127 (found {cc})"));
            }
        }

        if let Some(channel) = self.control_channel
            && channel >= 16
        {
            return Err(format!("control_channel must be 0 to 15 (found {channel})"));
        }

        for (name, accel) in [
            ("x_acceleration", self.x_acceleration),
            ("y_acceleration", self.y_acceleration),
        ] {
            if !accel.is_finite() || accel <= 0.0 {
                return Err(format!("{name} must be a positive number"));
            }
        }

        for (name, speed) in [
            ("max_x_speed", self.max_x_speed),
            ("max_y_speed", self.max_y_speed),
        ] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(format!("{name} must be a positive number"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_are_valid() {
        assert_eq!(ControllerPreset::bcr2000().validate(), Ok(()));
        assert_eq!(ControllerPreset::digitakt().validate(), Ok(()));
    }

    #[test]
    fn presets_differ_in_mapping_channel_and_acceleration() {
        let bcr = ControllerPreset::bcr2000();
        let dt = ControllerPreset::digitakt();
        assert_ne!(bcr.x_control, dt.x_control);
        assert_eq!(bcr.control_channel, Some(0));
        assert_eq!(dt.control_channel, Some(9));
        assert!(dt.y_acceleration > bcr.y_acceleration);
        assert_eq!(bcr.max_x_speed, 30.0);
    }

    #[test]
    fn named_lookup_ignores_case() {
        assert_eq!(ControllerPreset::named(" Digitakt"), Some(ControllerPreset::digitakt()));
        assert_eq!(ControllerPreset::named("launchpad"), None);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut preset = ControllerPreset::bcr2000();
        preset.home_control = 200;
        assert!(preset.validate().is_err());

        let mut preset = ControllerPreset::bcr2000();
        preset.control_channel = Some(16);
        assert!(preset.validate().is_err());

        let mut preset = ControllerPreset::bcr2000();
        preset.max_y_speed = 0.0;
        assert!(preset.validate().is_err());
    }
}
