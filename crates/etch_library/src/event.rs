use midly::MidiMessage;
use midly::live::LiveEvent;

/// A decoded MIDI control-change message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    /// Zero-based MIDI channel (0..15)
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl ControlChange {
    pub fn new(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            channel,
            controller,
            value,
        }
    }

    /// Decodes a raw MIDI message. Anything other than a control change
    /// (notes, clock, sysex, garbage) yields `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match LiveEvent::parse(bytes).ok()? {
            LiveEvent::Midi {
                channel,
                message: MidiMessage::Controller { controller, value },
            } => Some(Self::new(channel.as_int(), controller.as_int(), value.as_int())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_change_with_channel() {
        assert_eq!(
            ControlChange::parse(&[0xB9, 74, 100]),
            Some(ControlChange::new(9, 74, 100))
        );
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(ControlChange::parse(&[0x90, 60, 100]), None);
        assert_eq!(ControlChange::parse(&[0xF8]), None);
    }
}
