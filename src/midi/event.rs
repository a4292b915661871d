// Messages MIDI note on/off - format wire de la sortie

use crate::instrument::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { note: Note, velocity: u8 },
    NoteOff { note: Note },
}

const NOTE_OFF_STATUS: u8 = 0x80;
const NOTE_ON_STATUS: u8 = 0x90;

impl MidiEvent {
    /// Encode as a 3-byte channel voice message. Only the low nibble of
    /// `channel` is used.
    pub fn to_bytes(self, channel: u8) -> [u8; 3] {
        let channel = channel & 0x0F;
        match self {
            MidiEvent::NoteOn { note, velocity } => {
                [NOTE_ON_STATUS | channel, note & 0x7F, velocity & 0x7F]
            }
            MidiEvent::NoteOff { note } => [NOTE_OFF_STATUS | channel, note & 0x7F, 0],
        }
    }

    /// Parse a raw note message; anything else is `None`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let note = bytes[1];
        match bytes[0] & 0xF0 {
            NOTE_ON_STATUS => {
                let velocity = bytes[2];
                // Velocity 0 = Note Off
                if velocity == 0 {
                    Some(MidiEvent::NoteOff { note })
                } else {
                    Some(MidiEvent::NoteOn { note, velocity })
                }
            }
            NOTE_OFF_STATUS => Some(MidiEvent::NoteOff { note }),
            _ => None,
        }
    }
}
