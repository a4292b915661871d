// Backend d'enregistrement - capture les octets MIDI au lieu de les jouer

use super::backend::AudioBackend;
use crate::instrument::Note;
use crate::midi::event::MidiEvent;

/// Keeps every message it receives, encoded as it would go on the wire.
/// Useful for headless runs and for asserting on note traffic.
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    channel: u8,
    messages: Vec<[u8; 3]>,
}

impl RecordingBackend {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[[u8; 3]] {
        &self.messages
    }

    /// Recorded traffic decoded back into events
    pub fn events(&self) -> Vec<MidiEvent> {
        self.messages
            .iter()
            .filter_map(|bytes| MidiEvent::from_bytes(bytes))
            .collect()
    }
}

impl AudioBackend for RecordingBackend {
    fn note_on(&mut self, note: Note, velocity: u8) {
        self.messages
            .push(MidiEvent::NoteOn { note, velocity }.to_bytes(self.channel));
    }

    fn note_off(&mut self, note: Note) {
        self.messages
            .push(MidiEvent::NoteOff { note }.to_bytes(self.channel));
    }

    fn describe(&self) -> String {
        format!("Recording ({} messages)", self.messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_wire_bytes() {
        let mut backend = RecordingBackend::new(2);
        backend.note_on(62, 127);
        backend.note_off(62);

        assert_eq!(backend.messages(), &[[0x92, 62, 127], [0x82, 62, 0]]);
        assert_eq!(
            backend.events(),
            vec![
                MidiEvent::NoteOn {
                    note: 62,
                    velocity: 127
                },
                MidiEvent::NoteOff { note: 62 },
            ]
        );
    }

    #[test]
    fn test_note_on_with_zero_velocity_reads_back_as_note_off() {
        let mut backend = RecordingBackend::new(0);
        backend.note_on(60, 0);

        assert_eq!(backend.events(), vec![MidiEvent::NoteOff { note: 60 }]);
    }
}
