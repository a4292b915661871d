// Sortie MIDI - pilote un synthé externe ou système via midir

use super::backend::{AudioBackend, AudioError};
use crate::instrument::Note;
use crate::midi::device::CLIENT_NAME;
use crate::midi::event::MidiEvent;
use midir::{MidiOutput, MidiOutputConnection};

pub struct MidiOutBackend {
    connection: MidiOutputConnection,
    channel: u8,
    port_name: String,
}

impl MidiOutBackend {
    /// Ouvre le port de sortie nommé `port_name`
    pub fn connect(port_name: &str, channel: u8) -> Result<Self, AudioError> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| AudioError::MidiInit(e.to_string()))?;

        let ports = midi_out.ports();
        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| name == port_name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| AudioError::PortNotFound(port_name.to_string()))?;

        let connection = midi_out
            .connect(port, "tonepad-output")
            .map_err(|e| AudioError::MidiConnect(e.to_string()))?;

        log::info!("MIDI output connected: {} (channel {})", port_name, channel);

        Ok(Self {
            connection,
            channel,
            port_name: port_name.to_string(),
        })
    }

    fn send(&mut self, event: MidiEvent) {
        let bytes = event.to_bytes(self.channel);
        if let Err(e) = self.connection.send(&bytes) {
            log::warn!("MIDI send failed for {:?}: {}", event, e);
        }
    }
}

impl AudioBackend for MidiOutBackend {
    fn note_on(&mut self, note: Note, velocity: u8) {
        self.send(MidiEvent::NoteOn { note, velocity });
    }

    fn note_off(&mut self, note: Note) {
        self.send(MidiEvent::NoteOff { note });
    }

    fn describe(&self) -> String {
        format!("MIDI: {}", self.port_name)
    }
}
