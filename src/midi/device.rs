// Découverte des ports de sortie MIDI

use midir::MidiOutput;

pub const CLIENT_NAME: &str = "Tonepad MIDI Output";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiDeviceInfo {
    pub id: String,
    pub name: String,
}

pub struct MidiDeviceManager;

impl MidiDeviceManager {
    pub fn new() -> Self {
        Self
    }

    /// Ports de sortie visibles, à copier dans `midi_output_port`
    pub fn list_output_ports(&self) -> Vec<MidiDeviceInfo> {
        let mut devices = Vec::new();

        let midi_out = match MidiOutput::new(CLIENT_NAME) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot scan MIDI outputs: {}", e);
                return devices;
            }
        };

        for (index, port) in midi_out.ports().iter().enumerate() {
            if let Ok(name) = midi_out.port_name(port) {
                devices.push(MidiDeviceInfo {
                    id: format!("midi_out_{}", index),
                    name,
                });
            }
        }

        devices
    }
}

impl Default for MidiDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}
