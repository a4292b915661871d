// Backends audio - destination des messages note on/off

pub mod backend;
pub mod midi_out;
pub mod recording;
pub mod synth;

pub use backend::{AudioBackend, AudioError, BackendStatus, SilentBackend};
pub use midi_out::MidiOutBackend;
pub use recording::RecordingBackend;
pub use synth::SynthBackend;

use crate::synth::Waveform;

/// Open the configured output, falling back to a silent backend.
///
/// With a port name the notes go to that MIDI output; without one the
/// built-in synth plays them on the default audio device. The failure is
/// reported once here; afterwards the instrument keeps running with visual
/// and log feedback only.
pub fn connect_or_silent(
    port_name: Option<&str>,
    channel: u8,
    waveform: Waveform,
) -> (Box<dyn AudioBackend>, BackendStatus) {
    let opened: Result<Box<dyn AudioBackend>, AudioError> = match port_name {
        Some(name) => MidiOutBackend::connect(name, channel)
            .map(|backend| Box::new(backend) as Box<dyn AudioBackend>),
        None => SynthBackend::start(waveform)
            .map(|backend| Box::new(backend) as Box<dyn AudioBackend>),
    };

    match opened {
        Ok(backend) => {
            let status = BackendStatus::Connected {
                output: backend.describe(),
            };
            (backend, status)
        }
        Err(e) => {
            log::warn!("Audio backend unavailable, running silent: {}", e);
            let status = BackendStatus::Silent {
                reason: e.to_string(),
            };
            (Box::new(SilentBackend), status)
        }
    }
}
