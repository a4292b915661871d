// Synthé intégré - son par défaut, sans matériel MIDI

pub mod oscillator;
pub mod voice;

pub use oscillator::{Oscillator, Waveform, note_to_frequency};
pub use voice::{MAX_VOICES, VoiceBank};
