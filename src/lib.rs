// Tonepad - Exports de la bibliothèque pour le binaire et les tests d'intégration

pub mod audio;
pub mod config;
pub mod dispatch;
pub mod instrument;
pub mod messaging;
pub mod midi;
pub mod synth;
pub mod ui;

// Ré-exports des types les plus utilisés
pub use audio::{AudioBackend, BackendStatus, RecordingBackend, SilentBackend};
pub use config::{ConfigError, InstrumentConfig};
pub use dispatch::{DispatchSettings, Dispatcher, KeyState, LogSink, NoteLog};
pub use instrument::{Color, Key, KeyLayout, Note, NoteRegistry};
pub use midi::MidiEvent;
