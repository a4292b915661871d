// Définition du trait AudioBackend

use crate::instrument::Note;
use thiserror::Error;

/// Erreurs à l'ouverture du backend audio.
///
/// Only surfaced at startup; once the instrument runs, backend problems are
/// logged and swallowed.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoOutputDevice,

    #[error("Audio configuration error: {0}")]
    StreamConfig(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Error in stream creation: {0}")]
    BuildStream(String),

    #[error("Error in stream start: {0}")]
    PlayStream(String),

    #[error("MIDI initialization failed: {0}")]
    MidiInit(String),

    #[error("MIDI output port '{0}' not found")]
    PortNotFound(String),

    #[error("Failed to connect to MIDI output: {0}")]
    MidiConnect(String),
}

/// Sink for note on/off messages.
///
/// Calls are fire-and-forget: implementations must not block and must not
/// fail. A note-off for a note that is not sounding is a no-op.
pub trait AudioBackend {
    fn note_on(&mut self, note: Note, velocity: u8);

    fn note_off(&mut self, note: Note);

    /// Description courte pour la barre de statut
    fn describe(&self) -> String;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn note_on(&mut self, note: Note, velocity: u8) {
        (**self).note_on(note, velocity)
    }

    fn note_off(&mut self, note: Note) {
        (**self).note_off(note)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Backend utilisé quand aucune sortie audio n'a pu être ouverte
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn note_on(&mut self, note: Note, _velocity: u8) {
        log::trace!("silent note on {}", note);
    }

    fn note_off(&mut self, note: Note) {
        log::trace!("silent note off {}", note);
    }

    fn describe(&self) -> String {
        "Silent".to_string()
    }
}

/// État du backend choisi au démarrage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Connected { output: String },
    Silent { reason: String },
}

impl BackendStatus {
    pub fn is_silent(&self) -> bool {
        matches!(self, BackendStatus::Silent { .. })
    }
}
