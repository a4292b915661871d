// Configuration de l'instrument - fichier RON, valeurs par défaut sinon

use crate::dispatch::DispatchSettings;
use crate::instrument::{Color, KeyLayout, LayoutError, MAX_NOTE, Note, NoteRegistry};
use crate::synth::Waveform;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Variable d'environnement qui remplace le chemin du fichier
pub const CONFIG_ENV_VAR: &str = "TONEPAD_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid key set: {0}")]
    Layout(#[from] LayoutError),

    #[error("Base pitch {0} is outside the MIDI range")]
    BasePitchOutOfRange(u8),

    #[error("MIDI channel {0} is outside 0-15")]
    ChannelOutOfRange(u8),

    #[error("Velocity {0} is outside 1-127")]
    VelocityOutOfRange(u8),

    #[error("{0} must be longer than 0 ms")]
    ZeroDuration(&'static str),

    #[error("Highlight color {0:?} is the same as the idle color")]
    IndistinctHighlight(Color),
}

/// Constantes réglables de l'instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Key labels in declaration order; the order sets the pitch offsets
    pub keys: String,
    pub base_pitch: Note,
    pub sound_duration_ms: u64,
    pub highlight_duration_ms: u64,
    pub velocity: u8,
    pub midi_channel: u8,
    /// Port MIDI de sortie ; synthé intégré si absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_output_port: Option<String>,
    pub waveform: Waveform,
    pub idle_color: Color,
    pub highlight_color: Color,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            keys: "AUGCT".to_string(),
            base_pitch: 60,
            sound_duration_ms: 250,
            highlight_duration_ms: 150,
            // The classic widget asked for 600, which MIDI clamps to 127
            velocity: 127,
            midi_channel: 0,
            midi_output_port: None,
            waveform: Waveform::Sine,
            idle_color: Color::WHITE,
            highlight_color: Color::YELLOW,
        }
    }
}

impl InstrumentConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Defaults when the file does not exist; errors only for a file that
    /// exists but cannot be read or is invalid.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout()?;

        if self.base_pitch > MAX_NOTE {
            return Err(ConfigError::BasePitchOutOfRange(self.base_pitch));
        }
        if self.midi_channel > 15 {
            return Err(ConfigError::ChannelOutOfRange(self.midi_channel));
        }
        if !(1..=127).contains(&self.velocity) {
            return Err(ConfigError::VelocityOutOfRange(self.velocity));
        }
        if self.sound_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("sound_duration_ms"));
        }
        if self.highlight_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("highlight_duration_ms"));
        }
        // Un highlight invisible rendrait la touche muette à l'écran
        if self.idle_color == self.highlight_color {
            return Err(ConfigError::IndistinctHighlight(self.highlight_color));
        }

        Ok(())
    }

    pub fn layout(&self) -> Result<KeyLayout, ConfigError> {
        Ok(KeyLayout::new(self.keys.chars())?)
    }

    pub fn registry(&self) -> Result<NoteRegistry, ConfigError> {
        Ok(NoteRegistry::new(self.layout()?, self.base_pitch))
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            sound_duration: Duration::from_millis(self.sound_duration_ms),
            highlight_duration: Duration::from_millis(self.highlight_duration_ms),
            velocity: self.velocity,
            idle_color: self.idle_color,
            highlight_color: self.highlight_color,
        }
    }
}

/// `$TONEPAD_CONFIG`, else `<config dir>/tonepad/config.ron`
pub fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("tonepad").join("config.ron"))
}
