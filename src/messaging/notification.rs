// Notifications de la barre de statut (audio, config)

use crate::audio::BackendStatus;
use crate::config::ConfigError;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Partie de l'instrument qui a émis la notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Audio,
    Config,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub message: String,
    pub timestamp: u64, // Timestamp Unix en millisecondes
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Notification {
    pub fn new(level: NotificationLevel, category: NotificationCategory, message: String) -> Self {
        Self {
            level,
            category,
            message,
            timestamp: now_millis(),
        }
    }

    /// Which output the notes go to, or why there is no sound
    pub fn for_backend(status: &BackendStatus) -> Self {
        match status {
            BackendStatus::Connected { output } => Self::new(
                NotificationLevel::Info,
                NotificationCategory::Audio,
                format!("Sound: {}", output),
            ),
            BackendStatus::Silent { reason } => Self::new(
                NotificationLevel::Warning,
                NotificationCategory::Audio,
                format!("No sound: {}", reason),
            ),
        }
    }

    /// The config file was rejected and the defaults are in use
    pub fn config_ignored(error: &ConfigError) -> Self {
        Self::new(
            NotificationLevel::Error,
            NotificationCategory::Config,
            format!("Config ignored, using defaults: {}", error),
        )
    }

    /// True when the notification is younger than `max_age_ms`
    pub fn is_recent(&self, max_age_ms: u64) -> bool {
        now_millis().saturating_sub(self.timestamp) < max_age_ms
    }
}
