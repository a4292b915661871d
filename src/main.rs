// Tonepad - point d'entrée : config, backend audio, fenêtre

use tonepad::audio;
use tonepad::config::{self, InstrumentConfig};
use tonepad::dispatch::{Dispatcher, NoteLog};
use tonepad::messaging::Notification;
use tonepad::midi::MidiDeviceManager;
use tonepad::ui::TonepadApp;

fn load_config(notifications: &mut Vec<Notification>) -> InstrumentConfig {
    let Some(path) = config::default_path() else {
        log::info!("No config directory on this platform, using defaults");
        return InstrumentConfig::default();
    };

    match InstrumentConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config {} rejected: {}", path.display(), e);
            notifications.push(Notification::config_ignored(&e));
            InstrumentConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut notifications = Vec::new();
    let config = load_config(&mut notifications);

    for device in MidiDeviceManager::new().list_output_ports() {
        log::info!("MIDI output available: {}", device.name);
    }

    let (backend, backend_status) = audio::connect_or_silent(
        config.midi_output_port.as_deref(),
        config.midi_channel,
        config.waveform,
    );

    // Config validée au chargement, défauts toujours valides
    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(e) => {
            log::error!("Invalid key set: {}", e);
            return;
        }
    };
    let dispatcher = Dispatcher::new(
        registry,
        config.dispatch_settings(),
        backend,
        NoteLog::new(),
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 350.0])
            .with_title("Tonepad"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Tonepad",
        native_options,
        Box::new(|_cc| {
            Ok(Box::new(TonepadApp::new(
                dispatcher,
                backend_status,
                notifications,
            )))
        }),
    ) {
        log::error!("Window closed with error: {}", e);
    }
}
