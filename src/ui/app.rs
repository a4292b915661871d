// Fenêtre principale - afficheur, touches et barre de statut

use crate::audio::{AudioBackend, BackendStatus};
use crate::dispatch::{Dispatcher, NoteLog};
use crate::instrument::{Color, Key};
use crate::messaging::{Notification, NotificationLevel};
use crate::midi::{MidiDeviceInfo, MidiDeviceManager};
use eframe::egui;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub type InstrumentDispatcher = Dispatcher<Box<dyn AudioBackend>, NoteLog>;

const KEY_SIZE: egui::Vec2 = egui::vec2(100.0, 150.0);
const LABEL_COLOR: Color = Color::BLUE;
const DISPLAY_TEXT: Color = Color::GREEN;
const DISPLAY_BACKGROUND: Color = Color::BLACK;

fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

pub struct TonepadApp {
    dispatcher: InstrumentDispatcher,
    started: Instant,
    backend_status: BackendStatus,
    midi_device_manager: MidiDeviceManager,
    available_midi_outputs: Vec<MidiDeviceInfo>,
    notification_queue: VecDeque<Notification>,
    max_notifications: usize,
}

impl TonepadApp {
    pub fn new(
        dispatcher: InstrumentDispatcher,
        backend_status: BackendStatus,
        startup_notifications: Vec<Notification>,
    ) -> Self {
        let midi_device_manager = MidiDeviceManager::new();
        let available_midi_outputs = midi_device_manager.list_output_ports();

        let mut app = Self {
            dispatcher,
            started: Instant::now(),
            backend_status,
            midi_device_manager,
            available_midi_outputs,
            notification_queue: VecDeque::new(),
            max_notifications: 10,
        };

        for notification in startup_notifications {
            app.push_notification(notification);
        }
        let backend_notification = Notification::for_backend(&app.backend_status);
        app.push_notification(backend_notification);

        app
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notification_queue.push_back(notification);
        if self.notification_queue.len() > self.max_notifications {
            self.notification_queue.pop_front();
        }
    }

    /// Notifications de moins de 5 secondes, plus récentes en premier
    fn get_recent_notifications(&self) -> Vec<&Notification> {
        self.notification_queue
            .iter()
            .rev()
            .filter(|n| n.is_recent(5000))
            .take(3)
            .collect()
    }

    fn refresh_devices(&mut self) {
        self.available_midi_outputs = self.midi_device_manager.list_output_ports();
    }

    /// Caractères tapés → dispatcher
    fn handle_typed_input(&mut self, ctx: &egui::Context) {
        let typed: Vec<char> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.chars()),
                    _ => None,
                })
                .flatten()
                .collect()
        });

        for ch in typed {
            let now = self.now();
            self.dispatcher.activate_by_character(ch, now);
        }
    }

    fn draw_display(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(to_color32(DISPLAY_BACKGROUND))
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.set_min_height(50.0);
                let text = egui::RichText::new(self.dispatcher.log().text())
                    .monospace()
                    .strong()
                    .size(22.0)
                    .color(to_color32(DISPLAY_TEXT));
                ui.add(egui::Label::new(text).wrap());
            });
    }

    fn draw_keys(&mut self, ui: &mut egui::Ui) {
        let keys: Vec<Key> = self.dispatcher.layout().iter().collect();

        ui.horizontal(|ui| {
            for key in keys {
                let fill = self
                    .dispatcher
                    .key_color(key)
                    .unwrap_or(self.dispatcher.settings().idle_color);

                let label = egui::RichText::new(key.label().to_string())
                    .size(24.0)
                    .strong()
                    .color(to_color32(LABEL_COLOR));
                let button = egui::Button::new(label)
                    .fill(to_color32(fill))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::BLACK))
                    .min_size(KEY_SIZE);

                if ui.add(button).clicked() {
                    let now = self.now();
                    self.dispatcher.activate_by_pointer(key, now);
                }
            }
        });
    }

    fn draw_devices(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (status_text, status_color) = if self.backend_status.is_silent() {
                ("○", egui::Color32::GRAY)
            } else {
                ("●", egui::Color32::GREEN)
            };
            ui.colored_label(status_color, status_text);
            ui.label(self.dispatcher.audio().describe());

            if ui.button("🔄").on_hover_text("Refresh devices").clicked() {
                self.refresh_devices();
            }
        });

        ui.collapsing("MIDI outputs", |ui| {
            if self.available_midi_outputs.is_empty() {
                ui.label("No MIDI output available");
            }
            for device in &self.available_midi_outputs {
                ui.label(&device.name);
            }
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let recent_notifications = self.get_recent_notifications();

            if recent_notifications.is_empty() {
                ui.label("Ready");
                return;
            }

            for notification in recent_notifications {
                let (icon, color) = match notification.level {
                    NotificationLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 150, 255)),
                    NotificationLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 165, 0)),
                    NotificationLevel::Error => ("✖", egui::Color32::RED),
                };

                ui.colored_label(color, icon);
                ui.colored_label(color, &notification.message);
                ui.add_space(10.0);
            }
        });
    }
}

impl eframe::App for TonepadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.dispatcher.tick(self.now());
        self.handle_typed_input(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_display(ui);
            ui.add_space(20.0);
            self.draw_keys(ui);
            ui.add_space(20.0);
            ui.separator();
            self.draw_devices(ui);
        });

        // Réveil au prochain timer plutôt qu'un repaint continu
        if let Some(deadline) = self.dispatcher.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(self.now()));
        }
        // Les notifications disparaissent de la barre de statut
        if !self.get_recent_notifications().is_empty() {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}
