// Dispatcher d'entrée - transforme chaque activation en son, highlight et log

use super::scheduler::{ScheduledTask, Scheduler, Transition};
use super::sink::LogSink;
use crate::audio::AudioBackend;
use crate::instrument::{Color, Key, KeyLayout, Note, NoteRegistry};
use std::time::Duration;

/// Timing and appearance of one activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub sound_duration: Duration,
    pub highlight_duration: Duration,
    pub velocity: u8,
    pub idle_color: Color,
    pub highlight_color: Color,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            sound_duration: Duration::from_millis(250),
            highlight_duration: Duration::from_millis(150),
            velocity: 127,
            idle_color: Color::WHITE,
            highlight_color: Color::YELLOW,
        }
    }
}

/// Runtime state of one key, as the UI should render it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pub color: Color,
    /// La touche affiche la couleur de highlight. Ne se distingue de l'état
    /// repos que si les deux couleurs diffèrent, ce que la config impose.
    pub highlighted: bool,
    pub sounding: bool,
}

impl KeyState {
    fn idle(color: Color) -> Self {
        Self {
            color,
            highlighted: false,
            sounding: false,
        }
    }
}

/// Single-threaded activation pipeline.
///
/// Time is passed in by the caller as the elapsed time since the instrument
/// started. Every activation produces a subset of {log, sound, highlight};
/// nothing here fails.
///
/// Pending note-off and highlight-off tasks are independent: re-activating a
/// key does not cancel or merge the tasks of its earlier activations. Each
/// highlight-off restores the color captured when *its* activation happened,
/// so overlapping presses can leave a key showing an earlier highlight.
pub struct Dispatcher<A, L> {
    registry: NoteRegistry,
    settings: DispatchSettings,
    keys: Vec<KeyState>,
    scheduler: Scheduler,
    audio: A,
    log: L,
}

impl<A: AudioBackend, L: LogSink> Dispatcher<A, L> {
    pub fn new(registry: NoteRegistry, settings: DispatchSettings, audio: A, log: L) -> Self {
        let keys = registry
            .layout()
            .iter()
            .map(|_| KeyState::idle(settings.idle_color))
            .collect();

        Self {
            registry,
            settings,
            keys,
            scheduler: Scheduler::new(),
            audio,
            log,
        }
    }

    /// A specific key was clicked
    pub fn activate_by_pointer(&mut self, key: Key, now: Duration) {
        if !self.registry.layout().contains(key) {
            log::debug!("Ignoring pointer activation of unknown key {:?}", key);
            return;
        }
        self.process_activation(key, now);
    }

    /// A character was typed. Characters that match no key are dropped.
    pub fn activate_by_character(&mut self, ch: char, now: Duration) {
        match self.registry.layout().find(ch) {
            Some(key) => self.process_activation(key, now),
            None => log::trace!("Unmapped input {:?} dropped", ch),
        }
    }

    fn process_activation(&mut self, key: Key, now: Duration) {
        // Les timers échus avant cette entrée passent d'abord
        self.tick(now);

        self.log.append(&format!("{} ", key.label()));

        match self.registry.resolve_key(key) {
            Some(note) => self.sound(key, note, now),
            None => log::debug!("Key '{}' has no note, skipping sound", key.label()),
        }

        self.highlight(key, now);
    }

    fn sound(&mut self, key: Key, note: Note, now: Duration) {
        log::debug!("'{}' note on {} at {:?}", key.label(), note, now);
        self.audio.note_on(note, self.settings.velocity);
        self.keys[key.index()].sounding = true;
        self.scheduler
            .schedule(now, self.settings.sound_duration, Transition::NoteOff { note });
    }

    fn highlight(&mut self, key: Key, now: Duration) {
        let state = &mut self.keys[key.index()];
        let restore = state.color;
        state.color = self.settings.highlight_color;
        state.highlighted = true;

        self.scheduler.schedule(
            now,
            self.settings.highlight_duration,
            Transition::HighlightOff { key, restore },
        );
    }

    /// Fire every task due at or before `now`, earliest first.
    /// Returns the number of tasks fired.
    pub fn tick(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.apply(task);
            fired += 1;
        }
        fired
    }

    fn apply(&mut self, task: ScheduledTask) {
        match task.transition {
            Transition::NoteOff { note } => {
                log::trace!("note off {} at {:?}", note, task.fire_at);
                self.audio.note_off(note);
                if let Some(key) = self.registry.key_for_note(note) {
                    self.keys[key.index()].sounding = false;
                }
            }
            Transition::HighlightOff { key, restore } => {
                let state = &mut self.keys[key.index()];
                state.color = restore;
                state.highlighted = restore == self.settings.highlight_color;
            }
        }
    }

    /// When the next pending task is due
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn pending_tasks(&self) -> Vec<ScheduledTask> {
        self.scheduler.pending()
    }

    pub fn key_state(&self, key: Key) -> Option<KeyState> {
        if !self.registry.layout().contains(key) {
            return None;
        }
        self.keys.get(key.index()).copied()
    }

    pub fn key_color(&self, key: Key) -> Option<Color> {
        self.key_state(key).map(|state| state.color)
    }

    pub fn layout(&self) -> &KeyLayout {
        self.registry.layout()
    }

    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn log(&self) -> &L {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingBackend;
    use crate::dispatch::sink::NoteLog;
    use crate::midi::MidiEvent;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn dispatcher(base_pitch: Note) -> Dispatcher<RecordingBackend, NoteLog> {
        let layout = KeyLayout::new("AUGCT".chars()).unwrap();
        Dispatcher::new(
            NoteRegistry::new(layout, base_pitch),
            DispatchSettings::default(),
            RecordingBackend::new(0),
            NoteLog::new(),
        )
    }

    #[test]
    fn test_all_keys_start_idle() {
        let d = dispatcher(60);
        for key in d.layout().iter() {
            assert_eq!(d.key_state(key), Some(KeyState::idle(Color::WHITE)));
        }
        assert!(d.next_deadline().is_none());
    }

    #[test]
    fn test_activation_schedules_both_timers() {
        let mut d = dispatcher(60);
        d.activate_by_character('g', ms(1000));

        let pending = d.pending_tasks();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].fire_at, ms(1150));
        assert!(matches!(pending[0].transition, Transition::HighlightOff { .. }));
        assert_eq!(pending[1].fire_at, ms(1250));
        assert_eq!(pending[1].transition, Transition::NoteOff { note: 62 });
    }

    #[test]
    fn test_sounding_follows_note_off() {
        let mut d = dispatcher(60);
        let key = d.layout().find('A').unwrap();

        d.activate_by_pointer(key, ms(0));
        assert!(d.key_state(key).unwrap().sounding);

        d.tick(ms(249));
        assert!(d.key_state(key).unwrap().sounding);
        d.tick(ms(250));
        assert!(!d.key_state(key).unwrap().sounding);
    }

    #[test]
    fn test_unmapped_note_still_logs_and_highlights() {
        // 'C' and 'T' land above note 127
        let mut d = dispatcher(125);
        let key = d.layout().find('T').unwrap();

        d.activate_by_pointer(key, ms(0));

        assert_eq!(d.log().text(), "T ");
        assert!(d.audio().messages().is_empty());
        assert_eq!(d.key_color(key), Some(Color::YELLOW));
        assert_eq!(d.pending_tasks().len(), 1);

        d.tick(ms(150));
        assert_eq!(d.key_color(key), Some(Color::WHITE));
        assert!(d.audio().messages().is_empty());
    }

    #[test]
    fn test_foreign_key_is_ignored() {
        let mut d = dispatcher(60);
        let other = KeyLayout::new("XYZ".chars()).unwrap();

        d.activate_by_pointer(other.get(0).unwrap(), ms(0));

        assert_eq!(d.log().entries(), 0);
        assert!(d.audio().messages().is_empty());
        assert!(d.next_deadline().is_none());
    }

    #[test]
    fn test_activation_fires_overdue_timers_first() {
        let mut d = dispatcher(60);
        d.activate_by_character('a', ms(0));
        // Pas de tick entre les deux : l'entrée suivante fait avancer la boucle
        d.activate_by_character('u', ms(300));

        assert_eq!(
            d.audio().events(),
            vec![
                MidiEvent::NoteOn {
                    note: 60,
                    velocity: 127
                },
                MidiEvent::NoteOff { note: 60 },
                MidiEvent::NoteOn {
                    note: 61,
                    velocity: 127
                },
            ]
        );
        let a = d.layout().find('a').unwrap();
        assert_eq!(d.key_color(a), Some(Color::WHITE));
    }

    #[test]
    fn test_tick_reports_fired_count() {
        let mut d = dispatcher(60);
        d.activate_by_character('a', ms(0));
        d.activate_by_character('u', ms(0));

        assert_eq!(d.tick(ms(100)), 0);
        assert_eq!(d.tick(ms(150)), 2);
        assert_eq!(d.tick(ms(1000)), 2);
        assert_eq!(d.tick(ms(2000)), 0);
    }
}
