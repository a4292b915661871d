// Banque de voix - une voix par note, enveloppe linéaire attaque/relâchement

use super::oscillator::{Oscillator, Waveform, note_to_frequency};
use crate::instrument::Note;

/// Voix pré-allouées ; au-delà, la plus ancienne est volée
pub const MAX_VOICES: usize = 8;

const ATTACK_MS: f32 = 5.0;
const RELEASE_MS: f32 = 40.0;
const MASTER_GAIN: f32 = 0.25;

#[derive(Debug, Clone)]
struct Voice {
    oscillator: Oscillator,
    note: Option<Note>,
    gate: bool,
    level: f32,
    peak: f32,
    age: u64,
}

impl Voice {
    fn new(waveform: Waveform, sample_rate: f32) -> Self {
        Self {
            oscillator: Oscillator::new(waveform, sample_rate),
            note: None,
            gate: false,
            level: 0.0,
            peak: 0.0,
            age: 0,
        }
    }
}

/// Note-keyed voice set rendered sample by sample in the audio callback.
///
/// A note-on for a note that already has a voice retriggers that voice; a
/// note-off releases it. A note-off for a note without a voice does nothing.
/// Nothing here allocates after construction.
#[derive(Debug, Clone)]
pub struct VoiceBank {
    voices: Vec<Voice>,
    attack_step: f32,
    release_step: f32,
    clock: u64,
}

impl VoiceBank {
    pub fn new(waveform: Waveform, sample_rate: f32) -> Self {
        let samples_per_ms = sample_rate / 1000.0;
        Self {
            voices: (0..MAX_VOICES)
                .map(|_| Voice::new(waveform, sample_rate))
                .collect(),
            attack_step: 1.0 / (ATTACK_MS * samples_per_ms).max(1.0),
            release_step: 1.0 / (RELEASE_MS * samples_per_ms).max(1.0),
            clock: 0,
        }
    }

    pub fn note_on(&mut self, note: Note, velocity: u8) {
        self.clock += 1;

        let index = self
            .voices
            .iter()
            .position(|v| v.note == Some(note))
            .or_else(|| self.voices.iter().position(|v| v.note.is_none()))
            .unwrap_or_else(|| self.oldest_voice());

        let voice = &mut self.voices[index];
        if voice.note != Some(note) {
            voice.oscillator.set_frequency(note_to_frequency(note));
            voice.oscillator.reset();
            voice.level = 0.0;
        }
        voice.note = Some(note);
        voice.gate = true;
        voice.peak = f32::from(velocity.min(127)) / 127.0;
        voice.age = self.clock;
    }

    pub fn note_off(&mut self, note: Note) {
        for voice in self.voices.iter_mut().filter(|v| v.note == Some(note)) {
            voice.gate = false;
        }
    }

    fn oldest_voice(&self) -> usize {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut mix = 0.0;

        for voice in self.voices.iter_mut() {
            if voice.note.is_none() {
                continue;
            }

            if voice.gate {
                voice.level = if voice.level < voice.peak {
                    (voice.level + self.attack_step).min(voice.peak)
                } else {
                    (voice.level - self.release_step).max(voice.peak)
                };
            } else {
                voice.level -= self.release_step;
                if voice.level <= 0.0 {
                    voice.level = 0.0;
                    voice.note = None;
                    continue;
                }
            }

            mix += voice.oscillator.next_sample() * voice.level;
        }

        (mix * MASTER_GAIN).clamp(-1.0, 1.0)
    }

    /// Voices still producing sound, release tails included
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.note.is_some()).count()
    }

    pub fn is_held(&self, note: Note) -> bool {
        self.voices.iter().any(|v| v.note == Some(note) && v.gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn render(bank: &mut VoiceBank, samples: usize) -> f32 {
        (0..samples).map(|_| bank.next_sample().abs()).fold(0.0, f32::max)
    }

    #[test]
    fn test_silent_without_notes() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        assert_eq!(render(&mut bank, 1000), 0.0);
        assert_eq!(bank.active_voices(), 0);
    }

    #[test]
    fn test_note_on_produces_sound() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        bank.note_on(62, 127);

        assert!(render(&mut bank, 2400) > 0.1);
        assert!(bank.is_held(62));
    }

    #[test]
    fn test_note_off_releases_to_silence() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        bank.note_on(60, 127);
        render(&mut bank, 2400);

        bank.note_off(60);
        assert!(!bank.is_held(60));
        // Relâchement de 40 ms = 1920 samples à 48 kHz
        render(&mut bank, 2000);
        assert_eq!(bank.active_voices(), 0);
        assert_eq!(render(&mut bank, 100), 0.0);
    }

    #[test]
    fn test_retrigger_reuses_voice() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        bank.note_on(61, 127);
        bank.note_on(61, 127);
        assert_eq!(bank.active_voices(), 1);

        // Le premier note-off coupe la note, le second ne fait rien
        bank.note_off(61);
        bank.note_off(61);
        render(&mut bank, 2000);
        assert_eq!(bank.active_voices(), 0);
    }

    #[test]
    fn test_unknown_note_off_is_noop() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        bank.note_on(64, 100);
        bank.note_off(70);
        assert!(bank.is_held(64));
    }

    #[test]
    fn test_oldest_voice_is_stolen() {
        let mut bank = VoiceBank::new(Waveform::Sine, SAMPLE_RATE);
        for note in 0..MAX_VOICES as u8 {
            bank.note_on(40 + note, 100);
        }
        bank.note_on(100, 100);

        assert_eq!(bank.active_voices(), MAX_VOICES);
        assert!(!bank.is_held(40));
        assert!(bank.is_held(41));
        assert!(bank.is_held(100));
    }

    #[test]
    fn test_output_is_bounded() {
        let mut bank = VoiceBank::new(Waveform::Square, SAMPLE_RATE);
        for note in 0..MAX_VOICES as u8 {
            bank.note_on(60 + note, 127);
        }
        for _ in 0..4800 {
            let sample = bank.next_sample();
            assert!((-1.0..=1.0).contains(&sample));
        }
    }
}
