// Synthé logiciel - sortie CPAL, notes transmises au callback via ringbuffer
//
// Le thread UI pousse des MidiEvent dans le ringbuffer (non bloquant) ;
// le callback audio les applique à la banque de voix avant de rendre le
// buffer. Tout le rendu se fait en f32 puis est converti au format du device.

use super::backend::{AudioBackend, AudioError};
use crate::instrument::Note;
use crate::midi::event::MidiEvent;
use crate::synth::{VoiceBank, Waveform};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

// Largement plus que ce que cinq touches peuvent produire entre deux callbacks
const EVENT_QUEUE_CAPACITY: usize = 256;

pub struct SynthBackend {
    _stream: Stream,
    event_tx: HeapProd<MidiEvent>,
    device_name: String,
    sample_rate: f32,
}

impl SynthBackend {
    /// Démarre le synthé sur le device de sortie par défaut
    pub fn start(waveform: Waveform) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::StreamConfig(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let (event_tx, event_rx) = HeapRb::<MidiEvent>::new(EVENT_QUEUE_CAPACITY).split();
        let voices = VoiceBank::new(waveform, sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, event_rx, voices)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, event_rx, voices)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, event_rx, voices)
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        log::info!(
            "Synth started on {}: {} Hz, {} channels, {:?}",
            device_name,
            sample_rate,
            channels,
            waveform
        );

        Ok(Self {
            _stream: stream,
            event_tx,
            device_name,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut event_rx: HeapCons<MidiEvent>,
        mut voices: VoiceBank,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // Pas d'allocation, pas d'I/O, pas de verrou
                    drain_events(&mut event_rx, &mut voices);

                    for frame in data.chunks_mut(channels) {
                        let sample = T::from_sample(voices.next_sample());
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = sample;
                        }
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))
    }

    fn push(&mut self, event: MidiEvent) {
        if self.event_tx.try_push(event).is_err() {
            log::warn!("Synth queue full, {:?} dropped", event);
        }
    }
}

/// Applique au synthé les événements en attente, dans l'ordre d'arrivée
fn drain_events(event_rx: &mut HeapCons<MidiEvent>, voices: &mut VoiceBank) {
    while let Some(event) = event_rx.try_pop() {
        match event {
            MidiEvent::NoteOn { note, velocity } => voices.note_on(note, velocity),
            MidiEvent::NoteOff { note } => voices.note_off(note),
        }
    }
}

impl AudioBackend for SynthBackend {
    fn note_on(&mut self, note: Note, velocity: u8) {
        self.push(MidiEvent::NoteOn { note, velocity });
    }

    fn note_off(&mut self, note: Note) {
        self.push(MidiEvent::NoteOff { note });
    }

    fn describe(&self) -> String {
        format!("Synth: {} ({} Hz)", self.device_name, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_events_reach_the_voices_in_order() {
        let (mut tx, mut rx) = HeapRb::<MidiEvent>::new(8).split();
        let mut voices = VoiceBank::new(Waveform::Sine, 48000.0);

        tx.try_push(MidiEvent::NoteOn {
            note: 62,
            velocity: 127,
        })
        .unwrap();
        tx.try_push(MidiEvent::NoteOn {
            note: 64,
            velocity: 127,
        })
        .unwrap();
        tx.try_push(MidiEvent::NoteOff { note: 62 }).unwrap();

        drain_events(&mut rx, &mut voices);

        assert!(!voices.is_held(62));
        assert!(voices.is_held(64));
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_full_queue_rejects_instead_of_blocking() {
        let (mut tx, _rx) = HeapRb::<MidiEvent>::new(1).split();

        assert!(tx.try_push(MidiEvent::NoteOff { note: 60 }).is_ok());
        assert!(tx.try_push(MidiEvent::NoteOff { note: 61 }).is_err());
    }
}
