/// Sound engine: procedural 8-bit style cues via rodio.
///
/// Every `GameEvent` gets an in-memory WAV buffer generated at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::sim::event::GameEvent;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        cues: HashMap<GameEvent, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            let cues = GameEvent::ALL.iter()
                .map(|&event| (event, Arc::new(make_wav(&generate(event)))))
                .collect();

            Some(SoundEngine { _stream: stream, handle, cues })
        }

        pub fn play(&self, event: GameEvent) {
            let buf = match self.cues.get(&event) {
                Some(b) => b,
                None => return,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    fn generate(event: GameEvent) -> Vec<f32> {
        match event {
            GameEvent::Jump => gen_sweep(300.0, 900.0, 0.12, 0.25),
            GameEvent::Fire => gen_sweep(1400.0, 500.0, 0.08, 0.2),
            GameEvent::PiranhaFire => gen_sweep(700.0, 250.0, 0.1, 0.2),
            GameEvent::Hurt => gen_notes(&[(330.0, 0.06), (220.0, 0.1)], 0.3),
            GameEvent::Bonk => gen_thud(),
            GameEvent::PowerupAppears => gen_notes(&[(523.0, 0.05), (659.0, 0.05), (784.0, 0.05), (1047.0, 0.08)], 0.25),
            GameEvent::PowerupCollected => gen_notes(&[(1047.0, 0.045), (1319.0, 0.045), (1568.0, 0.08)], 0.25),
            GameEvent::Kick => gen_notes(&[(880.0, 0.03), (1760.0, 0.05)], 0.25),
            GameEvent::PlayerDied => gen_notes(&[(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.25)], 0.3),
            GameEvent::LevelFinished => gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], 0.3),
            GameEvent::GameWon => gen_notes(&[(784.0, 0.1), (1047.0, 0.1), (784.0, 0.1), (1047.0, 0.1), (1568.0, 0.4)], 0.3),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Note sequence with a square-ish timbre (sine + 3rd harmonic).
    fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = sample_count(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5) * 0.7;
                let wave = (t * freq * 2.0 * PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear pitch sweep with a fade out.
    fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * 2.0 * PI / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * volume
            })
            .collect()
    }

    /// Bonk: low tone mixed with a noise burst.
    fn gen_thud() -> Vec<f32> {
        let n = sample_count(0.09);
        let mut rng = SmallRng::seed_from_u64(12345);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * 150.0 * 2.0 * PI).sin();
                let noise: f32 = rng.gen_range(-1.0..1.0);
                (tone * 0.6 + noise * 0.4) * (1.0 - t).powf(0.8) * 0.35
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _event: crate::sim::event::GameEvent) {}
}
