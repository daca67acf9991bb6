//! Trigger clicks
//!
//! Each trigger row gets a short decaying sine so the pattern can be heard
//! without patching anything. Rows arrive over a ring buffer from the
//! firmware thread; the audio callback never blocks on it.

use std::f32::consts::TAU;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use meadow_seq::NUM_ROWS;
use rtrb::{Consumer, Producer, RingBuffer};

/// C major from C5 up to C6, one note per row.
const ROW_FREQS: [f32; NUM_ROWS] = [
    523.25, 587.33, 659.25, 698.46, 783.99, 880.00, 987.77, 1046.50,
];

/// Seconds for a click to fall by 60 dB
const DECAY_SECONDS: f32 = 0.12;
const CLICK_GAIN: f32 = 0.15;

/// Keeps the output stream alive. Dropping it stops the sound.
pub struct Clicks {
    _stream: cpal::Stream,
}

struct Voice {
    phase: f32,
    amp: f32,
}

struct ClickSynth {
    rows_rx: Consumer<usize>,
    voices: [Voice; NUM_ROWS],
    phase_step: [f32; NUM_ROWS],
    decay: f32,
}

impl ClickSynth {
    fn new(rows_rx: Consumer<usize>, sample_rate: f32) -> Self {
        Self {
            rows_rx,
            voices: std::array::from_fn(|_| Voice { phase: 0.0, amp: 0.0 }),
            phase_step: ROW_FREQS.map(|freq| freq / sample_rate),
            // reach 1e-3 after DECAY_SECONDS
            decay: (1e-3f32).powf(1.0 / (DECAY_SECONDS * sample_rate)),
        }
    }

    fn render(&mut self, data: &mut [f32], channels: usize) {
        while let Ok(row) = self.rows_rx.pop() {
            if let Some(voice) = self.voices.get_mut(row) {
                voice.phase = 0.0;
                voice.amp = 1.0;
            }
        }

        for frame in data.chunks_mut(channels) {
            let mut sample = 0.0;
            for (voice, step) in self.voices.iter_mut().zip(self.phase_step) {
                if voice.amp < 1e-4 {
                    continue;
                }
                sample += (voice.phase * TAU).sin() * voice.amp;
                voice.phase = (voice.phase + step).fract();
                voice.amp *= self.decay;
            }
            frame.fill(sample * CLICK_GAIN);
        }
    }
}

/// Open the default output device. The returned producer takes row
/// numbers to click.
pub fn start() -> EyreResult<(Clicks, Producer<usize>)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = usize::from(config.channels());
    log::info!(target: "audio", "output at {sample_rate} Hz, {channels} channels");

    let (rows_tx, rows_rx) = RingBuffer::<usize>::new(64);
    let mut synth = ClickSynth::new(rows_rx, sample_rate);

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| synth.render(data, channels),
            |err| log::error!(target: "audio", "stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    Ok((Clicks { _stream: stream }, rows_tx))
}
