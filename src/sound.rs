use fundsp::prelude::*;
use log::warn;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

const SAMPLE_RATE: u32 = 44_100;

/// Synthesized sound effects. Without an audio device every call is a no-op.
pub struct Sound {
    // Dropping the stream stops playback, so it lives as long as `Sound`.
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl Sound {
    pub fn open() -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                warn!("audio unavailable, playing silently: {err}");
                None
            }
        };
        Self { output }
    }

    pub fn flap(&self) {
        self.play(flap_samples());
    }

    pub fn crash(&self) {
        self.play(crash_samples());
    }

    pub fn high_score(&self) {
        self.play(high_score_samples());
    }

    fn play(&self, samples: Vec<f32>) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
                sink.detach(); // Play in background
            }
            Err(err) => warn!("failed to play sound: {err}"),
        }
    }
}

/// Short rising chirp.
fn flap_samples() -> Vec<f32> {
    let freq = lfo(|t: f64| 500.0 + 700.0 * (t / 0.08).min(1.0));
    let gain = lfo(|t: f64| 0.08 * (1.0 - (t / 0.1).min(1.0)));
    let mut sound = (freq >> sine::<f64>()) * gain;
    render(&mut sound, 0.1)
}

/// Sawtooth swept from 400Hz down to 80Hz while fading out.
fn crash_samples() -> Vec<f32> {
    let freq = lfo(|t: f64| 400.0 - 320.0 * (t / 0.4).min(1.0));
    let gain = lfo(|t: f64| 0.15 * (1.0 - (t / 0.5).min(1.0)));
    let mut sound = (freq >> saw()) * gain;
    render(&mut sound, 0.5)
}

/// Three rising square-wave notes, delayed so they follow the crash.
fn high_score_samples() -> Vec<f32> {
    let freq = lfo(|t| match t {
        t if t < 0.45 => 0.0,
        t if t < 0.55 => 660.0,
        t if t < 0.65 => 880.0,
        _ => 1320.0,
    });
    let gain = lfo(|t| if t < 0.45 { 0.0 } else { 0.06 });
    let mut sound = (freq >> square()) * gain;
    render(&mut sound, 0.8)
}

fn render(unit: &mut dyn AudioUnit, seconds: f64) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let len = (SAMPLE_RATE as f64 * seconds) as usize;
    (0..len).map(|_| unit.get_mono() as f32).collect()
}
