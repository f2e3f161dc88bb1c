//! Voice: one unison channel, a tuned delay line closed into a feedback loop.
//!
//! Per sample the voice turns its pitch into a delay length, derives a
//! decay coefficient from that length, writes `input + previous * g` into
//! its buffer, reads the delayed sample back, runs it through the tone
//! filter and the DC blocker, and saturates the result. The saturated
//! sample is both the voice output and next sample's feedback memory.

use super::delay::DelayLine;
use super::engine::DerivedParams;
use super::filter::{Biquad, MAX_FREQUENCY, Response};
use super::saturate::saturate;
use super::utils::voct_to_hz;

/// Highest pitch a voice may reach, in octaves above C4.
pub const MAX_PITCH: f32 = 8.0;

/// Decay knob at full scale maps to this T60-equivalent time.
pub const MAX_DECAY_SECONDS: f32 = 60.0;

/// Bound on the loop coefficient; keeps the feedback strictly damped.
pub const MAX_FEEDBACK_COEFFICIENT: f32 = 0.99999;

/// Hard limit on the voice output after saturation.
pub const OUTPUT_LIMIT: f32 = 2.0;

const DC_BLOCK_Q: f32 = 0.701;
const DC_BLOCK_MIN_HZ: f32 = 10.0;

/// Per-voice targets resolved by the engine's spread distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceTarget {
    /// Pitch in V/oct (0 = C4) before clamping.
    pub tuning: f32,
    /// Tone filter cutoff as a fraction of the sample rate.
    pub filter_freq: f32,
}

/// Loop coefficient for a T60-style decay.
///
/// `decay` is the combined decay control (knob + attenuated CV). Its fourth
/// power scales to `[0, 60]` seconds; the coefficient is the per-pass gain
/// that reaches -60 dB after that time, signed by `sign` and clamped below
/// unit magnitude.
#[inline]
pub fn decay_coefficient(decay: f32, delay_samples: f32, sample_rate: f32, sign: f32) -> f32 {
    let seconds = MAX_DECAY_SECONDS * decay.powi(4);
    let passes = sample_rate * seconds.abs() / delay_samples;
    let g = 10.0_f32.powf(-3.0 / passes) * sign;
    g.clamp(-MAX_FEEDBACK_COEFFICIENT, MAX_FEEDBACK_COEFFICIENT)
}

/// A single delay-line voice.
#[derive(Debug, Clone)]
pub struct Voice {
    line: DelayLine,
    filter: Biquad,
    dc_block: Biquad,

    tuning: f32,
    frequency: f32,
    delay_samples: f32,
    coefficient: f32,
    /// Last saturated output, fed back on the next sample.
    previous: f32,
}

impl Voice {
    pub fn new(capacity: usize) -> Self {
        Voice {
            line: DelayLine::new(capacity),
            filter: Biquad::new(Response::Lowpass),
            dc_block: Biquad::new(Response::Highpass),
            tuning: 0.0,
            frequency: voct_to_hz(0.0),
            delay_samples: 0.0,
            coefficient: 0.0,
            previous: 0.0,
        }
    }

    /// Run one sample of the feedback loop and return the voice output.
    #[inline]
    pub fn process(&mut self, p: &DerivedParams, target: VoiceTarget) -> f32 {
        let sample_rate = p.sample_rate;

        self.tuning = target.tuning.clamp(p.lowest_pitch, MAX_PITCH);
        self.frequency = voct_to_hz(self.tuning);
        self.delay_samples = sample_rate / self.frequency;

        self.coefficient =
            decay_coefficient(p.decay, self.delay_samples, sample_rate, p.decay_sign);

        self.line.write(p.audio_in + self.previous * self.coefficient);

        let position = self.line.read_position(self.delay_samples + p.tracking_offset);
        let mut delayed = self.line.read(position, p.modes.interpolation);

        if let Some(response) = p.modes.filter_type.response() {
            self.filter.set_parameters(response, target.filter_freq, p.resonance, 1.0);
            delayed = self.filter.process(delayed);
        }

        let dc_hz = (self.frequency / 3.0).clamp(DC_BLOCK_MIN_HZ, sample_rate / 2.0);
        let dc_freq = (dc_hz / sample_rate).min(MAX_FREQUENCY);
        self.dc_block.set_parameters(Response::Highpass, dc_freq, DC_BLOCK_Q, 1.0);
        delayed = self.dc_block.process(delayed);

        let out = saturate(delayed * p.feedback_gain, p.modes.saturation)
            .clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
        self.previous = out;

        self.line.advance();
        out
    }

    /// Clear buffer, filters and feedback memory.
    pub fn reset(&mut self) {
        self.line.clear();
        self.filter.reset();
        self.dc_block.reset();
        self.previous = 0.0;
        self.coefficient = 0.0;
    }

    /// Clamped pitch used on the last processed sample, in V/oct.
    pub fn tuning(&self) -> f32 {
        self.tuning
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn delay_samples(&self) -> f32 {
        self.delay_samples
    }

    pub fn feedback_coefficient(&self) -> f32 {
        self.coefficient
    }

    pub fn last_output(&self) -> f32 {
        self.previous
    }

    pub fn write_pos(&self) -> usize {
        self.line.write_pos()
    }

    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }
}
