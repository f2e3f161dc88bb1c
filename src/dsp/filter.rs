//! Biquad filter stage: per-sample reconfigurable 2nd-order IIR.

use std::f32::consts::PI;

/// Lowest normalized frequency handed to a filter stage.
pub const MIN_FREQUENCY: f32 = 0.001;
/// Highest normalized frequency; at 0.5 the poles reach z = -1.
pub const MAX_FREQUENCY: f32 = 0.499;

/// Filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Lowpass,
    Bandpass,
    Highpass,
    Notch,
}

/// A biquad IIR filter (2nd order).
///
/// Implements the standard Direct Form II Transposed structure.
/// Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).
///
/// Frequency is normalized to the sample rate (`f / fs`), so the same
/// instance keeps working when the host changes rate. Configuration is
/// expected to change every sample; `set_parameters` recomputes the
/// coefficients immediately and does not touch the delay state.
#[derive(Debug, Clone)]
pub struct Biquad {
    response: Response,
    frequency: f32,
    q: f32,
    gain: f32,

    // Coefficients
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // State (Direct Form II Transposed)
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn new(response: Response) -> Self {
        let mut f = Biquad {
            response,
            frequency: 0.1,
            q: 0.707, // Butterworth
            gain: 1.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        };
        f.update_coefficients();
        f
    }

    /// Configure response, normalized frequency `(0, 0.5)`, resonance Q and
    /// linear passband gain, then recompute coefficients.
    #[inline]
    pub fn set_parameters(&mut self, response: Response, frequency: f32, q: f32, gain: f32) {
        self.response = response;
        self.frequency = frequency;
        self.q = q;
        self.gain = gain;
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let w0 = 2.0 * PI * self.frequency;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * self.q);

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        let (b0, b1, b2) = match self.response {
            Response::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            Response::Highpass => {
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0)
            }
            Response::Bandpass => (alpha, 0.0, -alpha),
            Response::Notch => (1.0, -2.0 * cos_w0, 1.0),
        };

        // Normalize by a0
        let norm = self.gain / a0;
        self.b0 = b0 * norm;
        self.b1 = b1 * norm;
        self.b2 = b2 * norm;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Process a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    pub fn response(&self) -> Response {
        self.response
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_state(f: &mut Biquad, input: f32, samples: usize) -> f32 {
        let mut output = 0.0;
        for _ in 0..samples {
            output = f.process(input);
        }
        output
    }

    fn peak_amplitude(f: &mut Biquad, freq: f32) -> f32 {
        let mut max_out = 0.0_f32;
        for i in 0..8000 {
            let input = (2.0 * PI * freq * i as f32).sin();
            let out = f.process(input);
            if i > 4000 {
                // skip transient
                max_out = max_out.max(out.abs());
            }
        }
        max_out
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = Biquad::new(Response::Lowpass);
        f.set_parameters(Response::Lowpass, 0.1, 0.707, 1.0);
        let output = steady_state(&mut f, 1.0, 1000);
        assert!((output - 1.0).abs() < 0.001, "Lowpass should pass DC, got {output}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut f = Biquad::new(Response::Highpass);
        f.set_parameters(Response::Highpass, 0.02, 0.701, 1.0);
        let output = steady_state(&mut f, 1.0, 2000);
        assert!(output.abs() < 0.001, "Highpass should block DC, got {output}");
    }

    #[test]
    fn lowpass_attenuates_high_freq() {
        let mut f = Biquad::new(Response::Lowpass);
        f.set_parameters(Response::Lowpass, 0.005, 0.707, 1.0);
        let amp = peak_amplitude(&mut f, 0.25);
        assert!(amp < 0.01, "Lowpass@0.005 should strongly attenuate fs/4, got {amp}");
    }

    #[test]
    fn notch_removes_center_frequency() {
        let mut f = Biquad::new(Response::Notch);
        f.set_parameters(Response::Notch, 0.05, 0.707, 1.0);
        let amp = peak_amplitude(&mut f, 0.05);
        assert!(amp < 0.01, "Notch should remove its center frequency, got {amp}");
    }

    #[test]
    fn bandpass_passes_center_frequency() {
        let mut f = Biquad::new(Response::Bandpass);
        f.set_parameters(Response::Bandpass, 0.05, 2.0, 1.0);
        let amp = peak_amplitude(&mut f, 0.05);
        assert!((amp - 1.0).abs() < 0.05, "Bandpass peak gain should be ~1, got {amp}");
    }

    #[test]
    fn gain_scales_passband() {
        let mut f = Biquad::new(Response::Lowpass);
        f.set_parameters(Response::Lowpass, 0.1, 0.707, 0.5);
        let output = steady_state(&mut f, 1.0, 1000);
        assert!((output - 0.5).abs() < 0.001, "Expected half gain, got {output}");
    }

    #[test]
    fn output_finite_under_per_sample_modulation() {
        let responses = [
            Response::Lowpass,
            Response::Bandpass,
            Response::Highpass,
            Response::Notch,
        ];
        for response in responses {
            let mut f = Biquad::new(response);
            for i in 0..20_000 {
                let freq = 0.001 + 0.498 * ((i as f32 * 0.013).sin() * 0.5 + 0.5);
                let q = 0.001 + 1.999 * ((i as f32 * 0.007).cos() * 0.5 + 0.5);
                f.set_parameters(response, freq, q, 1.0);
                let input = if i % 100 == 0 { 1.0 } else { 0.0 };
                let out = f.process(input);
                assert!(out.is_finite(), "{response:?} output not finite at sample {i}");
            }
        }
    }

    #[test]
    fn highpass_at_upper_bound_settles() {
        let mut f = Biquad::new(Response::Lowpass);
        f.set_parameters(Response::Highpass, MAX_FREQUENCY, 0.701, 1.0);
        assert_eq!(f.response(), Response::Highpass);
        assert_eq!(f.frequency(), MAX_FREQUENCY);

        f.process(1.0);
        let mut tail = 0.0_f32;
        for i in 0..20_000 {
            let out = f.process(0.0);
            if i >= 10_000 {
                tail = tail.max(out.abs());
            }
        }
        assert!(tail < 1e-6, "impulse still ringing: {tail}");
    }

    #[test]
    fn reset_clears_state() {
        let mut f = Biquad::new(Response::Lowpass);
        steady_state(&mut f, 1.0, 100);
        f.reset();
        assert_eq!(f.process(0.0), 0.0);
    }
}
