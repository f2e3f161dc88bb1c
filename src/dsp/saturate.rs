//! Feedback saturation curves.
//!
//! Stateless waveshapers applied to the delayed signal after it has been
//! multiplied by the feedback gain. Every curve maps 0 to 0.

/// Nonlinear shaping applied inside the feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Saturation {
    #[default]
    Tanh,
    SoftClip,
    HardClip,
    Exponential,
    Sigmoid,
    Atan,
    Cubic,
    /// tanh above zero, rational curve below.
    Asymmetric,
    SoftExponential,
    Waveshaper,
    Sine,
}

impl Saturation {
    pub const ALL: [Saturation; 11] = [
        Saturation::Tanh,
        Saturation::SoftClip,
        Saturation::HardClip,
        Saturation::Exponential,
        Saturation::Sigmoid,
        Saturation::Atan,
        Saturation::Cubic,
        Saturation::Asymmetric,
        Saturation::SoftExponential,
        Saturation::Waveshaper,
        Saturation::Sine,
    ];

    /// Persisted selector value (1-based).
    pub fn index(self) -> u8 {
        match self {
            Saturation::Tanh => 1,
            Saturation::SoftClip => 2,
            Saturation::HardClip => 3,
            Saturation::Exponential => 4,
            Saturation::Sigmoid => 5,
            Saturation::Atan => 6,
            Saturation::Cubic => 7,
            Saturation::Asymmetric => 8,
            Saturation::SoftExponential => 9,
            Saturation::Waveshaper => 10,
            Saturation::Sine => 11,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| i64::from(s.index()) == index)
    }

    pub fn label(self) -> &'static str {
        match self {
            Saturation::Tanh => "tanh",
            Saturation::SoftClip => "soft clipping",
            Saturation::HardClip => "hard clipping",
            Saturation::Exponential => "exponential",
            Saturation::Sigmoid => "sigmoid",
            Saturation::Atan => "atan",
            Saturation::Cubic => "cubic",
            Saturation::Asymmetric => "asymmetric",
            Saturation::SoftExponential => "soft exponential",
            Saturation::Waveshaper => "waveshaper",
            Saturation::Sine => "sine",
        }
    }
}

const SIGMOID_SHARPNESS: f32 = 5.0;

/// Shape `x` with the selected curve.
#[inline]
pub fn saturate(x: f32, scheme: Saturation) -> f32 {
    match scheme {
        Saturation::Tanh => x.tanh(),
        Saturation::SoftClip => soft_clip(x),
        Saturation::HardClip => x.clamp(-1.0, 1.0),
        Saturation::Exponential => (1.0 - (-x.abs()).exp()) * if x > 0.0 { 1.0 } else { -1.0 },
        Saturation::Sigmoid => x / (1.0 + SIGMOID_SHARPNESS * x.abs()),
        Saturation::Atan => x.atan(),
        Saturation::Cubic => (x - x * x * x / 3.0).clamp(-5.0, 5.0),
        Saturation::Asymmetric => {
            if x > 0.0 {
                x.tanh()
            } else {
                x / (1.0 + x.abs())
            }
        }
        Saturation::SoftExponential => x / (1.0 + (-x).exp()),
        Saturation::Waveshaper => waveshaper(x),
        Saturation::Sine => x.sin(),
    }
}

#[inline]
fn soft_clip(x: f32) -> f32 {
    if x > 1.0 {
        return 1.0;
    }
    if x < -1.0 {
        return -1.0;
    }
    x - (x * x * x) / 3.0
}

/// `x - 0.5x² + 0.1x³` in Horner form, bounded to ±5.
#[inline]
fn waveshaper(x: f32) -> f32 {
    (x * (1.0 + x * (-0.5 + 0.1 * x))).clamp(-5.0, 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Input magnitude up to which each curve compresses monotonically,
    /// on the positive and negative side.
    fn knee(scheme: Saturation) -> (f32, f32) {
        match scheme {
            Saturation::Cubic => (1.0, 1.0),
            Saturation::SoftExponential => (10.0, 1.27),
            Saturation::Sine => (std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2),
            Saturation::Waveshaper => (3.9, 2.9),
            _ => (10.0, 10.0),
        }
    }

    #[test]
    fn zero_maps_to_zero() {
        for scheme in Saturation::ALL {
            assert_eq!(saturate(0.0, scheme), 0.0, "{scheme:?} must map 0 to 0");
        }
    }

    #[test]
    fn magnitude_non_decreasing_up_to_knee() {
        for scheme in Saturation::ALL {
            let (pos_knee, neg_knee) = knee(scheme);
            for (sign, limit) in [(1.0_f32, pos_knee), (-1.0, neg_knee)] {
                let mut prev = 0.0_f32;
                let steps = 1000;
                for i in 1..=steps {
                    let x = sign * limit * i as f32 / steps as f32;
                    let mag = saturate(x, scheme).abs();
                    assert!(
                        mag + 1e-6 >= prev,
                        "{scheme:?} not monotonic at x = {x}: {mag} < {prev}"
                    );
                    prev = mag;
                }
            }
        }
    }

    #[test]
    fn finite_for_extreme_inputs() {
        let probes = [
            f32::MAX,
            -f32::MAX,
            1e20,
            -1e20,
            1e6,
            -1e6,
            100.0,
            -100.0,
            f32::MIN_POSITIVE,
        ];
        for scheme in Saturation::ALL {
            for x in probes {
                let y = saturate(x, scheme);
                assert!(y.is_finite(), "{scheme:?}({x}) = {y}");
            }
        }
    }

    #[test]
    fn bounded_schemes_stay_in_unit_range() {
        let bounded = [
            Saturation::Tanh,
            Saturation::SoftClip,
            Saturation::HardClip,
            Saturation::Exponential,
            Saturation::Sigmoid,
            Saturation::Sine,
        ];
        for scheme in bounded {
            for i in -200..=200 {
                let x = i as f32 * 0.25;
                assert!(saturate(x, scheme).abs() <= 1.0, "{scheme:?}({x}) out of range");
            }
        }
    }

    #[test]
    fn asymmetric_uses_different_curves_per_side() {
        let pos = saturate(1.0, Saturation::Asymmetric);
        let neg = saturate(-1.0, Saturation::Asymmetric);
        assert!((pos - 1.0_f32.tanh()).abs() < 1e-6);
        assert!((neg + 0.5).abs() < 1e-6);
    }

    #[test]
    fn selector_indices_round_trip() {
        for scheme in Saturation::ALL {
            assert_eq!(Saturation::from_index(scheme.index().into()), Some(scheme));
        }
        assert_eq!(Saturation::from_index(12), None);
    }
}
