//! Fractional-delay interpolation over a circular sample buffer.
//!
//! Every scheme gathers the same four neighbours `(i1 - 1, i1, i1 + 1, i1 + 2)`
//! wrapped modulo the buffer length, so the seam behaves exactly like the
//! interior.

/// Interpolation scheme used to read between stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// 4-point, 3rd-order Lagrange polynomial.
    Lagrange,
    /// Catmull-Rom cubic spline.
    CubicSpline,
    /// Parabola through `i1 - 1`, `i1`, `i1 + 1`.
    Quadratic,
    /// Nearest lower sample, no interpolation.
    None,
}

impl Interpolation {
    pub const ALL: [Interpolation; 5] = [
        Interpolation::Linear,
        Interpolation::Lagrange,
        Interpolation::CubicSpline,
        Interpolation::Quadratic,
        Interpolation::None,
    ];

    /// Persisted selector value (1-based).
    pub fn index(self) -> u8 {
        match self {
            Interpolation::Linear => 1,
            Interpolation::Lagrange => 2,
            Interpolation::CubicSpline => 3,
            Interpolation::Quadratic => 4,
            Interpolation::None => 5,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| i64::from(s.index()) == index)
    }

    pub fn label(self) -> &'static str {
        match self {
            Interpolation::Linear => "Linear",
            Interpolation::Lagrange => "Lagrange",
            Interpolation::CubicSpline => "Cubic Spline",
            Interpolation::Quadratic => "Quadratic",
            Interpolation::None => "No Interpolation",
        }
    }
}

/// Read `buffer` at a fractional `position` using `scheme`.
///
/// Any finite position is accepted; the integer part is wrapped into
/// `[0, buffer.len())` before indexing. `buffer` must not be empty.
#[inline]
pub fn interpolate(position: f32, buffer: &[f32], scheme: Interpolation) -> f32 {
    let len = buffer.len() as i64;
    let floor = position.floor();
    let x = position - floor;
    let i1 = (floor as i64).rem_euclid(len);

    let i0 = (i1 - 1).rem_euclid(len) as usize;
    let i2 = (i1 + 1).rem_euclid(len) as usize;
    let i3 = (i1 + 2).rem_euclid(len) as usize;
    let i1 = i1 as usize;

    let (y0, y1, y2, y3) = (buffer[i0], buffer[i1], buffer[i2], buffer[i3]);

    match scheme {
        Interpolation::Linear => linear(x, y1, y2),
        Interpolation::Lagrange => lagrange(x, y0, y1, y2, y3),
        Interpolation::CubicSpline => cubic_spline(x, y0, y1, y2, y3),
        Interpolation::Quadratic => quadratic(x, y0, y1, y2),
        Interpolation::None => y1,
    }
}

#[inline]
fn linear(x: f32, y1: f32, y2: f32) -> f32 {
    y1 + x * (y2 - y1)
}

/// Nodes sit at -1, 0, 1, 2 so that `x = 0` lands on `y1`.
#[inline]
fn lagrange(x: f32, y0: f32, y1: f32, y2: f32, y3: f32) -> f32 {
    let xp1 = x + 1.0;
    let xm1 = x - 1.0;
    let xm2 = x - 2.0;

    y0 * (x * xm1 * xm2) / -6.0
        + y1 * (xp1 * xm1 * xm2) / 2.0
        + y2 * (xp1 * x * xm2) / -2.0
        + y3 * (xp1 * x * xm1) / 6.0
}

#[inline]
fn cubic_spline(x: f32, y0: f32, y1: f32, y2: f32, y3: f32) -> f32 {
    let a = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
    let b = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c = -0.5 * y0 + 0.5 * y2;
    let d = y1;

    ((a * x + b) * x + c) * x + d
}

#[inline]
fn quadratic(x: f32, y0: f32, y1: f32, y2: f32) -> f32 {
    let a = 0.5 * (y0 - 2.0 * y1 + y2);
    let b = 0.5 * (y2 - y0);
    let c = y1;

    (a * x + b) * x + c
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const PERIOD: f32 = 64.0;

    fn sine_buffer(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * i as f32 / PERIOD).sin())
            .collect()
    }

    #[test]
    fn integer_positions_return_stored_sample() {
        let buf: Vec<f32> = (0..16).map(|i| (i * i) as f32 * 0.1 - 3.0).collect();
        for scheme in Interpolation::ALL {
            for i in 0..buf.len() {
                let got = interpolate(i as f32, &buf, scheme);
                assert!(
                    (got - buf[i]).abs() < 1e-5,
                    "{scheme:?} at {i}: expected {}, got {got}",
                    buf[i]
                );
            }
        }
    }

    #[test]
    fn reproduces_sinusoid_between_samples() {
        let buf = sine_buffer(256);
        let bounds = [
            (Interpolation::Linear, 2e-3),
            (Interpolation::Lagrange, 1e-4),
            (Interpolation::CubicSpline, 5e-4),
            (Interpolation::Quadratic, 1e-3),
        ];

        for (scheme, bound) in bounds {
            let mut worst = 0.0_f32;
            for step in 0..400 {
                let pos = 10.0 + step as f32 * 0.37;
                let expected = (2.0 * PI * pos / PERIOD).sin();
                worst = worst.max((interpolate(pos, &buf, scheme) - expected).abs());
            }
            assert!(worst < bound, "{scheme:?} error {worst} exceeds {bound}");
        }
    }

    #[test]
    fn nearest_truncates_to_lower_sample() {
        let buf = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(interpolate(1.9, &buf, Interpolation::None), 1.0);
    }

    #[test]
    fn wraps_at_buffer_seam() {
        let buf = [10.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let len = buf.len() as f32;

        for scheme in Interpolation::ALL {
            for pos in [0.0, len - 2.0, len - 1.0, 0.5, len - 0.5] {
                let got = interpolate(pos, &buf, scheme);
                assert!(got.is_finite(), "{scheme:?} at {pos} not finite");
            }
        }

        // Halfway between the last and first sample.
        let seam = interpolate(len - 0.5, &buf, Interpolation::Linear);
        assert!((seam - 8.5).abs() < 1e-6, "seam blend should be 8.5, got {seam}");
    }

    #[test]
    fn seam_matches_interior_for_rotated_buffer() {
        let base = sine_buffer(32);
        let mut rotated = base.clone();
        rotated.rotate_left(5);

        for scheme in Interpolation::ALL {
            // Position 30.25 in `rotated` is position 3.25 in `base`.
            let a = interpolate(30.25, &rotated, scheme);
            let b = interpolate(3.25, &base, scheme);
            assert!((a - b).abs() < 1e-6, "{scheme:?}: seam {a} vs interior {b}");
        }
    }

    #[test]
    fn out_of_range_positions_wrap() {
        let buf = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(interpolate(-1.0, &buf, Interpolation::None), 3.0);
        assert_eq!(interpolate(5.0, &buf, Interpolation::None), 1.0);
    }

    #[test]
    fn selector_indices_round_trip() {
        for scheme in Interpolation::ALL {
            assert_eq!(Interpolation::from_index(scheme.index().into()), Some(scheme));
        }
        assert_eq!(Interpolation::from_index(0), None);
        assert_eq!(Interpolation::from_index(6), None);
    }
}
