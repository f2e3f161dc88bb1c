//! Small scalar helpers shared by the voice and engine code.

/// Reference pitch for 0 V/oct (middle C).
pub const FREQ_C4: f32 = 261.625_57;

/// Nominal modulation/audio voltage swing (±5 V).
pub const NOMINAL_VOLTAGE: f32 = 5.0;

/// Map a value from one range to another. If the input range is degenerate, returns `y0`.
#[inline]
pub fn map_range(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let denom = x1 - x0;
    if denom.abs() < f32::EPSILON {
        return y0;
    }
    (x - x0) * (y1 - y0) / denom + y0
}

/// Rescale a ±5 V signal to the normalized ±1 range.
#[inline]
pub fn cv_to_unit(volts: f32) -> f32 {
    map_range(volts, -NOMINAL_VOLTAGE, NOMINAL_VOLTAGE, -1.0, 1.0)
}

/// Rescale a normalized ±1 signal back to ±5 V.
#[inline]
pub fn unit_to_cv(x: f32) -> f32 {
    map_range(x, -1.0, 1.0, -NOMINAL_VOLTAGE, NOMINAL_VOLTAGE)
}

/// Convert V/oct (0 V = C4) to frequency in Hz.
#[inline]
pub fn voct_to_hz(voct: f32) -> f32 {
    FREQ_C4 * 2.0_f32.powf(voct)
}

/// Linear blend: `a` at `t = 0`, `b` at `t = 1`.
#[inline]
pub fn crossfade(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
