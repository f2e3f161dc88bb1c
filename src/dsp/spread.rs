//! Unison spread: distributes a pitch or filter offset across voices.
//!
//! With an odd voice count, voice 0 stays centred. The others take
//! alternating offsets from a symmetric table: even indices read
//! `HARMONIC_SPREAD[i]`, odd indices read the mirror entry
//! `HARMONIC_SPREAD[MAX_VOICES - i]`. In random mode each offset is weighted
//! by a fixed per-slot factor.

use crate::session::SpreadMode;

/// Maximum number of unison voices.
pub const MAX_VOICES: usize = 8;

/// Symmetric offset table, in units of the spread amount.
pub const HARMONIC_SPREAD: [f32; MAX_VOICES] = [-3.5, -2.5, -1.5, -0.5, 0.5, 1.5, 2.5, 3.5];

/// Per-slot weights applied in random mode.
pub const INHARMONIC_FACTOR: [f32; MAX_VOICES] = [
    0.8375, 0.1923, 0.5234, 0.6152, 0.4032, 0.9948, 0.2345, 0.7812,
];

/// Offset of voice `index` (of `active` voices) for a given spread `amount`.
#[inline]
pub fn spread_offset(index: usize, active: usize, amount: f32, mode: SpreadMode) -> f32 {
    if active % 2 == 1 && index == 0 {
        return 0.0;
    }

    let slot = if index % 2 == 0 { index } else { MAX_VOICES - index };
    let weight = match mode {
        SpreadMode::Even => 1.0,
        SpreadMode::Random => INHARMONIC_FACTOR[slot],
    };
    amount * HARMONIC_SPREAD[slot] * weight
}

/// Signed square: finer control near zero, full swing at ±1.
#[inline]
pub fn tuning_spread_curve(amount: f32) -> f32 {
    (amount * amount).copysign(amount)
}

/// Signed quarter-square for the filter axis.
#[inline]
pub fn filter_spread_curve(amount: f32) -> f32 {
    (0.25 * amount * amount).copysign(amount)
}
