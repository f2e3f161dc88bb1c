//! Session state: the six selector values that persist with a patch.
//!
//! The live values sit in [`SharedModes`], six single-byte atomics that the
//! audio thread snapshots once per sample while a host thread flips them
//! through a [`ModeHandle`]. [`SessionState`] is the plain snapshot used for
//! save/load.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::dsp::filter::Response;
use crate::dsp::interpolate::Interpolation;
use crate::dsp::saturate::Saturation;
use crate::error::AlaeError;

// ── Selector enums ──────────────────────────────────────────

/// Active filter type, cycled 1..5 by the filter-type button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Lowpass,
    Bandpass,
    Highpass,
    Notch,
    Bypass,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::Lowpass,
        FilterType::Bandpass,
        FilterType::Highpass,
        FilterType::Notch,
        FilterType::Bypass,
    ];

    pub fn index(self) -> u8 {
        match self {
            FilterType::Lowpass => 1,
            FilterType::Bandpass => 2,
            FilterType::Highpass => 3,
            FilterType::Notch => 4,
            FilterType::Bypass => 5,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| i64::from(t.index()) == index)
    }

    /// Next type in the button cycle, wrapping bypass back to lowpass.
    pub fn next(self) -> Self {
        match self {
            FilterType::Lowpass => FilterType::Bandpass,
            FilterType::Bandpass => FilterType::Highpass,
            FilterType::Highpass => FilterType::Notch,
            FilterType::Notch => FilterType::Bypass,
            FilterType::Bypass => FilterType::Lowpass,
        }
    }

    /// Biquad response for this type; `None` when bypassed.
    pub fn response(self) -> Option<Response> {
        match self {
            FilterType::Lowpass => Some(Response::Lowpass),
            FilterType::Bandpass => Some(Response::Bandpass),
            FilterType::Highpass => Some(Response::Highpass),
            FilterType::Notch => Some(Response::Notch),
            FilterType::Bypass => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterType::Lowpass => "Lowpass",
            FilterType::Bandpass => "Bandpass",
            FilterType::Highpass => "Highpass",
            FilterType::Notch => "Notch",
            FilterType::Bypass => "Bypass",
        }
    }
}

/// How the spread amount is distributed over voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    Even,
    /// Offsets weighted by a fixed inharmonic factor per voice slot.
    #[default]
    Random,
}

impl SpreadMode {
    pub const ALL: [SpreadMode; 2] = [SpreadMode::Even, SpreadMode::Random];

    pub fn index(self) -> u8 {
        match self {
            SpreadMode::Even => 0,
            SpreadMode::Random => 1,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(SpreadMode::Even),
            1 => Some(SpreadMode::Random),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpreadMode::Even => "Even",
            SpreadMode::Random => "Random",
        }
    }
}

fn keytrack_from_index(index: i64) -> Option<bool> {
    match index {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

// ── Snapshot ────────────────────────────────────────────────

/// Snapshot of every persisted selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub filter_type: FilterType,
    pub keytrack: bool,
    pub saturation: Saturation,
    pub interpolation: Interpolation,
    pub tuning_spread: SpreadMode,
    pub filter_spread: SpreadMode,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            filter_type: FilterType::Lowpass,
            keytrack: true,
            saturation: Saturation::Tanh,
            interpolation: Interpolation::Linear,
            tuning_spread: SpreadMode::Random,
            filter_spread: SpreadMode::Random,
        }
    }
}

/// Flat key/value form written to the host's patch storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub filter_type: u8,
    pub keytrack: u8,
    pub saturation: u8,
    pub interpolation: u8,
    pub tuning_spread: u8,
    pub filter_spread: u8,
}

impl SessionState {
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            filter_type: self.filter_type.index(),
            keytrack: u8::from(self.keytrack),
            saturation: self.saturation.index(),
            interpolation: self.interpolation.index(),
            tuning_spread: self.tuning_spread.index(),
            filter_spread: self.filter_spread.index(),
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of plain integers always serializes.
        serde_json::to_string(&self.record()).unwrap_or_default()
    }

    /// Parse persisted text into its key/value map.
    pub fn parse_record(json: &str) -> Result<Map<String, Value>, AlaeError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Ok(map),
            _ => Err(AlaeError::NotAnObject),
        }
    }

    /// Overwrite the fields present in `record`.
    ///
    /// Missing keys leave their field unchanged. Values that are not a
    /// valid selector are skipped and returned as errors; the remaining
    /// keys are still applied. Each field also answers to the key name of
    /// the earlier patch format; when both are present the current name wins.
    pub fn apply_record(&mut self, record: &Map<String, Value>) -> Vec<AlaeError> {
        let mut rejected = Vec::new();
        let r = &mut rejected;

        apply_key(record, FILTER_TYPE_KEYS, FilterType::from_index, &mut self.filter_type, r);
        apply_key(record, KEYTRACK_KEYS, keytrack_from_index, &mut self.keytrack, r);
        apply_key(record, SATURATION_KEYS, Saturation::from_index, &mut self.saturation, r);
        apply_key(
            record,
            INTERPOLATION_KEYS,
            Interpolation::from_index,
            &mut self.interpolation,
            r,
        );
        apply_key(record, TUNING_SPREAD_KEYS, SpreadMode::from_index, &mut self.tuning_spread, r);
        apply_key(record, FILTER_SPREAD_KEYS, SpreadMode::from_index, &mut self.filter_spread, r);

        rejected
    }

    /// Restore from persisted text, keeping current values for anything
    /// missing or malformed. Never fails; problems are logged.
    pub fn restore(&mut self, json: &str) {
        let record = match Self::parse_record(json) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session record");
                return;
            }
        };

        for e in self.apply_record(&record) {
            warn!(error = %e, "skipping session value");
        }
        debug!(state = ?self, "session restored");
    }
}

// Current key first, then the earlier patch format's name.
const FILTER_TYPE_KEYS: [&str; 2] = ["filter_type", "a_type"];
const KEYTRACK_KEYS: [&str; 2] = ["keytrack", "a_keytrack"];
const SATURATION_KEYS: [&str; 2] = ["saturation", "a_sat_select"];
const INTERPOLATION_KEYS: [&str; 2] = ["interpolation", "InterpolationSelect"];
const TUNING_SPREAD_KEYS: [&str; 2] = ["tuning_spread", "a_tune_sprd_mode"];
const FILTER_SPREAD_KEYS: [&str; 2] = ["filter_spread", "a_fltr_sprd_mode"];

fn apply_key<T>(
    record: &Map<String, Value>,
    keys: [&'static str; 2],
    parse: fn(i64) -> Option<T>,
    field: &mut T,
    rejected: &mut Vec<AlaeError>,
) {
    let Some((key, value)) = keys.into_iter().find_map(|k| record.get(k).map(|v| (k, v))) else {
        return;
    };
    match value.as_i64().and_then(parse) {
        Some(parsed) => *field = parsed,
        None => rejected.push(AlaeError::InvalidSessionValue {
            key,
            value: value.to_string(),
        }),
    }
}

// ── Shared live state ───────────────────────────────────────

/// Lock-free storage for the selectors, one byte each.
#[derive(Debug)]
pub struct SharedModes {
    filter_type: AtomicU8,
    keytrack: AtomicU8,
    saturation: AtomicU8,
    interpolation: AtomicU8,
    tuning_spread: AtomicU8,
    filter_spread: AtomicU8,
}

impl SharedModes {
    pub fn new(state: SessionState) -> Self {
        let modes = SharedModes {
            filter_type: AtomicU8::new(0),
            keytrack: AtomicU8::new(0),
            saturation: AtomicU8::new(0),
            interpolation: AtomicU8::new(0),
            tuning_spread: AtomicU8::new(0),
            filter_spread: AtomicU8::new(0),
        };
        modes.store(&state);
        modes
    }

    /// Read every selector. Stored bytes always come from a valid enum, so
    /// the fallbacks only guard against a corrupted byte.
    pub fn load(&self) -> SessionState {
        let byte = |cell: &AtomicU8| i64::from(cell.load(Ordering::Relaxed));
        let defaults = SessionState::default();

        SessionState {
            filter_type: FilterType::from_index(byte(&self.filter_type))
                .unwrap_or(defaults.filter_type),
            keytrack: keytrack_from_index(byte(&self.keytrack)).unwrap_or(defaults.keytrack),
            saturation: Saturation::from_index(byte(&self.saturation))
                .unwrap_or(defaults.saturation),
            interpolation: Interpolation::from_index(byte(&self.interpolation))
                .unwrap_or(defaults.interpolation),
            tuning_spread: SpreadMode::from_index(byte(&self.tuning_spread))
                .unwrap_or(defaults.tuning_spread),
            filter_spread: SpreadMode::from_index(byte(&self.filter_spread))
                .unwrap_or(defaults.filter_spread),
        }
    }

    pub fn store(&self, state: &SessionState) {
        self.filter_type.store(state.filter_type.index(), Ordering::Relaxed);
        self.keytrack.store(u8::from(state.keytrack), Ordering::Relaxed);
        self.saturation.store(state.saturation.index(), Ordering::Relaxed);
        self.interpolation.store(state.interpolation.index(), Ordering::Relaxed);
        self.tuning_spread.store(state.tuning_spread.index(), Ordering::Relaxed);
        self.filter_spread.store(state.filter_spread.index(), Ordering::Relaxed);
    }

    pub(crate) fn set_filter_type(&self, filter_type: FilterType) {
        self.filter_type.store(filter_type.index(), Ordering::Relaxed);
    }

    pub(crate) fn set_keytrack(&self, on: bool) {
        self.keytrack.store(u8::from(on), Ordering::Relaxed);
    }
}

/// Cloneable handle for changing selectors from a non-audio thread.
///
/// Changes take effect on the next processed sample.
#[derive(Debug, Clone)]
pub struct ModeHandle {
    modes: Arc<SharedModes>,
}

impl ModeHandle {
    pub(crate) fn new(modes: Arc<SharedModes>) -> Self {
        Self { modes }
    }

    pub fn state(&self) -> SessionState {
        self.modes.load()
    }

    pub fn set_saturation(&self, saturation: Saturation) {
        debug!(saturation = saturation.label(), "saturation selected");
        self.modes.saturation.store(saturation.index(), Ordering::Relaxed);
    }

    pub fn set_interpolation(&self, interpolation: Interpolation) {
        debug!(interpolation = interpolation.label(), "interpolation selected");
        self.modes.interpolation.store(interpolation.index(), Ordering::Relaxed);
    }

    pub fn set_tuning_spread(&self, mode: SpreadMode) {
        debug!(mode = mode.label(), "tuning spread mode selected");
        self.modes.tuning_spread.store(mode.index(), Ordering::Relaxed);
    }

    pub fn set_filter_spread(&self, mode: SpreadMode) {
        debug!(mode = mode.label(), "filter spread mode selected");
        self.modes.filter_spread.store(mode.index(), Ordering::Relaxed);
    }

    pub fn set_filter_type(&self, filter_type: FilterType) {
        debug!(filter_type = filter_type.label(), "filter type selected");
        self.modes.set_filter_type(filter_type);
    }

    pub fn set_keytrack(&self, on: bool) {
        debug!(keytrack = on, "keytrack selected");
        self.modes.set_keytrack(on);
    }
}
