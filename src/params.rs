//! Control parameters and modulation inputs consumed by the engine.
//!
//! Controls are a flat vector of knob values indexed by [`ParamId`]; each
//! entry has a declared range and default. Inputs are the per-sample
//! voltages arriving from the host, in the ±5 V convention.

use crate::dsp::spread::MAX_VOICES;
use crate::error::AlaeError;

/// Every control the engine reads, in host registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    TrackingAdjust,
    FmAmount,
    Tune,
    FineTune,
    TuneSpreadAmount,
    TuneSpread,
    VoiceCount,
    FilterFmAmount,
    FilterFreq,
    FilterSpreadAmount,
    FilterSpread,
    ResonanceAmount,
    Resonance,
    DecayAmount,
    Decay,
    FeedbackAmount,
    Feedback,
    Vca,
    DryWetAmount,
    DryWet,
    ExternalFeedbackAmount,
    FilterTypeButton,
    KeytrackButton,
}

/// Declared range and default of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

const fn spec(name: &'static str, min: f32, max: f32, default: f32) -> ParamSpec {
    ParamSpec { name, min, max, default }
}

impl ParamId {
    pub const COUNT: usize = 23;

    pub const ALL: [ParamId; ParamId::COUNT] = [
        ParamId::TrackingAdjust,
        ParamId::FmAmount,
        ParamId::Tune,
        ParamId::FineTune,
        ParamId::TuneSpreadAmount,
        ParamId::TuneSpread,
        ParamId::VoiceCount,
        ParamId::FilterFmAmount,
        ParamId::FilterFreq,
        ParamId::FilterSpreadAmount,
        ParamId::FilterSpread,
        ParamId::ResonanceAmount,
        ParamId::Resonance,
        ParamId::DecayAmount,
        ParamId::Decay,
        ParamId::FeedbackAmount,
        ParamId::Feedback,
        ParamId::Vca,
        ParamId::DryWetAmount,
        ParamId::DryWet,
        ParamId::ExternalFeedbackAmount,
        ParamId::FilterTypeButton,
        ParamId::KeytrackButton,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn spec(self) -> ParamSpec {
        match self {
            ParamId::TrackingAdjust => spec("Tracking Adjustment", -10.0, 5.0, 0.0),
            ParamId::FmAmount => spec("FM", -1.0, 1.0, 0.0),
            ParamId::Tune => spec("Tuning", -1.0, 1.0, 0.4),
            ParamId::FineTune => spec("Fine Tuning", -1.0, 1.0, 0.0),
            ParamId::TuneSpreadAmount => spec("Spread", -1.0, 1.0, 0.0),
            ParamId::TuneSpread => spec("Tuning Spread", -1.0, 1.0, 0.0),
            ParamId::VoiceCount => {
                spec("Unison Voice Count", 1.0, MAX_VOICES as f32, MAX_VOICES as f32)
            }
            ParamId::FilterFmAmount => spec("Filter FM", -1.0, 1.0, 0.0),
            ParamId::FilterFreq => spec("Filter Freq", -0.1, 1.0, 0.2),
            ParamId::FilterSpreadAmount => spec("Filter Spread CV", -1.0, 1.0, 0.0),
            ParamId::FilterSpread => spec("Filter Spread", -1.0, 1.0, 0.0),
            ParamId::ResonanceAmount => spec("Filter Resonance CV", -1.0, 1.0, 0.0),
            ParamId::Resonance => spec("Filter Resonance", 0.0, 1.0, 0.707),
            ParamId::DecayAmount => spec("Decay CV", -1.0, 1.0, 0.0),
            ParamId::Decay => spec("Decay", -1.0, 1.0, 0.3),
            ParamId::FeedbackAmount => spec("Feedback Saturation", -1.0, 1.0, 0.0),
            ParamId::Feedback => spec("Feedback", 0.0, 1.0, 0.0),
            ParamId::Vca => spec("VCA", 0.0, 5.0, 2.5),
            ParamId::DryWetAmount => spec("Dry / Wet CV", -1.0, 1.0, 0.0),
            ParamId::DryWet => spec("DRY / WET", 0.0, 1.0, 1.0),
            ParamId::ExternalFeedbackAmount => spec("External Feedback", -1.0, 1.0, 0.0),
            ParamId::FilterTypeButton => spec("Filter Type", 0.0, 1.0, 0.0),
            ParamId::KeytrackButton => spec("Filter Keytracking", 0.0, 1.0, 0.0),
        }
    }
}

/// Current value of every control.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    values: [f32; ParamId::COUNT],
}

impl Default for Controls {
    fn default() -> Self {
        let mut values = [0.0; ParamId::COUNT];
        for id in ParamId::ALL {
            values[id.index()] = id.spec().default;
        }
        Controls { values }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    /// Set a control, clamped into its declared range.
    pub fn set(&mut self, id: ParamId, value: f32) {
        let spec = id.spec();
        self.values[id.index()] = value.clamp(spec.min, spec.max);
    }

    /// Set a control by its numeric index, as a host port table would.
    pub fn set_raw(&mut self, index: u32, value: f32) -> Result<(), AlaeError> {
        let id = ParamId::from_index(index).ok_or(AlaeError::UnknownParam(index))?;
        self.set(id, value);
        Ok(())
    }
}

/// Per-sample input voltages. `None` marks an unconnected jack where the
/// engine behaves differently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inputs {
    pub audio: Option<f32>,
    pub external_feedback: f32,
    /// 1 V/oct pitch tracking.
    pub pitch: f32,
    pub fm: f32,
    pub tune_spread: f32,
    pub filter_fm: f32,
    pub filter_spread: f32,
    pub resonance: f32,
    pub decay: f32,
    pub feedback: f32,
    pub vca: Option<f32>,
    pub dry_wet: f32,
}

impl Inputs {
    /// Inputs with only the audio jack patched.
    pub fn with_audio(audio: f32) -> Self {
        Inputs {
            audio: Some(audio),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_order() {
        for (i, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i, "{id:?} out of order");
            assert_eq!(ParamId::from_index(i as u32), Some(*id));
        }
        assert_eq!(ParamId::from_index(ParamId::COUNT as u32), None);
    }

    #[test]
    fn defaults_lie_inside_ranges() {
        for id in ParamId::ALL {
            let s = id.spec();
            assert!(s.min < s.max, "{id:?} has an empty range");
            assert!((s.min..=s.max).contains(&s.default), "{id:?} default outside range");
        }
    }

    #[test]
    fn controls_start_at_defaults() {
        let c = Controls::new();
        assert_eq!(c.get(ParamId::Tune), 0.4);
        assert_eq!(c.get(ParamId::VoiceCount), 8.0);
        assert_eq!(c.get(ParamId::Vca), 2.5);
        assert_eq!(c.get(ParamId::DryWet), 1.0);
    }

    #[test]
    fn set_clamps_to_declared_range() {
        let mut c = Controls::new();
        c.set(ParamId::Feedback, 3.0);
        assert_eq!(c.get(ParamId::Feedback), 1.0);
        c.set(ParamId::TrackingAdjust, -20.0);
        assert_eq!(c.get(ParamId::TrackingAdjust), -10.0);
    }

    #[test]
    fn set_raw_rejects_unknown_index() {
        let mut c = Controls::new();
        assert!(c.set_raw(ParamId::Decay.index() as u32, -0.5).is_ok());
        assert_eq!(c.get(ParamId::Decay), -0.5);
        assert!(matches!(c.set_raw(99, 0.0), Err(AlaeError::UnknownParam(99))));
    }
}
