//! Audio Engine: per-sample orchestration of the unison delay-line voices.
//!
//! Each call to [`Engine::process`] reads the control vector and the input
//! voltages once, derives the shared scalars into a [`DerivedParams`], runs
//! every active voice, and mixes the result into two output voltages.
//! Nothing in that path allocates or logs.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AlaeError;
use crate::params::{Controls, Inputs, ParamId};
use crate::session::{FilterType, ModeHandle, SessionRecord, SessionState, SharedModes};

use super::filter::{MAX_FREQUENCY, MIN_FREQUENCY};
use super::mixer::{OutputRouting, OutputStage, StereoMix};
use super::spread::{MAX_VOICES, filter_spread_curve, spread_offset, tuning_spread_curve};
use super::trigger::BooleanTrigger;
use super::utils::{cv_to_unit, map_range, voct_to_hz};
use super::voice::{Voice, VoiceTarget};

/// Default delay capacity per voice: 2^19 samples (≈2.73 s at 48 kHz).
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 19;

/// Lower edge of the filter cutoff range, Hz.
pub const FILTER_FREQ_MIN: f32 = 30.0;
/// Upper edge of the filter cutoff range, Hz.
pub const FILTER_FREQ_MAX: f32 = 20_000.0;

/// Base tuning at the centre of the tune knob, V/oct.
const AUDIBLE_PITCH_LOW: f32 = -3.3;
/// Base tuning at the top of the tune knob, V/oct.
const AUDIBLE_PITCH_HIGH: f32 = 4.5;

const FEEDBACK_GAIN_MAX: f32 = 10.0;
const NOISE_STEP: f32 = 0.000_001;

const RESONANCE_MIN: f32 = 0.001;
const RESONANCE_MAX: f32 = 2.0;

/// Engine construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Audio sample rate in Hz.
    pub sample_rate: f32,
    /// Delay buffer length per voice, in samples. Sets the lowest pitch.
    pub buffer_capacity: usize,
    /// Seed for the self-oscillation noise; `None` seeds from entropy.
    pub noise_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 48_000.0,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            noise_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        EngineConfig {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), AlaeError> {
        validate_sample_rate(self.sample_rate)?;
        if self.buffer_capacity < 4 {
            return Err(AlaeError::InvalidCapacity(self.buffer_capacity));
        }
        Ok(())
    }
}

fn validate_sample_rate(sample_rate: f32) -> Result<(), AlaeError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(AlaeError::InvalidSampleRate(sample_rate))
    }
}

/// Indicator states for the host panel.
///
/// The four response lights are one-hot over the filter type and all dark
/// on bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indicators {
    pub lowpass: bool,
    pub bandpass: bool,
    pub highpass: bool,
    pub notch: bool,
    pub keytrack: bool,
}

impl Indicators {
    pub fn from_state(state: &SessionState) -> Self {
        let t = state.filter_type;
        Indicators {
            lowpass: t == FilterType::Lowpass,
            bandpass: t == FilterType::Bandpass,
            highpass: t == FilterType::Highpass,
            notch: t == FilterType::Notch,
            keytrack: state.keytrack,
        }
    }
}

/// One processed sample frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Left output, volts.
    pub left: f32,
    /// Right output, volts.
    pub right: f32,
    pub indicators: Indicators,
}

/// Scalars derived from controls and inputs at the top of each sample.
///
/// Rebuilt from scratch every call; nothing here carries over between
/// samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedParams {
    pub sample_rate: f32,
    pub active_voices: usize,
    /// Normalized input (audio + attenuated external feedback + noise).
    pub audio_in: f32,
    /// Gain into the saturator, `[1, 10]`.
    pub feedback_gain: f32,
    /// Combined decay control.
    pub decay: f32,
    /// Sign of `decay`: -1, 0 or 1.
    pub decay_sign: f32,
    /// Floor of the tuning range so the longest delay fits the buffer.
    pub lowest_pitch: f32,
    /// Base pitch in V/oct before spread and FM.
    pub base_tune: f32,
    /// Base pitch as a log-frequency position within the filter range.
    pub base_pitch_norm: f32,
    /// Attenuated FM added to every voice, V/oct.
    pub fm: f32,
    pub tune_spread: f32,
    pub filter_spread: f32,
    /// Filter cutoff control + attenuated CV, normalized log position.
    pub filter_freq: f32,
    pub resonance: f32,
    /// Read-position adjustment, samples.
    pub tracking_offset: f32,
    pub modes: SessionState,
}

/// Lowest V/oct pitch whose period fits in `capacity` samples.
pub fn lowest_pitch(sample_rate: f32, capacity: usize) -> f32 {
    ((sample_rate / capacity as f32) / super::utils::FREQ_C4).log2()
}

/// Log-frequency position of `hz` between the filter range edges.
fn filter_norm(hz: f32) -> f32 {
    (hz.log2() - FILTER_FREQ_MIN.log2()) / (FILTER_FREQ_MAX.log2() - FILTER_FREQ_MIN.log2())
}

/// Inverse of [`filter_norm`].
fn filter_hz(norm: f32) -> f32 {
    let lo = FILTER_FREQ_MIN.log2();
    let hi = FILTER_FREQ_MAX.log2();
    2.0_f32.powf(lo + norm * (hi - lo))
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// The delay-line voice engine.
pub struct Engine {
    config: EngineConfig,
    voices: [Voice; MAX_VOICES],
    modes: Arc<SharedModes>,
    type_button: BooleanTrigger,
    keytrack_button: BooleanTrigger,
    routing: OutputRouting,
    rng: StdRng,
}

impl Engine {
    /// Allocate every voice buffer up front.
    pub fn new(config: EngineConfig) -> Result<Self, AlaeError> {
        config.validate()?;

        let rng = match config.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            sample_rate = config.sample_rate,
            capacity = config.buffer_capacity,
            voices = MAX_VOICES,
            "engine created"
        );

        Ok(Engine {
            config,
            voices: std::array::from_fn(|_| Voice::new(config.buffer_capacity)),
            modes: Arc::new(SharedModes::new(SessionState::default())),
            type_button: BooleanTrigger::new(),
            keytrack_button: BooleanTrigger::new(),
            routing: OutputRouting::Stereo,
            rng,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<(), AlaeError> {
        validate_sample_rate(sample_rate)?;
        debug!(sample_rate, "sample rate changed");
        self.config.sample_rate = sample_rate;
        Ok(())
    }

    pub fn set_output_routing(&mut self, routing: OutputRouting) {
        self.routing = routing;
    }

    pub fn output_routing(&self) -> OutputRouting {
        self.routing
    }

    /// Handle for changing selectors from another thread.
    pub fn mode_handle(&self) -> ModeHandle {
        ModeHandle::new(Arc::clone(&self.modes))
    }

    pub fn session_state(&self) -> SessionState {
        self.modes.load()
    }

    pub fn save_session(&self) -> SessionRecord {
        self.session_state().record()
    }

    pub fn session_json(&self) -> String {
        self.session_state().to_json()
    }

    /// Restore persisted selectors; missing or invalid keys keep their value.
    pub fn load_session(&mut self, json: &str) {
        let mut state = self.modes.load();
        state.restore(json);
        self.modes.store(&state);
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn lowest_pitch(&self) -> f32 {
        lowest_pitch(self.config.sample_rate, self.config.buffer_capacity)
    }

    /// Clear every voice. Voice-count changes never do this on their own.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.type_button.reset();
        self.keytrack_button.reset();
    }

    /// Process one sample frame.
    pub fn process(&mut self, controls: &Controls, inputs: &Inputs) -> Frame {
        self.advance_toggles(controls);
        let p = self.derive(controls, inputs);

        let mut mix = StereoMix::new(p.active_voices, self.routing);
        for (index, voice) in self.voices.iter_mut().take(p.active_voices).enumerate() {
            let target = voice_target(&p, index);
            mix.add(index, voice.process(&p, target));
        }

        let stage = OutputStage {
            vca: controls.get(ParamId::Vca),
            vca_mod: inputs.vca.map_or(1.0, |v| cv_to_unit(v).clamp(0.0, 1.0)),
            mix: (controls.get(ParamId::DryWet)
                + cv_to_unit(inputs.dry_wet) * controls.get(ParamId::DryWetAmount))
            .clamp(0.0, 1.0),
            dry: p.audio_in,
        };
        let (left, right) = mix.output(&stage);

        Frame {
            left,
            right,
            indicators: Indicators::from_state(&p.modes),
        }
    }

    fn advance_toggles(&mut self, controls: &Controls) {
        if self.type_button.process_value(controls.get(ParamId::FilterTypeButton)) {
            let current = self.modes.load().filter_type;
            self.modes.set_filter_type(current.next());
        }
        if self.keytrack_button.process_value(controls.get(ParamId::KeytrackButton)) {
            let current = self.modes.load().keytrack;
            self.modes.set_keytrack(!current);
        }
    }

    /// Compute every shared scalar for this sample.
    pub fn derive(&mut self, controls: &Controls, inputs: &Inputs) -> DerivedParams {
        let sample_rate = self.config.sample_rate;
        let knob = |id: ParamId| controls.get(id);
        // Knob plus its CV, rescaled to ±1 and scaled by the attenuator
        let modulated =
            |id: ParamId, cv: f32, amount: ParamId| knob(id) + cv_to_unit(cv) * knob(amount);

        let active_voices = (knob(ParamId::VoiceCount) as usize).clamp(1, MAX_VOICES);

        let raw_in = inputs.audio.unwrap_or(0.0)
            + inputs.external_feedback * knob(ParamId::ExternalFeedbackAmount);
        let mut audio_in = cv_to_unit(raw_in);

        let feedback = modulated(ParamId::Feedback, inputs.feedback, ParamId::FeedbackAmount);
        let feedback_gain =
            (1.0 + (FEEDBACK_GAIN_MAX - 1.0) * feedback.powi(3)).clamp(1.0, FEEDBACK_GAIN_MAX);

        if inputs.audio.is_none() {
            let step = self.rng.gen_range(0..100u32) as f32;
            audio_in += (feedback_gain - 1.0) * step * NOISE_STEP;
        }

        let decay = modulated(ParamId::Decay, inputs.decay, ParamId::DecayAmount);
        let lowest = lowest_pitch(sample_rate, self.config.buffer_capacity);

        let tune = knob(ParamId::Tune) + knob(ParamId::FineTune) * 0.01;
        let mut base_tune = if tune >= 0.0 {
            map_range(tune, 0.0, 1.0, AUDIBLE_PITCH_LOW, AUDIBLE_PITCH_HIGH)
        } else {
            map_range(tune, -1.0, 0.0, lowest, AUDIBLE_PITCH_LOW)
        };
        base_tune += inputs.pitch;

        let tune_spread = tuning_spread_curve(modulated(
            ParamId::TuneSpread,
            inputs.tune_spread,
            ParamId::TuneSpreadAmount,
        ));
        let filter_spread = filter_spread_curve(modulated(
            ParamId::FilterSpread,
            inputs.filter_spread,
            ParamId::FilterSpreadAmount,
        ));

        let resonance = modulated(ParamId::Resonance, inputs.resonance, ParamId::ResonanceAmount)
            .clamp(RESONANCE_MIN, RESONANCE_MAX);

        DerivedParams {
            sample_rate,
            active_voices,
            audio_in,
            feedback_gain,
            decay,
            decay_sign: sign(decay),
            lowest_pitch: lowest,
            base_tune,
            base_pitch_norm: filter_norm(voct_to_hz(base_tune)),
            fm: inputs.fm * knob(ParamId::FmAmount),
            tune_spread,
            filter_spread,
            filter_freq: modulated(ParamId::FilterFreq, inputs.filter_fm, ParamId::FilterFmAmount),
            resonance,
            tracking_offset: knob(ParamId::TrackingAdjust),
            modes: self.modes.load(),
        }
    }
}

/// Spread pitch and cutoff for voice `index`.
fn voice_target(p: &DerivedParams, index: usize) -> VoiceTarget {
    let active = p.active_voices;
    let modes = &p.modes;

    let tuning =
        p.base_tune + spread_offset(index, active, p.tune_spread, modes.tuning_spread) + p.fm;

    let tracked = if modes.keytrack {
        p.base_pitch_norm + p.filter_freq
    } else {
        p.filter_freq
    };
    let norm = tracked.clamp(-1.0, 1.0)
        + spread_offset(index, active, p.filter_spread, modes.filter_spread);
    let filter_freq = (filter_hz(norm) / p.sample_rate).clamp(MIN_FREQUENCY, MAX_FREQUENCY);

    VoiceTarget { tuning, filter_freq }
}
