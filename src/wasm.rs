//! WebAudio host adapter.
//!
//! `WasmEngine` owns an [`Engine`] plus its control vector and modulation
//! inputs, and processes whole blocks for an AudioWorklet. The plain Rust
//! methods return [`AlaeError`]; the exported ones turn errors into JS
//! strings at the boundary.

use wasm_bindgen::prelude::*;

use crate::dsp::engine::{Engine, EngineConfig, Indicators};
use crate::dsp::interpolate::Interpolation;
use crate::dsp::mixer::OutputRouting;
use crate::dsp::saturate::Saturation;
use crate::error::AlaeError;
use crate::params::{Controls, Inputs};
use crate::session::{FilterType, SpreadMode};

fn to_js(err: AlaeError) -> JsValue {
    JsValue::from_str(&format!("{err}"))
}

/// Block-processing wrapper exported to JavaScript.
#[wasm_bindgen]
pub struct WasmEngine {
    engine: Engine,
    controls: Controls,
    inputs: Inputs,
    indicators: Indicators,
}

impl WasmEngine {
    pub fn with_config(config: EngineConfig) -> Result<Self, AlaeError> {
        Ok(WasmEngine {
            engine: Engine::new(config)?,
            controls: Controls::new(),
            inputs: Inputs::default(),
            indicators: Indicators::default(),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    fn run(&mut self, audio: Option<f32>, out: &mut Vec<f32>) {
        self.inputs.audio = audio;
        let frame = self.engine.process(&self.controls, &self.inputs);
        self.indicators = frame.indicators;
        out.push(frame.left);
        out.push(frame.right);
    }
}

#[wasm_bindgen]
impl WasmEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f32) -> Result<WasmEngine, JsValue> {
        Self::with_config(EngineConfig::with_sample_rate(sample_rate)).map_err(to_js)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<(), JsValue> {
        self.engine.set_sample_rate(sample_rate).map_err(to_js)
    }

    /// Set a control by its port index; the value is clamped to its range.
    pub fn set_param(&mut self, index: u32, value: f32) -> Result<(), JsValue> {
        self.controls.set_raw(index, value).map_err(to_js)
    }

    /// Set a modulation input voltage. Returns `false` for an unknown slot.
    ///
    /// Slots: 0 external feedback, 1 pitch, 2 FM, 3 tune spread, 4 filter FM,
    /// 5 filter spread, 6 resonance, 7 decay, 8 feedback, 9 VCA, 10 dry/wet.
    pub fn set_cv(&mut self, slot: u32, volts: f32) -> bool {
        let inputs = &mut self.inputs;
        match slot {
            0 => inputs.external_feedback = volts,
            1 => inputs.pitch = volts,
            2 => inputs.fm = volts,
            3 => inputs.tune_spread = volts,
            4 => inputs.filter_fm = volts,
            5 => inputs.filter_spread = volts,
            6 => inputs.resonance = volts,
            7 => inputs.decay = volts,
            8 => inputs.feedback = volts,
            9 => inputs.vca = Some(volts),
            10 => inputs.dry_wet = volts,
            _ => return false,
        }
        true
    }

    /// Treat the VCA input as unpatched again (unity gain).
    pub fn disconnect_vca(&mut self) {
        self.inputs.vca = None;
    }

    pub fn set_mono(&mut self, mono: bool) {
        let routing = if mono { OutputRouting::Mono } else { OutputRouting::Stereo };
        self.engine.set_output_routing(routing);
    }

    /// Process a block of input voltages; returns interleaved L/R volts.
    pub fn process_block(&mut self, input: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(input.len() * 2);
        for &sample in input {
            self.run(Some(sample), &mut out);
        }
        out
    }

    /// Process `frames` samples with the audio input unpatched, letting
    /// the voices self-oscillate from noise.
    pub fn process_free(&mut self, frames: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(frames * 2);
        for _ in 0..frames {
            self.run(None, &mut out);
        }
        out
    }

    /// Indicator states after the last processed sample:
    /// `[lowpass, bandpass, highpass, notch, keytrack]` as 0/1.
    pub fn indicators(&self) -> Vec<u8> {
        let i = self.indicators;
        [i.lowpass, i.bandpass, i.highpass, i.notch, i.keytrack]
            .iter()
            .map(|&on| on as u8)
            .collect()
    }

    pub fn session_json(&self) -> String {
        self.engine.session_json()
    }

    pub fn load_session(&mut self, json: &str) {
        self.engine.load_session(json);
    }

    /// Session record as a plain JS object.
    pub fn session(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.engine.save_session())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn set_saturation(&self, index: i32) -> bool {
        match Saturation::from_index(index.into()) {
            Some(s) => {
                self.engine.mode_handle().set_saturation(s);
                true
            }
            None => false,
        }
    }

    pub fn set_interpolation(&self, index: i32) -> bool {
        match Interpolation::from_index(index.into()) {
            Some(i) => {
                self.engine.mode_handle().set_interpolation(i);
                true
            }
            None => false,
        }
    }

    pub fn set_filter_type(&self, index: i32) -> bool {
        match FilterType::from_index(index.into()) {
            Some(t) => {
                self.engine.mode_handle().set_filter_type(t);
                true
            }
            None => false,
        }
    }

    pub fn set_tuning_spread(&self, index: i32) -> bool {
        match SpreadMode::from_index(index.into()) {
            Some(m) => {
                self.engine.mode_handle().set_tuning_spread(m);
                true
            }
            None => false,
        }
    }

    pub fn set_filter_spread(&self, index: i32) -> bool {
        match SpreadMode::from_index(index.into()) {
            Some(m) => {
                self.engine.mode_handle().set_filter_spread(m);
                true
            }
            None => false,
        }
    }

    pub fn set_keytrack(&self, on: bool) {
        self.engine.mode_handle().set_keytrack(on);
    }
}
