//! DSP core: delay-line voices, their building blocks, and the engine that
//! drives them once per sample.
//!
//! Everything here is allocation-free after construction, so the same code
//! runs inside a native audio callback or a WebAudio AudioWorklet.

pub mod delay;
pub mod engine;
pub mod filter;
pub mod interpolate;
pub mod mixer;
pub mod saturate;
pub mod spread;
pub mod trigger;
pub mod utils;
pub mod voice;
