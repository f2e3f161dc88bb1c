pub mod dsp;
pub mod error;
pub mod params;
pub mod session;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use crate::dsp::engine::{Engine, EngineConfig, Frame, Indicators};
pub use crate::dsp::interpolate::Interpolation;
pub use crate::dsp::mixer::OutputRouting;
pub use crate::dsp::saturate::Saturation;
pub use crate::error::AlaeError;
pub use crate::params::{Controls, Inputs, ParamId, ParamSpec};
pub use crate::session::{FilterType, ModeHandle, SessionRecord, SessionState, SpreadMode};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the alae-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}
