use std::fmt;

/// Errors raised at the configuration and session boundaries.
///
/// The per-sample path never produces one of these: out-of-range numbers
/// there are clamped, not reported.
#[derive(Debug)]
pub enum AlaeError {
    /// The persisted session text is not valid JSON.
    Json(serde_json::Error),
    /// The persisted session parsed, but is not a key/value object.
    NotAnObject,
    /// A known session key carries a value outside its selector range.
    InvalidSessionValue { key: &'static str, value: String },
    InvalidSampleRate(f32),
    InvalidCapacity(usize),
    UnknownParam(u32),
}

impl fmt::Display for AlaeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlaeError::Json(e) => write!(f, "Session JSON error: {e}"),
            AlaeError::NotAnObject => write!(f, "Session record must be a JSON object"),
            AlaeError::InvalidSessionValue { key, value } => {
                write!(f, "Invalid value {value} for session key '{key}'")
            }
            AlaeError::InvalidSampleRate(sr) => {
                write!(f, "Sample rate must be finite and positive, got {sr}")
            }
            AlaeError::InvalidCapacity(len) => {
                write!(f, "Delay buffer capacity must be at least 4 samples, got {len}")
            }
            AlaeError::UnknownParam(index) => write!(f, "Unknown parameter index {index}"),
        }
    }
}

impl std::error::Error for AlaeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlaeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AlaeError {
    fn from(e: serde_json::Error) -> Self {
        AlaeError::Json(e)
    }
}
