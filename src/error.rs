//! Error types for the wheel engine.

use std::fmt;

use crate::core::audio::EngineState;

/// Errors surfaced by activation, backends and configuration.
///
/// Triggers that arrive before the engine is ready are not errors; they are
/// dropped without any signal to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelError {
    /// The host has no default output device.
    NoOutputDevice,
    /// The output device refused to report a usable configuration.
    DeviceConfig(String),
    /// The device's sample format is not one the render callback can write.
    UnsupportedFormat(String),
    /// Building the output stream failed.
    StreamBuild(String),
    /// Starting (resuming) the output stream failed.
    StreamPlay(String),
    /// The engine answered but did not reach the running state.
    NotRunning(EngineState),
    /// The level-meter thread could not be started.
    FeedbackLoop(String),
    /// A configuration value is out of range.
    InvalidConfig(String),
}

impl WheelError {
    /// True for every failure that leaves the engine unable to produce sound.
    pub fn is_engine_unavailable(&self) -> bool {
        !matches!(self, WheelError::FeedbackLoop(_) | WheelError::InvalidConfig(_))
    }
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelError::NoOutputDevice => write!(f, "no audio output device available"),
            WheelError::DeviceConfig(e) => write!(f, "failed to query output config: {}", e),
            WheelError::UnsupportedFormat(format) => {
                write!(f, "unsupported sample format: {}", format)
            }
            WheelError::StreamBuild(e) => write!(f, "failed to build audio stream: {}", e),
            WheelError::StreamPlay(e) => write!(f, "failed to start audio stream: {}", e),
            WheelError::NotRunning(state) => {
                write!(f, "audio engine did not start (state: {:?})", state)
            }
            WheelError::FeedbackLoop(e) => write!(f, "failed to start level meter: {}", e),
            WheelError::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for WheelError {}
