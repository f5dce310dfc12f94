use crate::core::layout::RotateDirection;
use crate::core::pitch::{PitchClass, Rgb};
use crate::core::session::Readiness;
use crate::core::synth::ToneType;

/// Inbound requests from the input collaborators (pads, keyboard, buttons)
#[derive(Debug, Clone, PartialEq)]
pub enum WheelMessage {
    Activate,
    Trigger { pitch: PitchClass, tone: ToneType, color: Rgb },
    Rotate(RotateDirection),
}

impl WheelMessage {
    /// A trigger carrying the pitch's own table color.
    pub fn trigger(pitch: PitchClass, tone: ToneType) -> Self {
        WheelMessage::Trigger {
            pitch,
            tone,
            color: pitch.color(),
        }
    }
}

/// Outbound notifications for the display collaborator.
///
/// Every event is delivered; per-frame indicator geometry travels separately
/// through the session's single-slot frame channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    ColorUpdate(Rgb),
    Readiness(Readiness),
}
