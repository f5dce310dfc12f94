use serde::{Deserialize, Serialize};

use crate::core::audio::param::AutomationParam;

/// Amplitude envelope shared by every tone type.
///
/// Times are offsets in seconds from the trigger time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeShape {
    pub attack: f64,
    pub peak_level: f32,
    pub decay_end: f64,
    pub floor_level: f32,
    pub stop_after: f64,
}

impl EnvelopeShape {
    pub const STANDARD: EnvelopeShape = EnvelopeShape {
        attack: 0.05,
        peak_level: 1.0,
        decay_end: 3.0,
        floor_level: 0.001,
        stop_after: 3.5,
    };

    /// Schedule the envelope on `param` for a note starting at `start`.
    pub fn schedule(&self, param: &mut AutomationParam, start: f64) {
        param
            .set_value_at_time(0.0, start)
            .linear_ramp_to_value_at_time(self.peak_level, start + self.attack)
            .exponential_ramp_to_value_at_time(self.floor_level, start + self.decay_end);
    }

    /// A fresh gain param carrying this envelope.
    pub fn gain_param(&self, start: f64) -> AutomationParam {
        let mut param = AutomationParam::new(0.0);
        self.schedule(&mut param, start);
        param
    }

    pub fn stop_time(&self, start: f64) -> f64 {
        start + self.stop_after
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::STANDARD
    }
}
