//! Bus compressor tuned as a safety limiter

use serde::{Deserialize, Serialize};

use crate::utils::helpers::{amplitude_to_db, db_to_amplitude, time_constant_coefficient};

/// Compressor settings for the aggregate bus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterSettings {
    pub threshold_db: f32,
    pub knee_db: f32,
    pub ratio: f32,
    /// Attack time in seconds
    pub attack: f32,
    /// Release time in seconds
    pub release: f32,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

impl LimiterSettings {
    /// Static gain reduction (positive dB) for a detector level in dB.
    ///
    /// Quadratic soft knee centered on the threshold.
    pub fn gain_reduction_db(&self, level_db: f32) -> f32 {
        let slope = 1.0 - 1.0 / self.ratio.max(1.0);
        let over = level_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;

        if self.knee_db > 0.0 && over.abs() <= half_knee {
            slope * (over + half_knee).powi(2) / (2.0 * self.knee_db)
        } else if over > 0.0 {
            slope * over
        } else {
            0.0
        }
    }

    /// Automatic makeup gain in dB: 0.6 of the reduction a full-scale signal gets.
    ///
    /// Same rule as a Web Audio `DynamicsCompressorNode`, `(1 / full_range_gain)^0.6`.
    pub fn makeup_db(&self) -> f32 {
        0.6 * self.gain_reduction_db(0.0)
    }
}

/// Peak-detecting compressor with attack/release ballistics.
#[derive(Debug, Clone)]
pub struct Limiter {
    settings: LimiterSettings,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
    current_gain: f32,
    makeup_gain: f32,
}

impl Limiter {
    pub fn new(settings: LimiterSettings, sample_rate: u32) -> Self {
        Self {
            settings,
            attack_coeff: time_constant_coefficient(settings.attack, sample_rate),
            release_coeff: time_constant_coefficient(settings.release, sample_rate),
            envelope: 0.0,
            current_gain: 1.0,
            makeup_gain: db_to_amplitude(settings.makeup_db()),
        }
    }

    pub fn settings(&self) -> &LimiterSettings {
        &self.settings
    }

    /// Current gain reduction multiplier (1.0 = no reduction), before makeup.
    pub fn current_gain(&self) -> f32 {
        self.current_gain
    }

    pub fn makeup_gain(&self) -> f32 {
        self.makeup_gain
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = rectified + coeff * (self.envelope - rectified);

        let reduction_db = self
            .settings
            .gain_reduction_db(amplitude_to_db(self.envelope));
        self.current_gain = db_to_amplitude(-reduction_db);

        input * self.current_gain * self.makeup_gain
    }

    pub fn process_block(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
