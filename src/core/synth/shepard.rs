//! Octave-spaced partial banks under a Gaussian spectral envelope

use crate::core::pitch::PitchClass;

/// Lowest C in Hz; pitch class 0 of the bank's base octave
pub const SHEPARD_BASE_HZ: f64 = 16.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShepardSpectrum {
    pub base_hz: f64,
    pub octaves: u32,
    pub center_hz: f64,
    /// Standard deviation in octaves
    pub sigma: f64,
    pub min_hz: f64,
    pub max_hz: f64,
    pub min_weight: f64,
}

impl Default for ShepardSpectrum {
    fn default() -> Self {
        Self {
            base_hz: SHEPARD_BASE_HZ,
            octaves: 10,
            center_hz: 500.0,
            sigma: 2.0,
            min_hz: 20.0,
            max_hz: 16000.0,
            min_weight: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShepardPartial {
    pub octave: u32,
    pub frequency: f64,
    pub weight: f64,
}

impl ShepardSpectrum {
    pub fn base_frequency(&self, pitch: PitchClass) -> f64 {
        self.base_hz * pitch.semitone_ratio()
    }

    /// Gaussian weight of `frequency` in log2 space around the center.
    pub fn weight(&self, frequency: f64) -> f64 {
        let distance = frequency.log2() - self.center_hz.log2();
        (-(distance * distance) / (2.0 * self.sigma * self.sigma)).exp()
    }

    /// Audible, non-negligible partials for `pitch`, lowest octave first.
    pub fn partials(&self, pitch: PitchClass) -> Vec<ShepardPartial> {
        let base = self.base_frequency(pitch);
        (0..self.octaves)
            .filter_map(|octave| {
                let frequency = base * 2.0f64.powi(octave as i32);
                if frequency < self.min_hz || frequency > self.max_hz {
                    return None;
                }
                let weight = self.weight(frequency);
                if weight < self.min_weight {
                    return None;
                }
                Some(ShepardPartial {
                    octave,
                    frequency,
                    weight,
                })
            })
            .collect()
    }
}
