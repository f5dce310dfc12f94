//! Level metering and the pulsing center indicator

pub mod feedback;

pub use feedback::{FeedbackHandle, FeedbackLoop};

use serde::{Deserialize, Serialize};

use crate::core::analyzer::BYTE_ZERO;
use crate::core::pitch::Rgb;

/// Largest distance from the zero crossing a level can report
pub const MAX_LEVEL: f32 = 127.0;

pub const IDLE_SIZE: f32 = 20.0;
pub const BASE_SIZE: f32 = 50.0;
pub const SIZE_PER_LEVEL: f32 = 3.0;

/// How the per-frame peak becomes the displayed level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterMode {
    /// One-pole smoothing of the peak, idle below 1.0
    #[default]
    Smoothed,
    /// The raw peak, idle below 2.0
    Raw,
}

impl MeterMode {
    pub fn idle_threshold(&self) -> f32 {
        match self {
            MeterMode::Smoothed => 1.0,
            MeterMode::Raw => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub mode: MeterMode,
    /// Fraction of the gap to the new peak closed each frame
    pub smoothing: f32,
    pub frame_interval_ms: u64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            mode: MeterMode::Smoothed,
            smoothing: 0.1,
            frame_interval_ms: 16,
        }
    }
}

/// Indicator state shared between triggers (color) and the meter (level)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub smoothed_level: f32,
    pub active_color: Rgb,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            smoothed_level: 0.0,
            active_color: Rgb::WHITE,
        }
    }
}

/// What the display collaborator should draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorFrame {
    Idle,
    Pulse { size: f32, glow_radius: f32, color: Rgb },
}

impl IndicatorFrame {
    pub fn size(&self) -> f32 {
        match self {
            IndicatorFrame::Idle => IDLE_SIZE,
            IndicatorFrame::Pulse { size, .. } => *size,
        }
    }

    pub fn glow_radius(&self) -> f32 {
        match self {
            IndicatorFrame::Idle => 0.0,
            IndicatorFrame::Pulse { glow_radius, .. } => *glow_radius,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            IndicatorFrame::Idle => Rgb::WHITE,
            IndicatorFrame::Pulse { color, .. } => *color,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, IndicatorFrame::Idle)
    }
}

/// Peak distance from the zero crossing over a byte time-domain buffer.
pub fn peak_level(buffer: &[u8]) -> f32 {
    buffer
        .iter()
        .map(|&b| (b as i16 - BYTE_ZERO as i16).unsigned_abs())
        .max()
        .map_or(0.0, |peak| (peak as f32).min(MAX_LEVEL))
}

#[derive(Debug, Clone)]
pub struct LevelMeter {
    pub mode: MeterMode,
    pub smoothing: f32,
}

impl LevelMeter {
    pub fn new(config: &MeterConfig) -> Self {
        Self {
            mode: config.mode,
            smoothing: config.smoothing,
        }
    }

    /// Advance the meter by one frame of analyser data.
    pub fn step(&self, state: &mut VisualState, buffer: &[u8]) -> IndicatorFrame {
        let peak = peak_level(buffer);
        state.smoothed_level = match self.mode {
            MeterMode::Smoothed => state.smoothed_level + (peak - state.smoothed_level) * self.smoothing,
            MeterMode::Raw => peak,
        };
        self.frame_for(state)
    }

    /// Map the current level to an indicator frame.
    pub fn frame_for(&self, state: &VisualState) -> IndicatorFrame {
        let level = state.smoothed_level;
        if level < self.mode.idle_threshold() {
            IndicatorFrame::Idle
        } else {
            let size = BASE_SIZE + level * SIZE_PER_LEVEL;
            IndicatorFrame::Pulse {
                size,
                glow_radius: size / 2.0,
                color: state.active_color,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SILENCE: [u8; 128] = [BYTE_ZERO; 128];

    fn meter(mode: MeterMode) -> LevelMeter {
        LevelMeter::new(&MeterConfig {
            mode,
            ..MeterConfig::default()
        })
    }

    fn buffer_with_peak(peak: u8) -> Vec<u8> {
        let mut buffer = SILENCE.to_vec();
        buffer[17] = BYTE_ZERO + peak;
        buffer
    }

    #[test]
    fn test_peak_level() {
        assert_eq!(peak_level(&SILENCE), 0.0);
        assert_eq!(peak_level(&[128, 100, 140]), 28.0);
        // Byte 0 is 128 below center; capped
        assert_eq!(peak_level(&[0, 255]), MAX_LEVEL);
        assert_eq!(peak_level(&[]), 0.0);
    }

    #[test]
    fn test_smoothing_moves_a_tenth_of_the_gap() {
        let meter = meter(MeterMode::Smoothed);
        let mut state = VisualState::default();
        meter.step(&mut state, &buffer_with_peak(100));
        assert!((state.smoothed_level - 10.0).abs() < 1e-5);
        meter.step(&mut state, &buffer_with_peak(100));
        assert!((state.smoothed_level - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_silence_decays_to_idle() {
        let meter = meter(MeterMode::Smoothed);
        let mut state = VisualState {
            smoothed_level: MAX_LEVEL,
            active_color: Rgb::new(255, 0, 0),
        };

        for frame in 1..=46 {
            let indicator = meter.step(&mut state, &SILENCE);
            let expected = MAX_LEVEL * 0.9f32.powi(frame);
            assert!((state.smoothed_level - expected).abs() < 1e-3);
            if frame <= 45 {
                assert!(!indicator.is_idle(), "idle too early at frame {}", frame);
            } else {
                assert!(indicator.is_idle());
            }
        }

        for _ in 0..500 {
            assert_eq!(meter.step(&mut state, &SILENCE), IndicatorFrame::Idle);
        }
        assert!(state.smoothed_level < 1e-6);
        assert!(state.smoothed_level >= 0.0);
    }

    #[test]
    fn test_smoothed_threshold_boundary() {
        let meter = meter(MeterMode::Smoothed);
        let at = VisualState {
            smoothed_level: 1.0,
            active_color: Rgb::new(1, 2, 3),
        };
        let below = VisualState {
            smoothed_level: 0.999,
            ..at
        };
        assert_eq!(
            meter.frame_for(&at),
            IndicatorFrame::Pulse {
                size: 53.0,
                glow_radius: 26.5,
                color: Rgb::new(1, 2, 3)
            }
        );
        assert_eq!(meter.frame_for(&below), IndicatorFrame::Idle);
    }

    #[test]
    fn test_raw_threshold_boundary() {
        let meter = meter(MeterMode::Raw);
        let mut state = VisualState::default();

        assert!(meter.step(&mut state, &buffer_with_peak(1)).is_idle());
        assert_eq!(state.smoothed_level, 1.0);

        let frame = meter.step(&mut state, &buffer_with_peak(2));
        assert_eq!(state.smoothed_level, 2.0);
        assert_eq!(frame.size(), 56.0);

        // No memory between frames
        assert!(meter.step(&mut state, &SILENCE).is_idle());
    }

    #[test]
    fn test_size_is_uncapped_linear() {
        let meter = meter(MeterMode::Raw);
        let mut state = VisualState::default();
        let frame = meter.step(&mut state, &buffer_with_peak(127));
        assert_eq!(frame.size(), 50.0 + 127.0 * 3.0);
        assert_eq!(frame.glow_radius(), frame.size() / 2.0);
        assert_eq!(frame.color(), Rgb::WHITE);
    }

    #[test]
    fn test_idle_appearance() {
        let idle = IndicatorFrame::Idle;
        assert_eq!(idle.size(), IDLE_SIZE);
        assert_eq!(idle.glow_radius(), 0.0);
        assert_eq!(idle.color(), Rgb::WHITE);
    }
}
