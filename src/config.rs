//! Wheel settings, read from JSON in the user config dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::core::audio::route::RouteConfig;
use crate::core::layout::RingGeometry;
use crate::core::synth::{GainProfile, ToneType};
use crate::core::visualization::MeterConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub gain: GainProfile,
    /// Cap on simultaneously sounding voices; `None` never drops a trigger
    pub max_voices: Option<usize>,
    pub default_tone: ToneType,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            gain: GainProfile::HARDENED,
            max_voices: None,
            default_tone: ToneType::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub route: RouteConfig,
    pub synth: SynthConfig,
    pub meter: MeterConfig,
    pub layout: RingGeometry,
}

impl WheelConfig {
    /// Limiter on the bus with the reduced per-voice gains.
    pub fn hardened() -> Self {
        Self::default()
    }

    /// No limiter, full per-voice gains. Dense chords can clip.
    pub fn unprotected() -> Self {
        let mut config = Self::default();
        config.remove_limiter();
        config
    }

    pub fn is_protected(&self) -> bool {
        self.route.limiter.is_some()
    }

    /// Drop the bus limiter and switch to the full per-voice gains.
    ///
    /// Other route, meter and layout settings are kept.
    pub fn remove_limiter(&mut self) {
        self.route.limiter = None;
        self.synth.gain = GainProfile::UNPROTECTED;
    }

    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push("chroma-wheel");
        path.push("config.json");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        let config: WheelConfig = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.route.validate()?;
        if !(self.meter.smoothing > 0.0 && self.meter.smoothing <= 1.0) {
            anyhow::bail!("meter.smoothing must be in (0, 1], got {}", self.meter.smoothing);
        }
        if self.meter.frame_interval_ms == 0 {
            anyhow::bail!("meter.frame_interval_ms must be positive");
        }
        if self.synth.max_voices == Some(0) {
            anyhow::bail!("synth.max_voices must be at least 1 when set");
        }
        if self.layout.radius <= 0.0 || self.layout.pad_radius <= 0.0 {
            anyhow::bail!("layout radii must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::visualization::MeterMode;
    use std::io::Write;

    #[test]
    fn test_defaults_are_hardened() {
        let config = WheelConfig::default();
        assert!(config.is_protected());
        assert_eq!(config.synth.gain, GainProfile::HARDENED);
        assert_eq!(config.synth.max_voices, None);
        assert_eq!(config.route.fft_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unprotected_preset() {
        let config = WheelConfig::unprotected();
        assert!(!config.is_protected());
        assert_eq!(config.synth.gain, GainProfile::UNPROTECTED);
        assert_eq!(config.route.fft_size, WheelConfig::hardened().route.fft_size);
    }

    #[test]
    fn test_remove_limiter_keeps_other_settings() {
        let mut config = WheelConfig::default();
        config.route.fft_size = 1024;
        config.meter.mode = MeterMode::Raw;
        config.remove_limiter();

        assert!(!config.is_protected());
        assert_eq!(config.synth.gain, GainProfile::UNPROTECTED);
        assert_eq!(config.route.fft_size, 1024);
        assert_eq!(config.meter.mode, MeterMode::Raw);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"meter": {{"mode": "raw"}}, "synth": {{"default_tone": "shepard"}}}}"#).unwrap();

        let config = WheelConfig::load(file.path()).unwrap();
        assert_eq!(config.meter.mode, MeterMode::Raw);
        assert_eq!(config.meter.smoothing, 0.1);
        assert_eq!(config.synth.default_tone, ToneType::ShepardBank);
        assert!(config.is_protected());
    }

    #[test]
    fn test_full_file_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = WheelConfig::unprotected();
        config.synth.max_voices = Some(32);
        serde_json::to_writer_pretty(File::create(&path).unwrap(), &config).unwrap();

        assert_eq!(WheelConfig::load_or_default(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WheelConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, WheelConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = WheelConfig::default();
        config.meter.smoothing = 0.0;
        assert!(config.validate().is_err());

        let mut config = WheelConfig::default();
        config.route.fft_size = 100;
        assert!(config.validate().is_err());

        let mut config = WheelConfig::default();
        config.synth.max_voices = Some(0);
        assert!(config.validate().is_err());
    }
}
