//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::config::WheelConfig;
use crate::core::synth::ToneType;
use crate::core::visualization::MeterMode;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "chroma-wheel")]
#[command(about = "Twelve-pad chromatic wheel with plain, FM and Shepard tones", long_about = None)]
pub struct Args {
    /// Config file (defaults to <config dir>/chroma-wheel/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial tone: sine, fm, shepard
    #[arg(long, value_name = "TONE")]
    pub tone: Option<String>,

    /// Remove the bus limiter and use full per-voice gains
    #[arg(long)]
    pub unprotected: bool,

    /// Drive the indicator from the raw peak instead of the smoothed level
    #[arg(long)]
    pub raw_meter: bool,

    /// Drop triggers while this many voices are sounding
    #[arg(long, value_name = "N")]
    pub max_voices: Option<usize>,
}

impl Args {
    /// Load the config file and apply command-line overrides on top.
    pub fn resolve_config(&self) -> Result<WheelConfig> {
        let mut config = match &self.config {
            Some(path) => WheelConfig::load(path)?,
            None => match WheelConfig::default_path() {
                Ok(path) => WheelConfig::load_or_default(&path)?,
                Err(e) => {
                    warn!("{}; using defaults", e);
                    WheelConfig::default()
                }
            },
        };

        if self.unprotected {
            config.remove_limiter();
            info!("Limiter disabled");
        }
        if self.raw_meter {
            config.meter.mode = MeterMode::Raw;
        }
        if let Some(max) = self.max_voices {
            config.synth.max_voices = Some(max);
        }
        if let Some(tone) = self.parse_tone() {
            config.synth.default_tone = tone;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the tone flag; unknown names fall back to the configured tone.
    pub fn parse_tone(&self) -> Option<ToneType> {
        let name = self.tone.as_deref()?;
        match ToneType::from_name(name) {
            Some(tone) => {
                info!("Tone: {}", tone);
                Some(tone)
            }
            None => {
                warn!("Unknown tone '{}', keeping the configured one", name);
                None
            }
        }
    }
}
