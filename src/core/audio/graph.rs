use std::sync::{Arc, Mutex};

use log::trace;

use crate::core::analyzer::{Analyzer, AnalyzerTap};
use crate::core::audio::limiter::{Limiter, LimiterSettings};
use crate::core::voice::Voice;

/// Graph handle shared between the session and the audio callback
pub type SharedGraph = Arc<Mutex<RenderGraph>>;

/// Processing applied to the summed voices before the analyser
#[derive(Debug, Clone)]
pub enum BusStage {
    Limiter(Limiter),
    Flat { gain: f32 },
}

impl BusStage {
    pub fn new(limiter: Option<LimiterSettings>, flat_gain: f32, sample_rate: u32) -> Self {
        match limiter {
            Some(settings) => BusStage::Limiter(Limiter::new(settings, sample_rate)),
            None => BusStage::Flat { gain: flat_gain },
        }
    }

    pub fn has_limiter(&self) -> bool {
        matches!(self, BusStage::Limiter(_))
    }

    fn process_block(&mut self, block: &mut [f32]) {
        match self {
            BusStage::Limiter(limiter) => limiter.process_block(block),
            BusStage::Flat { gain } => {
                if *gain != 1.0 {
                    block.iter_mut().for_each(|s| *s *= *gain);
                }
            }
        }
    }
}

/// Voices → bus stage → analyser → sink.
///
/// Owns the engine clock: time only moves forward as frames are rendered.
pub struct RenderGraph {
    sample_rate: u32,
    frames_rendered: u64,
    voices: Vec<Voice>,
    bus: BusStage,
    analyzer: AnalyzerTap,
    mix: Vec<f32>,
    voices_connected: u64,
}

impl RenderGraph {
    pub fn new(sample_rate: u32, bus: BusStage, analyzer: AnalyzerTap) -> Self {
        Self {
            sample_rate,
            frames_rendered: 0,
            voices: Vec::new(),
            bus,
            analyzer,
            mix: Vec::new(),
            voices_connected: 0,
        }
    }

    /// Convenience constructor with a fresh analyser of `fft_size`.
    pub fn with_analyzer(sample_rate: u32, bus: BusStage, fft_size: usize) -> Self {
        Self::new(sample_rate, bus, AnalyzerTap::new(Analyzer::new(fft_size)))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Engine time in seconds.
    pub fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    pub fn analyzer(&self) -> &AnalyzerTap {
        &self.analyzer
    }

    pub fn bus(&self) -> &BusStage {
        &self.bus
    }

    pub fn connect(&mut self, voice: Voice) {
        self.voices_connected += 1;
        self.voices.push(voice);
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Total number of voices ever connected.
    pub fn voices_connected(&self) -> u64 {
        self.voices_connected
    }

    /// Render `frames` mono samples into the internal mix buffer and return it.
    pub fn render_block(&mut self, frames: usize) -> &[f32] {
        let block_start = self.current_time();
        self.mix.clear();
        self.mix.resize(frames, 0.0);

        for voice in self.voices.iter_mut() {
            voice.render_into(&mut self.mix, block_start, self.sample_rate);
        }
        self.bus.process_block(&mut self.mix);
        self.analyzer.push_samples(&self.mix);

        self.frames_rendered += frames as u64;
        let now = self.current_time();
        let before = self.voices.len();
        self.voices.retain(|v| !v.is_finished(now));
        if self.voices.len() != before {
            trace!("retired {} voice(s) at {:.3}s", before - self.voices.len(), now);
        }

        &self.mix
    }

    /// Render into an interleaved output buffer with `channels` channels.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = out.len() / channels;
        let mix = self.render_block(frames);
        for (frame, &sample) in out.chunks_mut(channels).zip(mix.iter()) {
            frame.iter_mut().for_each(|s| *s = sample);
        }
    }
}
