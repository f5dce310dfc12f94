//! The session context owning the route, readiness gate and indicator state

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::config::WheelConfig;
use crate::core::audio::route::AudioRoute;
use crate::core::audio::{lock, AudioBackend};
use crate::core::pitch::{PitchClass, Rgb};
use crate::core::synth::{ToneSynth, ToneType};
use crate::core::visualization::feedback::indicator_channel;
use crate::core::visualization::{
    FeedbackHandle, FeedbackLoop, IndicatorFrame, LevelMeter, MeterConfig, VisualState,
};
use crate::core::voice::VoiceInfo;
use crate::error::WheelError;
use crate::messaging::DisplayEvent;
use crate::utils::helpers::format_time;

/// Whether triggers are honored
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// Waiting for the activation gesture
    Pending,
    Ready,
    /// Activation failed; the gate stays closed until a retry succeeds
    Failed(String),
}

pub struct WheelSession<B: AudioBackend> {
    route: AudioRoute<B>,
    synth: ToneSynth,
    visual: Arc<Mutex<VisualState>>,
    readiness: Readiness,
    display: Sender<DisplayEvent>,
    frames: (Sender<IndicatorFrame>, Receiver<IndicatorFrame>),
    meter: MeterConfig,
    feedback: Option<FeedbackHandle>,
    max_voices: Option<usize>,
}

impl<B: AudioBackend> WheelSession<B> {
    pub fn new(backend: B, config: &WheelConfig, display: Sender<DisplayEvent>) -> Self {
        Self {
            route: AudioRoute::new(backend, config.route.clone()),
            synth: ToneSynth::new(config.synth.gain),
            visual: Arc::new(Mutex::new(VisualState::default())),
            readiness: Readiness::Pending,
            display,
            frames: indicator_channel(),
            meter: config.meter.clone(),
            feedback: None,
            max_voices: config.synth.max_voices,
        }
    }

    /// Build and resume the audio route, then start the level meter.
    ///
    /// Calling again once ready is a no-op.
    pub fn activate(&mut self) -> Result<(), WheelError> {
        if self.is_ready() {
            return Ok(());
        }

        if let Err(e) = self.route.activate() {
            warn!("Audio engine unavailable: {}", e);
            self.set_readiness(Readiness::Failed(e.to_string()));
            return Err(e);
        }

        if self.feedback.is_none() {
            let feedback = FeedbackLoop::new(
                LevelMeter::new(&self.meter),
                Arc::clone(&self.visual),
                self.route.analyzer_slot(),
                self.frames.0.clone(),
                Duration::from_millis(self.meter.frame_interval_ms),
            );
            match feedback.spawn() {
                Ok(handle) => self.feedback = Some(handle),
                // The meter is visual only; sound still works without it.
                Err(e) => warn!("{}", e),
            }
        }

        info!("Session ready");
        self.set_readiness(Readiness::Ready);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready && self.route.is_running()
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Trigger `pitch` with its own table color.
    pub fn trigger(&mut self, pitch: PitchClass, tone: ToneType) -> Option<VoiceInfo> {
        self.trigger_with_color(pitch, tone, pitch.color())
    }

    /// Start a voice now and make `color` the indicator color.
    ///
    /// Returns `None`, with no side effects, when the session is not ready or
    /// the voice cap is reached.
    pub fn trigger_with_color(
        &mut self,
        pitch: PitchClass,
        tone: ToneType,
        color: Rgb,
    ) -> Option<VoiceInfo> {
        if !self.is_ready() {
            debug!("dropping {} trigger: engine not ready", pitch);
            return None;
        }
        if let Some(cap) = self.max_voices {
            if self.route.active_voices() >= cap {
                debug!("dropping {} trigger: {} voices sounding", pitch, cap);
                return None;
            }
        }

        let now = self.route.current_time()?;
        let voice = self.synth.trigger(pitch, tone, now);
        let info = voice.info();
        if !self.route.connect(voice) {
            return None;
        }
        debug!("{} {} ({}) at {}", info.id, pitch, tone, format_time(now));

        lock(&self.visual).active_color = color;
        let _ = self.display.send(DisplayEvent::ColorUpdate(color));
        Some(info)
    }

    /// Snapshot of the indicator state.
    pub fn visual_state(&self) -> VisualState {
        *lock(&self.visual)
    }

    pub fn route(&self) -> &AudioRoute<B> {
        &self.route
    }

    /// Latest indicator frame from the level meter; holds at most one.
    ///
    /// Color and readiness changes go through the lossless display channel instead.
    pub fn indicator_frames(&self) -> Receiver<IndicatorFrame> {
        self.frames.1.clone()
    }

    pub fn is_metering(&self) -> bool {
        self.feedback.as_ref().is_some_and(FeedbackHandle::is_running)
    }

    /// Stop the level meter. The route itself lives until the session is dropped.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.feedback.take() {
            handle.stop();
        }
    }

    fn set_readiness(&mut self, readiness: Readiness) {
        if self.readiness != readiness {
            self.readiness = readiness.clone();
            let _ = self.display.send(DisplayEvent::Readiness(readiness));
        }
    }
}

impl<B: AudioBackend> Drop for WheelSession<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
