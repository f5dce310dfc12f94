use std::sync::{Arc, Mutex, OnceLock};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::analyzer::{Analyzer, AnalyzerTap, DEFAULT_FFT_SIZE, MAX_FFT_SIZE, MIN_FFT_SIZE};
use crate::core::audio::graph::{BusStage, RenderGraph, SharedGraph};
use crate::core::audio::limiter::LimiterSettings;
use crate::core::audio::{lock, AudioBackend, EngineState};
use crate::core::voice::Voice;
use crate::error::WheelError;

/// Lifecycle of the persistent signal path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Uninitialized,
    Suspended,
    Running,
}

impl From<EngineState> for RouteState {
    fn from(state: EngineState) -> Self {
        match state {
            EngineState::Running => RouteState::Running,
            EngineState::Suspended | EngineState::Closed => RouteState::Suspended,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Bus limiter; `None` routes voices through a flat gain stage instead
    pub limiter: Option<LimiterSettings>,
    pub fft_size: usize,
    pub flat_gain: f32,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            limiter: Some(LimiterSettings::default()),
            fft_size: DEFAULT_FFT_SIZE,
            flat_gain: 1.0,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<(), WheelError> {
        if !self.fft_size.is_power_of_two()
            || self.fft_size < MIN_FFT_SIZE
            || self.fft_size > MAX_FFT_SIZE
        {
            return Err(WheelError::InvalidConfig(format!(
                "fft_size must be a power of two in {}..={}, got {}",
                MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
            )));
        }
        if let Some(limiter) = &self.limiter {
            if limiter.ratio < 1.0 || limiter.attack < 0.0 || limiter.release < 0.0 {
                return Err(WheelError::InvalidConfig(format!(
                    "limiter ratio must be >= 1 and times non-negative: {:?}",
                    limiter
                )));
            }
        }
        Ok(())
    }
}

/// Limiter (or flat gain) → analyser → output sink, built once on first activation.
pub struct AudioRoute<B: AudioBackend> {
    backend: B,
    config: RouteConfig,
    graph: Option<SharedGraph>,
    analyzer: Arc<OnceLock<AnalyzerTap>>,
    attached: bool,
    state: RouteState,
    constructions: u32,
}

impl<B: AudioBackend> AudioRoute<B> {
    pub fn new(backend: B, config: RouteConfig) -> Self {
        Self {
            backend,
            config,
            graph: None,
            analyzer: Arc::new(OnceLock::new()),
            attached: false,
            state: RouteState::Uninitialized,
            constructions: 0,
        }
    }

    /// Build the route if needed and bring the engine to `Running`.
    pub fn activate(&mut self) -> Result<RouteState, WheelError> {
        if self.graph.is_none() {
            self.construct()?;
        }

        if !self.attached {
            let graph = self.graph.as_ref().map(Arc::clone).ok_or(WheelError::NotRunning(
                self.backend.state(),
            ))?;
            let state = self.backend.attach(graph)?;
            self.attached = true;
            self.state = state.into();
            debug!("route attached, engine reports {:?}", state);
        }

        if self.state != RouteState::Running {
            let state = self.backend.resume()?;
            self.state = state.into();
        }

        if self.state == RouteState::Running {
            Ok(self.state)
        } else {
            Err(WheelError::NotRunning(self.backend.state()))
        }
    }

    fn construct(&mut self) -> Result<(), WheelError> {
        let sample_rate = self.backend.prepare()?;
        let bus = BusStage::new(self.config.limiter, self.config.flat_gain, sample_rate);
        let tap = AnalyzerTap::new(Analyzer::new(self.config.fft_size));

        info!(
            "Building audio route at {} Hz ({})",
            sample_rate,
            if bus.has_limiter() { "limiter" } else { "flat gain" }
        );
        let graph = RenderGraph::new(sample_rate, bus, tap.clone());
        self.graph = Some(Arc::new(Mutex::new(graph)));
        // The slot is only ever filled here, and construct runs once.
        let _ = self.analyzer.set(tap);
        self.constructions += 1;
        Ok(())
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RouteState::Running
    }

    /// How many times the signal path has been built (0 or 1).
    pub fn constructions(&self) -> u32 {
        self.constructions
    }

    /// Slot that holds the analyser once the route exists.
    pub fn analyzer_slot(&self) -> Arc<OnceLock<AnalyzerTap>> {
        Arc::clone(&self.analyzer)
    }

    pub fn graph(&self) -> Option<&SharedGraph> {
        self.graph.as_ref()
    }

    /// Engine time, if the route has been built.
    pub fn current_time(&self) -> Option<f64> {
        self.graph.as_ref().map(|g| lock(g).current_time())
    }

    pub fn active_voices(&self) -> usize {
        self.graph.as_ref().map_or(0, |g| lock(g).active_voices())
    }

    /// Hand a voice to the render graph. Returns false when there is no graph.
    pub fn connect(&self, voice: Voice) -> bool {
        match &self.graph {
            Some(graph) => {
                lock(graph).connect(voice);
                true
            }
            None => false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::OfflineBackend;

    #[test]
    fn test_activation_lifecycle() {
        let mut route = AudioRoute::new(OfflineBackend::new(8000), RouteConfig::default());
        assert_eq!(route.state(), RouteState::Uninitialized);
        assert!(route.analyzer_slot().get().is_none());
        assert_eq!(route.current_time(), None);

        assert_eq!(route.activate().unwrap(), RouteState::Running);
        assert!(route.analyzer_slot().get().is_some());
        assert_eq!(route.constructions(), 1);

        route.activate().unwrap();
        assert_eq!(route.constructions(), 1);
    }

    #[test]
    fn test_limiter_presence_follows_config() {
        let config = RouteConfig {
            limiter: None,
            ..RouteConfig::default()
        };
        let mut route = AudioRoute::new(OfflineBackend::new(8000), config);
        route.activate().unwrap();
        let graph = route.graph().unwrap();
        assert!(!lock(graph).bus().has_limiter());
    }

    #[test]
    fn test_validate_fft_size() {
        let bad = RouteConfig {
            fft_size: 100,
            ..RouteConfig::default()
        };
        assert!(bad.validate().is_err());
        assert!(RouteConfig::default().validate().is_ok());
    }
}
