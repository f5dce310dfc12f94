use log::debug;

use crate::core::audio::graph::SharedGraph;
use crate::core::audio::{lock, EngineState};
use crate::error::WheelError;

/// Output sink that pulls audio from a render graph
pub trait AudioBackend {
    /// Open the output device and report its sample rate.
    fn prepare(&mut self) -> Result<u32, WheelError>;

    /// Make `graph` the render source of this sink.
    ///
    /// Returns the state the engine lands in, usually `Suspended`.
    fn attach(&mut self, graph: SharedGraph) -> Result<EngineState, WheelError>;

    /// Start pulling audio.
    fn resume(&mut self) -> Result<EngineState, WheelError>;

    fn state(&self) -> EngineState;
}

/// Backend without a device: audio is rendered on demand by the caller.
///
/// While suspended, `render` yields silence and the engine clock stands still.
pub struct OfflineBackend {
    sample_rate: u32,
    graph: Option<SharedGraph>,
    state: EngineState,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            graph: None,
            state: EngineState::Suspended,
        }
    }

    /// Render `frames` mono samples from the attached graph.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        match (&self.graph, self.state) {
            (Some(graph), EngineState::Running) => lock(graph).render_block(frames).to_vec(),
            _ => vec![0.0; frames],
        }
    }

    /// Render `seconds` of audio in blocks of `block` frames, discarding the output.
    pub fn advance(&self, seconds: f64, block: usize) {
        let total = (seconds * self.sample_rate as f64).round() as usize;
        let block = block.max(1);
        let mut done = 0;
        while done < total {
            let frames = block.min(total - done);
            self.render(frames);
            done += frames;
        }
    }
}

impl AudioBackend for OfflineBackend {
    fn prepare(&mut self) -> Result<u32, WheelError> {
        Ok(self.sample_rate)
    }

    fn attach(&mut self, graph: SharedGraph) -> Result<EngineState, WheelError> {
        self.graph = Some(graph);
        debug!("offline backend attached at {} Hz", self.sample_rate);
        Ok(self.state)
    }

    fn resume(&mut self) -> Result<EngineState, WheelError> {
        if self.graph.is_some() {
            self.state = EngineState::Running;
        }
        Ok(self.state)
    }

    fn state(&self) -> EngineState {
        self.state
    }
}
