use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, Stream};
use log::{error, info, warn};

use crate::core::audio::graph::SharedGraph;
use crate::core::audio::{lock, AudioBackend, EngineState};
use crate::error::WheelError;

/// Default output device through cpal
pub struct CpalBackend {
    device: Option<cpal::Device>,
    config: Option<cpal::SupportedStreamConfig>,
    stream: Option<Stream>,
    state: EngineState,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            device: None,
            config: None,
            stream: None,
            state: EngineState::Suspended,
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn prepare(&mut self) -> Result<u32, WheelError> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = host
            .default_output_device()
            .ok_or(WheelError::NoOutputDevice)?;
        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| WheelError::DeviceConfig(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        info!("Device config: {:?}", config);

        self.device = Some(device);
        self.config = Some(config);
        Ok(sample_rate)
    }

    fn attach(&mut self, graph: SharedGraph) -> Result<EngineState, WheelError> {
        let (Some(device), Some(config)) = (self.device.as_ref(), self.config.as_ref()) else {
            return Err(WheelError::NotRunning(self.state));
        };

        let sample_format = config.sample_format();
        let stream_config = cpal::StreamConfig::from(config.clone());
        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(device, &stream_config, graph),
            SampleFormat::I16 => create_stream::<i16>(device, &stream_config, graph),
            SampleFormat::U16 => create_stream::<u16>(device, &stream_config, graph),
            other => Err(WheelError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        // Some hosts start streams as soon as they are built.
        if let Err(e) = stream.pause() {
            warn!("Could not hold the output stream until activation: {}", e);
        }
        self.stream = Some(stream);
        self.state = EngineState::Suspended;
        Ok(self.state)
    }

    fn resume(&mut self) -> Result<EngineState, WheelError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or(WheelError::NotRunning(self.state))?;
        stream
            .play()
            .map_err(|e| WheelError::StreamPlay(e.to_string()))?;
        self.state = EngineState::Running;
        info!("Audio stream started");
        Ok(self.state)
    }

    fn state(&self) -> EngineState {
        self.state
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    graph: SharedGraph,
) -> Result<Stream, WheelError>
where
    T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();
    let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                lock(&graph).render_interleaved(&mut scratch, channels);
                for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(sample);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| WheelError::StreamBuild(e.to_string()))
}
