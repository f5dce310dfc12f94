use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::audio::lock;

pub const DEFAULT_FFT_SIZE: usize = 256;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

/// Byte value of a zero crossing in the time-domain buffer
pub const BYTE_ZERO: u8 = 128;

/// Keeps the most recent `fft_size` samples of the bus for metering
pub struct Analyzer {
    window: VecDeque<f32>,
    fft_size: usize,
}

impl Analyzer {
    pub fn new(fft_size: usize) -> Self {
        Self {
            window: std::iter::repeat(0.0).take(fft_size).collect(),
            fft_size,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Length of the buffer a meter reads each frame.
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn push_samples(&mut self, samples: &[f32]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &sample in &samples[skip..] {
            if self.window.len() == self.fft_size {
                self.window.pop_front();
            }
            self.window.push_back(sample);
        }
    }

    /// Fill `out` with 8-bit time-domain data, oldest sample of the window first.
    ///
    /// Each byte is `128 * (1 + sample)` clamped to `0..=255`.
    pub fn byte_time_domain_data(&self, out: &mut [u8]) {
        for (byte, &sample) in out.iter_mut().zip(self.window.iter()) {
            *byte = (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Shared read handle onto the route's analyzer
#[derive(Clone)]
pub struct AnalyzerTap {
    inner: Arc<Mutex<Analyzer>>,
}

impl AnalyzerTap {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analyzer)),
        }
    }

    pub fn push_samples(&self, samples: &[f32]) {
        lock(&self.inner).push_samples(samples);
    }

    /// Copy of the current time-domain bytes, `frequency_bin_count` long.
    pub fn snapshot(&self) -> Vec<u8> {
        let analyzer = lock(&self.inner);
        let mut bytes = vec![BYTE_ZERO; analyzer.frequency_bin_count()];
        analyzer.byte_time_domain_data(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_reads_as_zero_crossing() {
        let analyzer = Analyzer::new(DEFAULT_FFT_SIZE);
        let mut bytes = vec![0u8; analyzer.frequency_bin_count()];
        analyzer.byte_time_domain_data(&mut bytes);
        assert_eq!(bytes.len(), 128);
        assert!(bytes.iter().all(|&b| b == BYTE_ZERO));
    }

    #[test]
    fn test_byte_conversion_clamps() {
        let mut analyzer = Analyzer::new(32);
        analyzer.push_samples(&[1.0; 32]);
        analyzer.push_samples(&[-1.5, 0.5]);
        let mut bytes = vec![0u8; 32];
        analyzer.byte_time_domain_data(&mut bytes);
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes[30], 0);
        assert_eq!(bytes[31], 192);
    }

    #[test]
    fn test_window_keeps_latest_samples() {
        let mut analyzer = Analyzer::new(32);
        let ramp: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        analyzer.push_samples(&ramp);
        let mut bytes = vec![0u8; 32];
        analyzer.byte_time_domain_data(&mut bytes);
        // First byte of the window corresponds to sample 68
        assert_eq!(bytes[0], (128.0f32 * 1.68).floor() as u8);
    }

    #[test]
    fn test_tap_snapshot_length() {
        let tap = AnalyzerTap::new(Analyzer::new(DEFAULT_FFT_SIZE));
        tap.push_samples(&[0.25; 10]);
        assert_eq!(tap.snapshot().len(), DEFAULT_FFT_SIZE / 2);
    }
}
