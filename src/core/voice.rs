use std::f64::consts::TAU;
use std::fmt;

use crate::core::audio::param::AutomationParam;
use crate::core::pitch::PitchClass;
use crate::core::synth::ToneType;

/// Unique id of one note press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// Sine modulator whose output is added to a carrier's frequency (in Hz)
#[derive(Debug, Clone)]
pub struct Modulator {
    pub frequency: f64,
    pub depth: AutomationParam,
    phase: f64,
}

impl Modulator {
    pub fn new(frequency: f64, depth: AutomationParam) -> Self {
        Self {
            frequency,
            depth,
            phase: 0.0,
        }
    }

    fn next(&mut self, t: f64, sample_rate: f64) -> f64 {
        let out = (TAU * self.phase).sin() * self.depth.value_at(t) as f64;
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        out
    }
}

/// One sine generator with its own gain stage
#[derive(Debug, Clone)]
pub struct Generator {
    pub frequency: f64,
    pub gain: f32,
    pub modulator: Option<Modulator>,
    phase: f64,
}

impl Generator {
    pub fn sine(frequency: f64, gain: f32) -> Self {
        Self {
            frequency,
            gain,
            modulator: None,
            phase: 0.0,
        }
    }

    pub fn with_modulator(mut self, modulator: Modulator) -> Self {
        self.modulator = Some(modulator);
        self
    }

    fn next(&mut self, t: f64, sample_rate: f64) -> f32 {
        let mut frequency = self.frequency;
        if let Some(modulator) = self.modulator.as_mut() {
            frequency += modulator.next(t, sample_rate);
        }
        let out = (TAU * self.phase).sin() as f32 * self.gain;
        self.phase = (self.phase + frequency / sample_rate).rem_euclid(1.0);
        out
    }
}

/// Snapshot of a scheduled voice
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    pub id: VoiceId,
    pub pitch: PitchClass,
    pub tone: ToneType,
    pub start_time: f64,
    pub stop_time: f64,
    /// (frequency, gain) of every generator
    pub generators: Vec<(f64, f32)>,
    pub modulator_frequency: Option<f64>,
}

/// A transient sound unit created by one trigger.
///
/// Renders nothing outside `[start_time, stop_time)` and is retired by the
/// render graph once the engine clock passes `stop_time`.
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: VoiceId,
    pub pitch: PitchClass,
    pub tone: ToneType,
    pub start_time: f64,
    pub stop_time: f64,
    pub envelope: AutomationParam,
    pub generators: Vec<Generator>,
}

impl Voice {
    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.stop_time
    }

    pub fn info(&self) -> VoiceInfo {
        VoiceInfo {
            id: self.id,
            pitch: self.pitch,
            tone: self.tone,
            start_time: self.start_time,
            stop_time: self.stop_time,
            generators: self
                .generators
                .iter()
                .map(|g| (g.frequency, g.gain))
                .collect(),
            modulator_frequency: self
                .generators
                .iter()
                .find_map(|g| g.modulator.as_ref().map(|m| m.frequency)),
        }
    }

    /// Mix this voice into `out`, whose first sample sits at `block_start` seconds.
    pub fn render_into(&mut self, out: &mut [f32], block_start: f64, sample_rate: u32) {
        let sr = sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            let t = block_start + i as f64 / sr;
            if t < self.start_time || t >= self.stop_time {
                continue;
            }
            let level = self.envelope.value_at(t);
            let mut sum = 0.0;
            for generator in self.generators.iter_mut() {
                sum += generator.next(t, sr);
            }
            *sample += sum * level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::synth::ToneSynth;

    const SR: u32 = 44100;

    fn constant_voice(start: f64, stop: f64) -> Voice {
        Voice {
            id: VoiceId(1),
            pitch: PitchClass::C,
            tone: ToneType::Plain,
            start_time: start,
            stop_time: stop,
            envelope: AutomationParam::new(1.0),
            generators: vec![Generator::sine(1000.0, 0.5)],
        }
    }

    #[test]
    fn test_silent_outside_lifetime() {
        let mut voice = constant_voice(0.01, 0.02);
        let mut out = vec![0.0; 1000];
        voice.render_into(&mut out, 0.0, 1000);

        assert!(out[..10].iter().all(|&s| s == 0.0));
        assert!(out[20..].iter().all(|&s| s == 0.0));
        // 1 kHz at 1 kHz sample rate lands on zero crossings only
        assert!(out[10..20].iter().all(|&s| s.abs() < 1e-3));
    }

    #[test]
    fn test_amplitude_follows_gain() {
        let mut voice = constant_voice(0.0, 1.0);
        let mut out = vec![0.0; 44100];
        voice.render_into(&mut out, 0.0, 44100);
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-3, "peak: {}", peak);
    }

    #[test]
    fn test_finished_at_stop_time() {
        let voice = constant_voice(0.0, 3.5);
        assert!(!voice.is_finished(3.49));
        assert!(voice.is_finished(3.5));
    }

    #[test]
    fn test_info_reports_modulator() {
        let mut voice = constant_voice(0.0, 1.0);
        voice.generators[0] = Generator::sine(100.0, 0.4)
            .with_modulator(Modulator::new(400.0, AutomationParam::new(150.0)));
        let info = voice.info();
        assert_eq!(info.generators, vec![(100.0, 0.4)]);
        assert_eq!(info.modulator_frequency, Some(400.0));
    }

    fn render(tone: ToneType, seconds: f64) -> Vec<f32> {
        let mut voice = ToneSynth::default().trigger(PitchClass::C, tone, 0.0);
        let mut out = vec![0.0; (seconds * SR as f64) as usize];
        voice.render_into(&mut out, 0.0, SR);
        out
    }

    fn window(samples: &[f32], from: f64, to: f64) -> &[f32] {
        &samples[(from * SR as f64) as usize..(to * SR as f64) as usize]
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn test_fm_modulates_carrier_then_settles() {
        let plain = render(ToneType::Plain, 2.0);
        let fm = render(ToneType::FmPatch, 2.0);

        // Depth starts at 1.5x the carrier, so the instantaneous frequency swings negative
        assert!(fm.iter().all(|s| s.is_finite()));
        let peak = fm.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.4 + 1e-4, "peak: {}", peak);

        let early: f32 = window(&fm, 0.0, 0.1)
            .iter()
            .zip(window(&plain, 0.0, 0.1))
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(early > 10.0, "early difference: {}", early);

        // Past 0.5 s the depth rests at 0.01 Hz: same pitch and level, only a phase offset
        let (fm_tail, plain_tail) = (window(&fm, 1.0, 2.0), window(&plain, 1.0, 2.0));
        let crossings = zero_crossings(fm_tail) as i64 - zero_crossings(plain_tail) as i64;
        assert!(crossings.abs() <= 1, "crossing difference: {}", crossings);
        let (a, b) = (rms(fm_tail), rms(plain_tail));
        assert!((a - b).abs() / b < 0.01, "rms {} vs {}", a, b);
    }
}
