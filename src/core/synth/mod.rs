pub mod envelope;
pub mod shepard;
pub mod tone;

pub use envelope::EnvelopeShape;
pub use shepard::{ShepardPartial, ShepardSpectrum};
pub use tone::{FmPatch, GainProfile, ToneType};

use crate::core::audio::param::AutomationParam;
use crate::core::pitch::PitchClass;
use crate::core::voice::{Generator, Modulator, Voice, VoiceId};

/// Middle C in Hz; pitch class 0 of the plain and FM tones
pub const PLAIN_BASE_HZ: f64 = 261.63;

/// Frequency of the plain and FM tones for `pitch`
pub fn plain_frequency(pitch: PitchClass) -> f64 {
    PLAIN_BASE_HZ * pitch.semitone_ratio()
}

/// Builds one fully scheduled voice per trigger
pub struct ToneSynth {
    pub gain: GainProfile,
    pub envelope: EnvelopeShape,
    pub fm: FmPatch,
    pub shepard: ShepardSpectrum,
    next_id: u64,
}

impl ToneSynth {
    pub fn new(gain: GainProfile) -> Self {
        Self {
            gain,
            envelope: EnvelopeShape::STANDARD,
            fm: FmPatch::EPIANO,
            shepard: ShepardSpectrum::default(),
            next_id: 0,
        }
    }

    /// Build a voice for `pitch` starting at engine time `start`.
    ///
    /// The voice is not connected anywhere; every event it will ever produce is
    /// already scheduled, including its stop time.
    pub fn trigger(&mut self, pitch: PitchClass, tone: ToneType, start: f64) -> Voice {
        self.next_id += 1;
        let generators = match tone {
            ToneType::Plain => self.plain_generators(pitch),
            ToneType::FmPatch => self.fm_generators(pitch, start),
            ToneType::ShepardBank => self.shepard_generators(pitch),
        };

        Voice {
            id: VoiceId(self.next_id),
            pitch,
            tone,
            start_time: start,
            stop_time: self.envelope.stop_time(start),
            envelope: self.envelope.gain_param(start),
            generators,
        }
    }

    fn plain_generators(&self, pitch: PitchClass) -> Vec<Generator> {
        vec![Generator::sine(plain_frequency(pitch), self.gain.plain)]
    }

    fn fm_generators(&self, pitch: PitchClass, start: f64) -> Vec<Generator> {
        let carrier = plain_frequency(pitch);

        let mut depth = AutomationParam::new(0.0);
        depth
            .set_value_at_time((carrier * self.fm.index) as f32, start)
            .exponential_ramp_to_value_at_time(self.fm.depth_floor, start + self.fm.depth_decay);

        let modulator = Modulator::new(carrier * self.fm.ratio, depth);
        vec![Generator::sine(carrier, self.gain.plain).with_modulator(modulator)]
    }

    fn shepard_generators(&self, pitch: PitchClass) -> Vec<Generator> {
        self.shepard
            .partials(pitch)
            .into_iter()
            .map(|p| Generator::sine(p.frequency, p.weight as f32 * self.gain.shepard))
            .collect()
    }
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self::new(GainProfile::default())
    }
}
