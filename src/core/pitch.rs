//! Pitch classes and their display colors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of pitch classes on the wheel
pub const PITCH_CLASS_COUNT: usize = 12;

const NAMES: [&str; PITCH_CLASS_COUNT] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const COLORS: [Rgb; PITCH_CLASS_COUNT] = [
    Rgb::new(255, 0, 0),
    Rgb::new(255, 86, 35),
    Rgb::new(255, 158, 62),
    Rgb::new(221, 177, 55),
    Rgb::new(250, 250, 44),
    Rgb::new(122, 212, 95),
    Rgb::new(72, 231, 103),
    Rgb::new(42, 128, 213),
    Rgb::new(34, 73, 146),
    Rgb::new(25, 44, 132),
    Rgb::new(95, 44, 88),
    Rgb::new(205, 22, 184),
];

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// One of the twelve semitone positions of an octave, C = 0 through B = 11
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Returns `None` when `index` is outside `0..12`.
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < PITCH_CLASS_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// All pitch classes in ascending order.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..PITCH_CLASS_COUNT as u8).map(PitchClass)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NAMES[self.0 as usize]
    }

    pub fn color(self) -> Rgb {
        COLORS[self.0 as usize]
    }

    /// Equal-tempered frequency ratio of this pitch class above C, `2^(index/12)`.
    pub fn semitone_ratio(self) -> f64 {
        2.0f64.powf(self.0 as f64 / 12.0)
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        PitchClass::new(index).ok_or_else(|| format!("pitch class {} is outside 0..12", index))
    }
}

impl From<PitchClass> for u8 {
    fn from(pitch: PitchClass) -> u8 {
        pitch.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
