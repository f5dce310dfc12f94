//! Placement of the twelve pads on the ring

use serde::{Deserialize, Serialize};

use crate::core::pitch::{PitchClass, PITCH_CLASS_COUNT};

/// Angle between neighbouring pads in degrees
pub const ANGLE_STEP_DEG: f64 = 360.0 / PITCH_CLASS_COUNT as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn step(self) -> i32 {
        match self {
            RotateDirection::Left => -1,
            RotateDirection::Right => 1,
        }
    }
}

/// Ring dimensions in layout units; the default fits a 320×320 box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingGeometry {
    pub radius: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub pad_radius: f64,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            radius: 130.0,
            center_x: 160.0,
            center_y: 160.0,
            pad_radius: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadPlacement {
    pub pitch: PitchClass,
    pub angle_deg: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RingLayout {
    pub geometry: RingGeometry,
    rotation_offset: i32,
}

impl RingLayout {
    pub fn new(geometry: RingGeometry) -> Self {
        Self {
            geometry,
            rotation_offset: 0,
        }
    }

    pub fn rotation_offset(&self) -> i32 {
        self.rotation_offset
    }

    pub fn rotate(&mut self, direction: RotateDirection) {
        self.rotation_offset += direction.step();
    }

    /// Screen angle of a pad; pitch classes run counter-clockwise from the top.
    pub fn angle_deg(&self, pitch: PitchClass) -> f64 {
        -90.0 - pitch.index() as f64 * ANGLE_STEP_DEG + self.rotation_offset as f64 * ANGLE_STEP_DEG
    }

    /// Center of the pad for `pitch`.
    pub fn position(&self, pitch: PitchClass) -> (f64, f64) {
        let angle = self.angle_deg(pitch).to_radians();
        (
            self.geometry.center_x + self.geometry.radius * angle.cos(),
            self.geometry.center_y + self.geometry.radius * angle.sin(),
        )
    }

    pub fn pads(&self) -> Vec<PadPlacement> {
        PitchClass::all()
            .map(|pitch| {
                let (x, y) = self.position(pitch);
                PadPlacement {
                    pitch,
                    angle_deg: self.angle_deg(pitch),
                    x,
                    y,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_step_is_thirty_degrees() {
        assert_eq!(ANGLE_STEP_DEG, 30.0);
        let layout = RingLayout::default();
        assert_eq!(layout.angle_deg(PitchClass::C), -90.0);
        assert_eq!(layout.angle_deg(PitchClass::new(3).unwrap()), -180.0);
    }

    #[test]
    fn test_c_sits_at_the_top() {
        let layout = RingLayout::default();
        let (x, y) = layout.position(PitchClass::C);
        assert!((x - 160.0).abs() < 1e-9);
        assert!((y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_is_invertible() {
        let mut layout = RingLayout::default();
        let before: Vec<f64> = layout.pads().iter().map(|p| p.angle_deg).collect();

        layout.rotate(RotateDirection::Right);
        let rotated: Vec<f64> = layout.pads().iter().map(|p| p.angle_deg).collect();
        for (a, b) in before.iter().zip(rotated.iter()) {
            assert_eq!(b - a, 30.0);
        }

        layout.rotate(RotateDirection::Left);
        let after: Vec<f64> = layout.pads().iter().map(|p| p.angle_deg).collect();
        assert_eq!(before, after);
        assert_eq!(layout.rotation_offset(), 0);
    }

    #[test]
    fn test_full_turn_maps_pads_onto_themselves() {
        let mut layout = RingLayout::default();
        let start = layout.position(PitchClass::new(4).unwrap());
        for _ in 0..12 {
            layout.rotate(RotateDirection::Left);
        }
        let end = layout.position(PitchClass::new(4).unwrap());
        assert!((start.0 - end.0).abs() < 1e-9 && (start.1 - end.1).abs() < 1e-9);
    }
}
