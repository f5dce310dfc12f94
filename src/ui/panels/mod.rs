mod controls;

pub use controls::{ControlsPanel, StartOverlay};
