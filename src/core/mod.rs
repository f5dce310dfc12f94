pub mod analyzer;
pub mod audio;
pub mod layout;
pub mod pitch;
pub mod session;
pub mod synth;
pub mod visualization;
pub mod voice;

pub use session::{Readiness, WheelSession};
