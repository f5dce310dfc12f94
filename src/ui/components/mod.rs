mod wheel;

pub use wheel::{to_color32, WheelView};
