pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod messaging;
pub mod ui;
pub mod utils;

pub use config::WheelConfig;
pub use error::WheelError;
