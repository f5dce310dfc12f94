use anyhow::Result;
use clap::Parser;
use eframe::egui;
use log::info;

use chroma_wheel::app::WheelApp;
use chroma_wheel::cli::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.resolve_config()?;
    info!("Starting chroma wheel");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([480.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chroma Wheel",
        options,
        Box::new(move |_cc| Ok(Box::new(WheelApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))
}
