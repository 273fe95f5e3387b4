use std::path::Path;

use eframe::egui;
use replay::app::ReplayApp;

/// Default history location, matching the common export name.
const DEFAULT_HISTORY: &str = "spotify_history.csv";

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    // Pick up a history sitting next to the binary without a dialog.
    let default_history = Path::new(DEFAULT_HISTORY);
    let preload = default_history.exists().then_some(default_history);

    eframe::run_native(
        "Replay – Listening History Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(ReplayApp::new(preload)))),
    )
}
