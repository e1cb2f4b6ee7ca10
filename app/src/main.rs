mod app;
mod config;
mod layout;
mod logging;
mod ui;

use app::PredictApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let config = config::load();

    // The display size is only known once the window exists; start from the
    // fallback display and let the app resize on its first frame.
    let initial = layout::initial_window_size(None, config.layout.window_fraction);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Predict Anything App")
            .with_inner_size(initial),
        ..Default::default()
    };
    eframe::run_native(
        "Predict Anything App",
        native_options,
        Box::new(|_cc| Ok(Box::new(PredictApp::new(config)))),
    )
}
