mod config;
mod engine;
mod model;
mod speech;
mod ui;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load_config();
    log::info!("Narrator endpoint: {} (model {})", config.endpoint, config.model);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    let app = match ui::app::MyApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start: {e:#}");
            return Err(eframe::Error::AppCreation(e.into()));
        }
    };

    eframe::run_native(
        "Narrative Adventure",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
