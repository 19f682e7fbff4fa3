use std::path::Path;
use std::process;

use eframe::egui;
use furnish_core::EditorSettings;

mod app;
mod headless;
mod thumbnail;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = headless::flag_value(&args, "--config");
    let settings = match EditorSettings::from_environment(config.as_deref().map(Path::new)) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("settings error: {err}");
            process::exit(1);
        }
    };

    let (console, log_level_state) =
        app::setup_tracing(app::level_filter_from_name(settings.log_level()));

    tracing::info!("Furnish starting");

    match headless::maybe_run_headless(&args, &settings) {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(err) => {
            eprintln!("headless error: {err}");
            process::exit(1);
        }
    }

    let initial_design = headless::flag_value(&args, "--design");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };
    eframe::run_native(
        "Furnish",
        native_options,
        Box::new(move |_cc| {
            let store = app::design_store(&settings);
            let mut app = app::FurnishApp::new(settings, store, console, log_level_state);
            if let Some(id) = initial_design {
                app.open_design(&id);
            }
            Ok(Box::new(app))
        }),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
