#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
fn main() -> eframe::Result {
    use eframe::egui;
    use projector_switch::app::ControlPanel;
    use projector_switch::config::{AppConfig, SINGLE_INSTANCE_NAME};
    use projector_switch::platform::Win32Desktop;
    use projector_switch::platform::instance::SingleInstance;
    use projector_switch::settings::SettingsStore;
    use projector_switch::ui::{ProjectorApp, WINDOW_TITLE};

    projector_switch::logging::init();

    let instance = match SingleInstance::acquire(SINGLE_INSTANCE_NAME) {
        Ok(Some(instance)) => instance,
        Ok(None) => {
            tracing::info!("another instance is already running");
            return Ok(());
        }
        Err(e) => {
            tracing::error!("single-instance check failed: {e}");
            return Ok(());
        }
    };

    let config = AppConfig::in_current_dir();
    let store = SettingsStore::open(&config.settings_path);
    let name_format = store.display_name_format();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([360.0, 150.0])
            .with_min_inner_size([300.0, 130.0])
            .with_window_level(egui::WindowLevel::AlwaysOnTop),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            let panel = ControlPanel::new(config, Win32Desktop::new(), store, name_format);
            Ok(Box::new(ProjectorApp::new(panel, instance)))
        }),
    )
}

#[cfg(not(windows))]
fn main() {
    projector_switch::logging::init();
    tracing::error!("projector switch only runs on Windows");
    std::process::exit(1);
}
