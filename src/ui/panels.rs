use eframe::egui;
use egui_phosphor::regular;

use super::ProjectorApp;

// ─── Display picker ──────────────────────────────────────────────────────────

pub fn draw_display_picker(app: &mut ProjectorApp, ui: &mut egui::Ui) {
    let labels = app.panel.display_labels();
    let selected_text = app
        .panel
        .selected_label()
        .unwrap_or_else(|| "Select projector display…".into());

    let mut chosen: Option<usize> = None;
    ui.horizontal(|ui| {
        ui.label(regular::PROJECTOR_SCREEN);
        egui::ComboBox::from_id_salt("projector_display")
            .selected_text(selected_text)
            .width(ui.available_width() - 36.0)
            .show_ui(ui, |ui| {
                if labels.is_empty() {
                    ui.label(
                        egui::RichText::new("No displays detected")
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                }
                for (i, label) in labels.iter().enumerate() {
                    let is_selected = app.panel.selected == Some(i);
                    if ui
                        .selectable_label(is_selected, format!("{} {label}", regular::MONITOR))
                        .clicked()
                    {
                        chosen = Some(i);
                    }
                }
            });

        if ui
            .button(regular::ARROWS_CLOCKWISE)
            .on_hover_text("Refresh displays")
            .clicked()
        {
            app.panel.refresh_displays();
        }
    });

    if let Some(i) = chosen {
        app.panel.select_display(i);
    }
}

// ─── Toggle button ───────────────────────────────────────────────────────────

/// Returns true when the toggle ran this frame.
pub fn draw_toggle_button(app: &mut ProjectorApp, ui: &mut egui::Ui) -> bool {
    let label = format!(
        "{} Toggle {} Window",
        regular::SWAP,
        app.panel.controller().target().display_name
    );
    let button = egui::Button::new(egui::RichText::new(label).size(15.0))
        .min_size(egui::vec2(ui.available_width(), 36.0));

    let response = ui
        .add_enabled(app.panel.can_toggle(), button)
        .on_disabled_hover_text("Pick the projector display first");
    if response.clicked() {
        app.panel.toggle();
        return true;
    }
    false
}

// ─── Status Bar ──────────────────────────────────────────────────────────────

pub fn draw_status_bar(app: &ProjectorApp, ui: &mut egui::Ui) {
    let status = &app.panel.status;
    let color = if status.starts_with('✅') {
        egui::Color32::LIGHT_GREEN
    } else if status.starts_with('❌') {
        egui::Color32::LIGHT_RED
    } else if status.starts_with('⚠') {
        egui::Color32::YELLOW
    } else {
        egui::Color32::GRAY
    };
    egui::Frame::new()
        .inner_margin(egui::Margin::same(6))
        .corner_radius(egui::CornerRadius::same(4))
        .fill(egui::Color32::from_gray(30))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(status).small().color(color));
        });
}
