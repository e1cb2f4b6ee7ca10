use crate::app::PredictApp;
use crate::layout::LayoutMode;

use eframe::egui::{self, RichText, Ui};

const TITLE: &str = "Predict Anything App";
const CONTROL_WIDTH: f32 = 240.0;

/// Draws the whole screen in the arrangement the current width calls for.
pub fn draw(app: &mut PredictApp, ctx: &egui::Context) {
    match app.layout_mode(ctx) {
        LayoutMode::Wide => {
            egui::SidePanel::left("controls_panel")
                .resizable(true)
                .default_width(CONTROL_WIDTH + 24.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        draw_controls(app, ui, ctx);
                        ui.separator();
                        draw_status(app, ui);
                    });
                });
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::both().show(ui, |ui| draw_plot(app, ui));
            });
        }
        LayoutMode::Narrow => {
            egui::CentralPanel::default().show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.spacing_mut().item_spacing.y = 10.0;
                        draw_controls(app, ui, ctx);
                        draw_plot(app, ui);
                        draw_status(app, ui);
                    });
                });
            });
        }
    }
}

/// Title, upload, the three selectors, train, prediction inputs and the
/// graph button, in that order.
fn draw_controls(app: &mut PredictApp, ui: &mut Ui, ctx: &egui::Context) {
    ui.heading(RichText::new(TITLE).size(20.0).strong());
    ui.add_space(4.0);

    if ui.button("Upload CSV").clicked() {
        app.upload();
    }

    let columns = app.session.columns().to_vec();
    let selection = &mut app.session.selection;
    column_selector(ui, "Feature 1", &columns, &mut selection.feature1);
    column_selector(ui, "Feature 2", &columns, &mut selection.feature2);
    column_selector(ui, "Target", &columns, &mut selection.target);

    if ui.button("Train Model").clicked() {
        app.train();
    }

    ui.label("Enter value for Feature 1");
    ui.add(
        egui::TextEdit::singleline(&mut app.input1)
            .hint_text(feature_hint(&app.session.selection.feature1))
            .desired_width(CONTROL_WIDTH),
    );
    ui.label("Enter value for Feature 2");
    ui.add(
        egui::TextEdit::singleline(&mut app.input2)
            .hint_text(feature_hint(&app.session.selection.feature2))
            .desired_width(CONTROL_WIDTH),
    );

    if ui.button("Make Prediction").clicked() {
        app.predict();
    }
    if ui.button("View Graph").clicked() {
        app.view_graph(ctx);
    }
}

fn feature_hint(selected: &Option<String>) -> String {
    selected.clone().unwrap_or_default()
}

/// A labelled drop-down over the loaded column names.
fn column_selector(ui: &mut Ui, label: &str, columns: &[String], value: &mut Option<String>) {
    ui.label(label);
    egui::ComboBox::from_id_salt(label)
        .width(CONTROL_WIDTH)
        .selected_text(value.as_deref().unwrap_or("Select a column"))
        .show_ui(ui, |ui| {
            for column in columns {
                ui.selectable_value(value, Some(column.clone()), column);
            }
        });
}

fn draw_plot(app: &PredictApp, ui: &mut Ui) {
    if let Some((texture, _)) = &app.plot {
        ui.add(egui::Image::new(texture).max_width(ui.available_width()));
    }
}

fn draw_status(app: &PredictApp, ui: &mut Ui) {
    if let Some((text, tone)) = &app.status {
        ui.colored_label(tone.colour(), text);
    }
}
