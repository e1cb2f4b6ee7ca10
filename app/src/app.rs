use crate::config::AppConfig;
use crate::layout::{self, LayoutMode};
use crate::ui;

use eframe::egui::{self, Color32, ViewportCommand};
use eframe::{App, Frame};
use predict::{ActionError, Session, Status};
use std::path::{Path, PathBuf};

/// Colour of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Error,
}

impl StatusTone {
    pub fn colour(self) -> Color32 {
        match self {
            StatusTone::Info => Color32::from_rgb(64, 140, 112),
            StatusTone::Error => Color32::from_rgb(200, 72, 72),
        }
    }
}

/// The main application struct.
/// It owns the session state plus the widget state that only the UI needs.
pub struct PredictApp {
    // --- Core State ---
    pub session: Session,
    pub config: AppConfig,

    // --- UI State ---
    /// Text typed into the "Enter value for Feature 1/2" fields.
    pub input1: String,
    pub input2: String,
    /// The status line and its tone; empty until the first action.
    pub status: Option<(String, StatusTone)>,
    /// The rendered scatter plot and the temp PNG it was decoded from.
    pub plot: Option<(egui::TextureHandle, PathBuf)>,
    window_sized: bool,
}

impl PredictApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            session: Session::new(config.logistic_params(), config.plot_settings()),
            config,
            input1: String::new(),
            input2: String::new(),
            status: None,
            plot: None,
            window_sized: false,
        }
    }

    /// Writes the outcome of an action into the status line.
    fn report(&mut self, result: Result<Status, ActionError>) -> Option<Status> {
        match result {
            Ok(status) => {
                self.status = Some((status.to_string(), StatusTone::Info));
                Some(status)
            }
            Err(err) => {
                tracing::warn!("{err}");
                self.status = Some((err.to_string(), StatusTone::Error));
                None
            }
        }
    }

    /// "Upload CSV": pick a file and load it.
    pub fn upload(&mut self) {
        let path = rfd::FileDialog::new()
            .set_title("Select a CSV file")
            .add_filter("CSV", &["csv", "txt"])
            .add_filter("All files", &["*"])
            .pick_file();
        let result = self.session.upload(path.as_deref());
        self.report(result);
    }

    /// "Train Model".
    pub fn train(&mut self) {
        let result = self.session.train();
        self.report(result);
    }

    /// "View Graph": render the plot and swap it into the image widget.
    pub fn view_graph(&mut self, ctx: &egui::Context) {
        let result = self.session.plot();
        let Some(Status::Plotted(path)) = self.report(result) else {
            return;
        };
        match load_plot_texture(ctx, &path) {
            Ok(texture) => {
                if let Some((_, old)) = self.plot.replace((texture, path)) {
                    // Only the latest plot is ever shown.
                    remove_plot_file(&old);
                }
            }
            Err(err) => {
                let message = format!("Error while plotting graph: {err}");
                tracing::warn!("{message}");
                self.status = Some((message, StatusTone::Error));
                remove_plot_file(&path);
            }
        }
    }

    /// "Make Prediction".
    pub fn predict(&mut self) {
        let result = self.session.predict(&self.input1, &self.input2);
        self.report(result);
    }

    /// Resizes the window to a share of the display once its size is known.
    fn fit_window_to_display(&mut self, ctx: &egui::Context) {
        if self.window_sized {
            return;
        }
        if let Some(monitor) = ctx.input(|i| i.viewport().monitor_size) {
            let size = layout::initial_window_size(Some(monitor), self.config.layout.window_fraction);
            tracing::info!(?monitor, ?size, "sizing window to display");
            ctx.send_viewport_cmd(ViewportCommand::InnerSize(size));
            self.window_sized = true;
        }
    }

    /// Narrow or wide, from the display and current window width.
    pub fn layout_mode(&self, ctx: &egui::Context) -> LayoutMode {
        let monitor = ctx.input(|i| i.viewport().monitor_size);
        let width = layout::effective_width(monitor, ctx.screen_rect().width());
        LayoutMode::for_width(width, self.config.layout.narrow_width)
    }
}

impl App for PredictApp {
    /// The main update loop, called by eframe on every frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.fit_window_to_display(ctx);
        ui::draw(self, ctx);
    }
}

fn remove_plot_file(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), "could not remove old plot: {err}");
    }
}

fn load_plot_texture(ctx: &egui::Context, path: &Path) -> Result<egui::TextureHandle, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Ok(ctx.load_texture("scatter-plot", image, egui::TextureOptions::LINEAR))
}
