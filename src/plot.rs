//! Scatter plot rendering.
//!
//! The plot is drawn with `plotters` into a PNG that lives in the OS temp
//! directory. The file is kept after rendering so the UI can load it.

use crate::validation::ValidSelection;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use predict_helpers::{Table, TableError};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of bands drawn in a continuous colour bar.
const COLOUR_BAR_STEPS: usize = 128;
const COLOUR_BAR_WIDTH: i32 = 170;
const BAR_LABEL_FONT: (&str, u32) = ("sans-serif", 14);
const BAR_DESC_FONT: (&str, u32) = ("sans-serif", 16);
const POINT_RADIUS: i32 = 5;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("there are no rows to plot")]
    NoRows,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("could not create the image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Draw(String),
}

fn draw_err(err: impl Display) -> PlotError {
    PlotError::Draw(err.to_string())
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        // An 8 x 6 inch figure at 100 dpi.
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// How target values map onto the viridis scale.
#[derive(Debug, Clone, PartialEq)]
enum ColourScale {
    /// Numeric targets, coloured by value between `min` and `max`.
    Continuous { min: f64, max: f64 },
    /// Non-numeric targets, coloured by their index in the sorted classes.
    Categorical(Vec<String>),
}

impl ColourScale {
    fn bounds(&self) -> (f64, f64) {
        match self {
            ColourScale::Continuous { min, max } => (*min, *max),
            ColourScale::Categorical(classes) => (0.0, classes.len().saturating_sub(1) as f64),
        }
    }

    fn colour(&self, value: f64) -> RGBColor {
        let (min, max) = self.bounds();
        let t = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        ViridisRGB.get_color_normalized(t as f32, 0.0, 1.0)
    }

    /// Axis range of the colour bar.
    fn bar_range(&self) -> (f64, f64) {
        match self {
            ColourScale::Continuous { min, max } if max > min => (*min, *max),
            ColourScale::Continuous { min, .. } => (min - 0.5, min + 0.5),
            ColourScale::Categorical(classes) => (-0.5, classes.len() as f64 - 0.5),
        }
    }
}

/// Resolves the colour value of every row plus the scale they live on.
fn colour_values(table: &Table, target: &str) -> Result<(Vec<f64>, ColourScale), PlotError> {
    match table.numeric_column(target) {
        Ok(values) => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Ok((values, ColourScale::Continuous { min, max }))
        }
        Err(TableError::NotNumeric { .. }) => {
            let labels = table.label_column(target)?;
            let classes: Vec<String> = labels
                .iter()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            let values = labels
                .iter()
                .map(|label| classes.iter().position(|c| c == label).unwrap_or_default() as f64)
                .collect();
            Ok((values, ColourScale::Categorical(classes)))
        }
        Err(err) => Err(err.into()),
    }
}

/// Data range padded by 5% on each side; a flat range is widened by one.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    } else {
        (min - 1.0, max + 1.0)
    }
}

/// Renders the feature 1 / feature 2 scatter coloured by target and returns
/// the path of the PNG it wrote.
pub fn render_scatter(
    table: &Table,
    selection: ValidSelection<'_>,
    settings: &PlotSettings,
) -> Result<PathBuf, PlotError> {
    if table.is_empty() {
        return Err(PlotError::NoRows);
    }
    let xs = table.numeric_column(selection.feature1)?;
    let ys = table.numeric_column(selection.feature2)?;
    let (values, scale) = colour_values(table, selection.target)?;

    let path = tempfile::Builder::new()
        .prefix("predict-plot-")
        .suffix(".png")
        .tempfile()?
        .into_temp_path()
        .keep()
        .map_err(std::io::Error::from)?;

    let points: Vec<(f64, f64, RGBColor)> = xs
        .iter()
        .zip(&ys)
        .zip(&values)
        .map(|((x, y), v)| (*x, *y, scale.colour(*v)))
        .collect();

    if let Err(err) = draw(&path, &points, &scale, selection, settings) {
        if let Err(io_err) = std::fs::remove_file(&path) {
            tracing::debug!(path = %path.display(), "could not remove unfinished plot: {io_err}");
        }
        return Err(err);
    }
    tracing::info!(path = %path.display(), points = points.len(), "rendered scatter plot");
    Ok(path)
}

fn draw(
    path: &Path,
    points: &[(f64, f64, RGBColor)],
    scale: &ColourScale,
    selection: ValidSelection<'_>,
    settings: &PlotSettings,
) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let (plot_area, bar_area) =
        root.split_horizontally(settings.width as i32 - COLOUR_BAR_WIDTH);

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_min, x_max) = padded_range(&xs);
    let (y_min, y_max) = padded_range(&ys);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(
            format!(
                "{} vs {} (Target: {})",
                selection.feature1, selection.feature2, selection.target
            ),
            ("sans-serif", 22),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_desc(selection.feature1)
        .y_desc(selection.feature2)
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y, colour)| Circle::new((*x, *y), POINT_RADIUS, colour.filled())),
        )
        .map_err(draw_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y, _)| Circle::new((*x, *y), POINT_RADIUS, BLACK.stroke_width(1))),
        )
        .map_err(draw_err)?;

    draw_colour_bar(&bar_area, scale, selection.target)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_colour_bar(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    scale: &ColourScale,
    target: &str,
) -> Result<(), PlotError> {
    let (lo, hi) = scale.bar_range();
    let mut bar = ChartBuilder::on(area)
        .margin_top(52)
        .margin_bottom(60)
        .margin_right(20)
        .y_label_area_size(110)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(draw_err)?;

    match scale {
        ColourScale::Continuous { .. } => {
            let step = (hi - lo) / COLOUR_BAR_STEPS as f64;
            bar.draw_series((0..COLOUR_BAR_STEPS).map(|i| {
                let from = lo + step * i as f64;
                let to = from + step;
                Rectangle::new([(0.0, from), (1.0, to)], scale.colour((from + to) / 2.0).filled())
            }))
            .map_err(draw_err)?;
            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .label_style(BAR_LABEL_FONT)
                .axis_desc_style(BAR_DESC_FONT)
                .y_desc(target)
                .draw()
                .map_err(draw_err)?;
        }
        ColourScale::Categorical(classes) => {
            bar.draw_series(classes.iter().enumerate().map(|(i, _)| {
                let centre = i as f64;
                Rectangle::new(
                    [(0.0, centre - 0.5), (1.0, centre + 0.5)],
                    scale.colour(centre).filled(),
                )
            }))
            .map_err(draw_err)?;
            let class_label = |v: &f64| {
                let idx = v.round();
                if (v - idx).abs() < 1e-6 && idx >= 0.0 {
                    classes.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            };
            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_labels(classes.len())
                .y_label_formatter(&class_label)
                .label_style(BAR_LABEL_FONT)
                .axis_desc_style(BAR_DESC_FONT)
                .y_desc(target)
                .draw()
                .map_err(draw_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn table(text: &str) -> Table {
        Table::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_numeric_target_is_continuous() {
        let t = table("x,y,t\n1,2,0.5\n3,4,2.5\n5,6,1.0\n");
        let (values, scale) = colour_values(&t, "t").unwrap();
        assert_eq!(values, vec![0.5, 2.5, 1.0]);
        assert_eq!(scale, ColourScale::Continuous { min: 0.5, max: 2.5 });
    }

    #[test]
    fn test_text_target_is_categorical() {
        let t = table("x,y,t\n1,2,dog\n3,4,cat\n5,6,dog\n");
        let (values, scale) = colour_values(&t, "t").unwrap();
        assert_eq!(values, vec![1.0, 0.0, 1.0]);
        assert_eq!(
            scale,
            ColourScale::Categorical(vec!["cat".to_string(), "dog".to_string()])
        );
        assert_eq!(scale.bar_range(), (-0.5, 1.5));
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let t = table("x,y,t\n1,2,\n");
        assert!(matches!(
            colour_values(&t, "t"),
            Err(PlotError::Table(TableError::MissingValue { .. }))
        ));
    }

    #[test]
    fn test_colour_ends_follow_viridis() {
        let scale = ColourScale::Continuous { min: 0.0, max: 10.0 };
        let low = scale.colour(0.0);
        let high = scale.colour(10.0);
        // Viridis runs from dark purple to bright yellow.
        assert!(low.2 > low.1);
        assert!(high.0 > high.2 && high.1 > high.2);
        assert_eq!(scale.colour(-5.0), low);
    }

    #[test]
    fn test_flat_scale_does_not_divide_by_zero() {
        let scale = ColourScale::Continuous { min: 3.0, max: 3.0 };
        let _ = scale.colour(3.0);
        assert_eq!(scale.bar_range(), (2.5, 3.5));
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range(&[0.0, 10.0]);
        assert_abs_diff_eq!(lo, -0.5);
        assert_abs_diff_eq!(hi, 10.5);
        assert_eq!(padded_range(&[2.0, 2.0]), (1.0, 3.0));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let t = table("x,y,t\n");
        let selection = ValidSelection {
            feature1: "x",
            feature2: "y",
            target: "t",
        };
        let result = render_scatter(&t, selection, &PlotSettings::default());
        assert!(matches!(result, Err(PlotError::NoRows)));
    }

    fn assert_rendered(text: &str) {
        let t = table(text);
        let selection = ValidSelection {
            feature1: "x",
            feature2: "y",
            target: "t",
        };
        let settings = PlotSettings::default();
        let path = render_scatter(&t, selection, &settings).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("predict-plot-"), "{name}");
        assert!(name.ends_with(".png"), "{name}");
        assert!(path.exists());
        let dims = image::image_dimensions(&path).unwrap();
        assert_eq!(dims, (settings.width, settings.height));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_numeric_target() {
        assert_rendered("x,y,t\n1,2,0\n3,4,1\n5,6,0\n");
    }

    #[test]
    fn test_render_categorical_target() {
        assert_rendered("x,y,t\n1,2,cat\n3,4,dog\n5,6,cat\n");
    }
}
