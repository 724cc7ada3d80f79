// src/chart.rs
//! Rasterizes the per-region sums into a bar chart PNG.
//!
//! The composer only sees the resulting [`ChartArtifact`]; how the pixels were
//! produced stays behind the [`ChartRenderer`] trait.

use crate::analysis::GroupedAggregate;
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgb, RgbImage};
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart surface of {width}x{height} px is too small to draw on")]
    InvalidSize { width: u32, height: u32 },
    #[error("values between {min} and {max} cannot be placed on a chart axis")]
    UnplottableRange { min: f64, max: f64 },
    #[error("failed to encode chart image: {0}")]
    Image(#[from] image::ImageError),
}

/// Handle to a chart image written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    path: PathBuf,
}

impl ChartArtifact {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A backend able to turn a grouped aggregate into an image file.
pub trait ChartRenderer {
    /// Writes a chart of `data` to `dest`.
    ///
    /// Returns `Ok(None)` when there is nothing to plot.
    fn render(&self, data: &GroupedAggregate, dest: &Path) -> Result<Option<ChartArtifact>, ChartError>;
}

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const SKY_BLUE: Rgb<u8> = Rgb([135, 206, 235]);
const GRID_GRAY: Rgb<u8> = Rgb([200, 200, 200]);

const GLYPH_SIZE: u32 = 8;
const MIN_SURFACE: u32 = 200;
const MAX_TICKS: usize = 20;

/// A vertical bar chart with y-axis gridlines, one bar per aggregate key.
#[derive(Debug, Clone)]
pub struct BarChartRenderer {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for BarChartRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            title: "Total Sales by Region".to_string(),
            x_label: "Region".to_string(),
            y_label: "Total Sales".to_string(),
        }
    }
}

impl BarChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn draw(&self, canvas: &mut Canvas, data: &GroupedAggregate, axis: &ValueAxis) {
        let plot = PlotArea {
            left: 100,
            right: self.width - 30,
            top: 50,
            bottom: self.height - 80,
        };

        canvas.draw_text_centered(&self.title, self.width / 2, 16, 2);

        for tick in axis.ticks() {
            let y = plot.y_for(axis, tick);
            canvas.draw_dashed_hline(plot.left, plot.right, y, GRID_GRAY);
            let label = tick_label(tick);
            let label_width = text_width(&label, 1);
            canvas.draw_text(&label, plot.left.saturating_sub(label_width + 6), y.saturating_sub(GLYPH_SIZE / 2), 1);
        }

        let slot = (plot.right - plot.left) as f64 / data.len() as f64;
        let zero_y = plot.y_for(axis, 0.0);
        let max_label_chars = (slot / GLYPH_SIZE as f64).floor() as usize;
        for (i, (key, value)) in data.iter().enumerate() {
            let x0 = plot.left as f64 + slot * i as f64 + slot * 0.1;
            let x1 = x0 + slot * 0.8;
            let bar_y = plot.y_for(axis, value);
            let (top, bottom) = if bar_y <= zero_y { (bar_y, zero_y) } else { (zero_y, bar_y) };
            canvas.fill_rect(x0.round() as u32, top, x1.round() as u32, bottom, SKY_BLUE);

            let label = truncate_label(key, max_label_chars);
            let center = (plot.left as f64 + slot * (i as f64 + 0.5)).round() as u32;
            canvas.draw_text_centered(&label, center, plot.bottom + 8, 1);
        }

        canvas.draw_vline(plot.left, plot.top, plot.bottom, BLACK);
        canvas.draw_hline(plot.left, plot.right, plot.bottom, BLACK);
        if axis.min < 0.0 {
            canvas.draw_hline(plot.left, plot.right, zero_y, BLACK);
        }

        canvas.draw_text_centered(&self.x_label, (plot.left + plot.right) / 2, plot.bottom + 36, 2);
        let y_label_len = text_width(&self.y_label, 2);
        let y_label_bottom = (plot.top + plot.bottom) / 2 + y_label_len / 2;
        canvas.draw_text_vertical(&self.y_label, 12, y_label_bottom, 2);
    }
}

impl ChartRenderer for BarChartRenderer {
    fn render(&self, data: &GroupedAggregate, dest: &Path) -> Result<Option<ChartArtifact>, ChartError> {
        if data.is_empty() {
            info!("No data to plot; skipping chart");
            return Ok(None);
        }
        if self.width < MIN_SURFACE || self.height < MIN_SURFACE {
            return Err(ChartError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        let axis = ValueAxis::fit(data.iter().map(|(_, v)| v))?;

        // The surface lives only inside this block and is gone before the file is written.
        let image = {
            let mut canvas = Canvas::new(self.width, self.height);
            self.draw(&mut canvas, data, &axis);
            canvas.into_image()
        };

        image.save_with_format(dest, ImageFormat::Png)?;
        debug!("Chart with {} bars written to {}", data.len(), dest.display());
        Ok(Some(ChartArtifact::new(dest)))
    }
}

struct PlotArea {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

impl PlotArea {
    fn y_for(&self, axis: &ValueAxis, value: f64) -> u32 {
        let span = (self.bottom - self.top) as f64;
        let fraction = (value - axis.min) / (axis.max - axis.min);
        (self.bottom as f64 - fraction * span).round().clamp(self.top as f64, self.bottom as f64) as u32
    }
}

/// Value range of the y-axis, widened to round tick values and always including zero.
#[derive(Debug, Clone, PartialEq)]
struct ValueAxis {
    min: f64,
    max: f64,
    step: f64,
}

impl ValueAxis {
    /// Fails when the rounded range leaves the finite `f64` domain.
    fn fit(values: impl Iterator<Item = f64>) -> Result<Self, ChartError> {
        let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let hi = if hi - lo <= f64::EPSILON { lo + 1.0 } else { hi };
        let step = nice_step((hi - lo) / 5.0);
        let axis = Self {
            min: (lo / step).floor() * step,
            max: (hi / step).ceil() * step,
            step,
        };
        if axis.min.is_finite() && axis.max.is_finite() && axis.step.is_finite() && axis.step > 0.0 {
            Ok(axis)
        } else {
            Err(ChartError::UnplottableRange { min: lo, max: hi })
        }
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let count = (((self.max - self.min) / self.step).round() as usize).min(MAX_TICKS);
        (0..=count).map(move |k| self.min + self.step * k as f64)
    }
}

fn nice_step(raw: f64) -> f64 {
    let base = 10f64.powf(raw.log10().floor());
    let fraction = raw / base;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

fn tick_label(value: f64) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1e9 {
        (value / 1e9, "B")
    } else if magnitude >= 1e6 {
        (value / 1e6, "M")
    } else if magnitude >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    let text = format!("{:.2}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let text = if text == "-0" { "0" } else { text };
    format!("{}{}", text, suffix)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    let count = label.chars().count();
    if count <= max_chars {
        label.to_string()
    } else if max_chars <= 2 {
        label.chars().take(max_chars).collect()
    } else {
        let mut short: String = label.chars().take(max_chars - 2).collect();
        short.push_str("..");
        short
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// An RGB drawing surface with the handful of primitives a bar chart needs.
struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    fn into_image(self) -> RgbImage {
        self.image
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        if x < self.image.width() && y < self.image.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.put(x, y, color);
            }
        }
    }

    fn draw_hline(&mut self, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
        self.fill_rect(x0, y, x1, y, color);
    }

    fn draw_vline(&mut self, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
        self.fill_rect(x, y0, x, y1, color);
    }

    fn draw_dashed_hline(&mut self, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
        for x in x0..=x1 {
            if ((x - x0) / 6) % 2 == 0 {
                self.put(x, y, color);
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: u32, y: u32, scale: u32) {
        for (i, c) in text.chars().enumerate() {
            let origin_x = x + i as u32 * GLYPH_SIZE * scale;
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) != 0 {
                        let px = origin_x + col * scale;
                        let py = y + row as u32 * scale;
                        self.fill_rect(px, py, px + scale - 1, py + scale - 1, BLACK);
                    }
                }
            }
        }
    }

    fn draw_text_centered(&mut self, text: &str, center_x: u32, y: u32, scale: u32) {
        let x = center_x.saturating_sub(text_width(text, scale) / 2);
        self.draw_text(text, x, y, scale);
    }

    /// Draws `text` rotated a quarter turn counter-clockwise, reading bottom to top from `bottom`.
    fn draw_text_vertical(&mut self, text: &str, x: u32, bottom: u32, scale: u32) {
        for (i, c) in text.chars().enumerate() {
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) != 0 {
                        let along = (i as u32 * GLYPH_SIZE + col + 1) * scale;
                        let Some(py) = bottom.checked_sub(along) else { continue };
                        let px = x + row as u32 * scale;
                        self.fill_rect(px, py, px + scale - 1, py + scale - 1, BLACK);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn regions(pairs: &[(&str, f64)]) -> GroupedAggregate {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn empty_aggregate_produces_no_chart() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chart.png");
        let result = BarChartRenderer::new().render(&GroupedAggregate::default(), &dest).unwrap();
        assert!(result.is_none());
        assert!(!dest.exists());
    }

    #[test]
    fn writes_png_with_bars_in_sky_blue() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chart.png");
        let artifact = BarChartRenderer::new()
            .render(&regions(&[("East", 100.0)]), &dest)
            .unwrap()
            .expect("chart should be produced");
        assert_eq!(artifact.path(), dest.as_path());

        let image = image::open(&dest).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (800, 500));
        // Single bar spans the middle of the plot area.
        assert_eq!(*image.get_pixel(435, 250), SKY_BLUE);
        // Outside the plot area stays white.
        assert_eq!(*image.get_pixel(795, 495), WHITE);
    }

    #[test]
    fn rendering_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let data = regions(&[("East", 1500.0), ("West", 320.5), ("North", 980.0)]);
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        BarChartRenderer::new().render(&data, &a).unwrap();
        BarChartRenderer::new().render(&data, &b).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing").join("chart.png");
        let err = BarChartRenderer::new().render(&regions(&[("East", 1.0)]), &dest).unwrap_err();
        assert!(matches!(err, ChartError::Image(_)));
    }

    #[test]
    fn tiny_surface_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = BarChartRenderer::new()
            .with_size(50, 50)
            .render(&regions(&[("East", 1.0)]), &dir.path().join("c.png"))
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidSize { .. }));
    }

    #[test]
    fn axis_includes_zero_and_rounds_outward() {
        let axis = ValueAxis::fit([120.0, 480.0].into_iter()).unwrap();
        assert_eq!(axis.min, 0.0);
        assert_eq!(axis.max, 500.0);
        assert_eq!(axis.step, 100.0);

        let negative = ValueAxis::fit([-30.0, 70.0].into_iter()).unwrap();
        assert_eq!(negative.min, -40.0);
        assert_eq!(negative.max, 80.0);
        assert_eq!(negative.ticks().count(), 7);
    }

    #[test]
    fn sums_near_the_float_limit_are_rejected() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chart.png");
        for value in [1.6e308, -1.6e308] {
            let err = BarChartRenderer::new()
                .render(&regions(&[("East", value)]), &dest)
                .unwrap_err();
            assert!(matches!(err, ChartError::UnplottableRange { .. }), "{:?}", err);
        }
        let spread = regions(&[("East", 1e308), ("West", -1e308)]);
        assert!(BarChartRenderer::new().render(&spread, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn large_but_representable_sums_still_draw() {
        let axis = ValueAxis::fit([4.2e12].into_iter()).unwrap();
        assert!(axis.max >= 4.2e12);
        assert!(axis.ticks().count() <= MAX_TICKS + 1);
    }

    #[test]
    fn labels_are_compact() {
        assert_eq!(tick_label(0.0), "0");
        assert_eq!(tick_label(250.0), "250");
        assert_eq!(tick_label(1500.0), "1.5K");
        assert_eq!(tick_label(2_000_000.0), "2M");
        assert_eq!(truncate_label("Northwest", 6), "Nort..");
        assert_eq!(truncate_label("East", 6), "East");
    }
}
