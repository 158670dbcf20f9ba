//! Raster rendering backend.
//!
//! [`RasterBackend`] keeps the figure description the faceting engine builds
//! (grid, panels, lines, legend, sliders) and repaints a [`Framebuffer`] on
//! every [`RenderBackend::draw`]. Frames can be exported as PNG.
//!
//! The canvas is split into a caption band at the top, a legend strip on the
//! right (only when a legend exists) and the panel grid, with panels packed
//! edge to edge. Text (titles, caption, legend labels) is kept as metadata and
//! is not rasterized; legend entries are drawn as color swatches.

mod primitives;

pub use primitives::{draw_circle, draw_line_aa, draw_polyline, draw_rect_outline};

use std::path::Path;

use tracing::trace;

use crate::backend::{LegendEntry, LineId, LineStyle, PanelId, RenderBackend, SliderId, SliderSpec};
use crate::color::Rgba;
use crate::config::FigureConfig;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::layout::GridCell;
use crate::output::PngEncoder;
use crate::scale::LinearScale;

/// Height of the caption band in pixels.
const CAPTION_BAND: u32 = 24;
/// Width of the legend strip in pixels.
const LEGEND_STRIP: u32 = 48;
/// Inner padding between a panel border and its plot area.
const PANEL_PADDING: u32 = 6;
/// Number of tick marks on a shared value axis.
const VALUE_TICKS: u32 = 5;

/// A pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Debug, Clone)]
struct RasterPanel {
    cell: GridCell,
    value_ticks: bool,
    title: Option<String>,
    limits: Option<((f64, f64), (f64, f64))>,
}

#[derive(Debug, Clone)]
struct RasterLine {
    panel: PanelId,
    style: LineStyle,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Backend that paints the figure into an RGBA framebuffer.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    frame: Framebuffer,
    background: Rgba,
    grid: (usize, usize),
    panels: Vec<RasterPanel>,
    lines: Vec<RasterLine>,
    legend: Option<(String, Vec<LegendEntry>)>,
    sliders: Vec<SliderSpec>,
    caption: Option<String>,
    frames: usize,
}

impl RasterBackend {
    /// Create a backend with a `width` x `height` canvas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            frame: Framebuffer::new(width, height)?,
            background: Rgba::WHITE,
            grid: (0, 0),
            panels: Vec::new(),
            lines: Vec::new(),
            legend: None,
            sliders: Vec::new(),
            caption: None,
            frames: 0,
        })
    }

    /// Create a backend sized from a figure config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the configured size is zero.
    pub fn from_config(config: &FigureConfig) -> Result<Self> {
        Self::new(config.width, config.height)
    }

    /// Set the canvas background color.
    #[must_use]
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// The most recently drawn frame.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.frame
    }

    /// Number of frames drawn.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Current figure caption.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Title of a panel.
    #[must_use]
    pub fn panel_title(&self, panel: PanelId) -> Option<&str> {
        self.panels.get(panel.0).and_then(|p| p.title.as_deref())
    }

    /// Legend title and entries.
    #[must_use]
    pub fn legend(&self) -> Option<&(String, Vec<LegendEntry>)> {
        self.legend.as_ref()
    }

    /// Slider controls in creation order.
    #[must_use]
    pub fn sliders(&self) -> &[SliderSpec] {
        &self.sliders
    }

    /// Canvas rectangle occupied by a panel.
    #[must_use]
    pub fn panel_rect(&self, panel: PanelId) -> Option<PixelRect> {
        self.panels.get(panel.0).map(|p| self.cell_rect(p.cell))
    }

    /// Encode the last frame as PNG and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_png(&self, path: impl AsRef<Path>) -> Result<()> {
        PngEncoder::write_to_file(&self.frame, path)
    }

    /// Encode the last frame as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.frame)
    }

    fn grid_area(&self) -> PixelRect {
        let legend = if self.legend.is_some() { LEGEND_STRIP } else { 0 };
        PixelRect {
            x: 0,
            y: CAPTION_BAND.min(self.frame.height()),
            width: self.frame.width().saturating_sub(legend),
            height: self.frame.height().saturating_sub(CAPTION_BAND),
        }
    }

    fn cell_rect(&self, cell: GridCell) -> PixelRect {
        let area = self.grid_area();
        let (rows, cols) = (self.grid.0.max(1) as u32, self.grid.1.max(1) as u32);
        let (w, h) = (area.width / cols, area.height / rows);
        PixelRect { x: area.x + cell.col as u32 * w, y: area.y + cell.row as u32 * h, width: w, height: h }
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut RasterPanel> {
        self.panels.get_mut(id.0).ok_or_else(|| Error::Backend(format!("unknown panel {}", id.0)))
    }

    fn paint_panel(&mut self, index: usize) -> Result<()> {
        let panel = &self.panels[index];
        let rect = self.cell_rect(panel.cell);
        draw_rect_outline(&mut self.frame, rect.x, rect.y, rect.width, rect.height, Rgba::GREY);

        let inner = PixelRect {
            x: rect.x + PANEL_PADDING,
            y: rect.y + PANEL_PADDING,
            width: rect.width.saturating_sub(2 * PANEL_PADDING),
            height: rect.height.saturating_sub(2 * PANEL_PADDING),
        };
        if inner.width == 0 || inner.height == 0 {
            return Ok(());
        }

        if panel.value_ticks {
            for k in 0..VALUE_TICKS {
                let y = inner.y + k * (inner.height - 1) / (VALUE_TICKS - 1);
                self.frame.fill_rect(rect.x, y, PANEL_PADDING / 2, 1, Rgba::BLACK);
            }
        }

        let Some((xlim, ylim)) = panel.limits else {
            return Ok(());
        };
        let xscale = LinearScale::new(xlim, (f64::from(inner.x), f64::from(inner.x + inner.width - 1)))?;
        let yscale = LinearScale::new(ylim, (f64::from(inner.y + inner.height - 1), f64::from(inner.y)))?;

        let id = PanelId(index);
        for line in self.lines.iter().filter(|l| l.panel == id) {
            let points: Vec<(f32, f32)> = line
                .xs
                .iter()
                .zip(&line.ys)
                .map(|(&x, &y)| {
                    if xscale.contains(x) && yscale.contains(y) {
                        (xscale.scale(x) as f32, yscale.scale(y) as f32)
                    } else {
                        (f32::NAN, f32::NAN)
                    }
                })
                .collect();

            draw_polyline(&mut self.frame, &points, line.style.width, line.style.color);
            if line.style.markers {
                let radius = (line.style.width + 1.0).round() as i32;
                for &(px, py) in points.iter().filter(|(px, py)| px.is_finite() && py.is_finite()) {
                    draw_circle(&mut self.frame, px.round() as i32, py.round() as i32, radius, line.style.color);
                }
            }
            trace!(panel = index, points = points.len(), "painted line");
        }
        Ok(())
    }

    fn paint_legend(&mut self) {
        let Some((_, entries)) = &self.legend else {
            return;
        };
        let area = self.grid_area();
        let x = area.x + area.width + LEGEND_STRIP / 4;
        let swatch = LEGEND_STRIP / 2;
        let colors: Vec<Rgba> =
            entries.iter().filter_map(|e| self.lines.get(e.line.0).map(|l| l.style.color)).collect();
        for (k, color) in colors.into_iter().enumerate() {
            let y = area.y + PANEL_PADDING + k as u32 * (swatch / 2 + 4);
            self.frame.fill_rect(x, y, swatch, swatch / 2, color);
        }
    }
}

impl RenderBackend for RasterBackend {
    fn create_grid(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.grid = (rows, cols);
        Ok(())
    }

    fn create_panel(&mut self, cell: GridCell, value_ticks: bool) -> Result<PanelId> {
        self.panels.push(RasterPanel { cell, value_ticks, title: None, limits: None });
        Ok(PanelId(self.panels.len() - 1))
    }

    fn set_panel_limits(&mut self, panel: PanelId, xlim: (f64, f64), ylim: (f64, f64)) -> Result<()> {
        LinearScale::new(xlim, (0.0, 1.0))?;
        LinearScale::new(ylim, (0.0, 1.0))?;
        self.panel_mut(panel)?.limits = Some((xlim, ylim));
        Ok(())
    }

    // No glyph rasterizer: size and placement are left to text-capable backends.
    fn set_panel_title(&mut self, panel: PanelId, title: &str, _size: f32) -> Result<()> {
        self.panel_mut(panel)?.title = Some(title.to_string());
        Ok(())
    }

    fn create_line(&mut self, panel: PanelId, style: &LineStyle) -> Result<LineId> {
        if panel.0 >= self.panels.len() {
            return Err(Error::Backend(format!("unknown panel {}", panel.0)));
        }
        self.lines.push(RasterLine { panel, style: *style, xs: Vec::new(), ys: Vec::new() });
        Ok(LineId(self.lines.len() - 1))
    }

    fn set_line_data(&mut self, line: LineId, xs: &[f64], ys: &[f64]) -> Result<()> {
        let target = self.lines.get_mut(line.0).ok_or_else(|| Error::Backend(format!("unknown line {}", line.0)))?;
        target.xs.clear();
        target.xs.extend_from_slice(xs);
        target.ys.clear();
        target.ys.extend_from_slice(ys);
        Ok(())
    }

    fn create_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()> {
        self.legend = Some((title.to_string(), entries.to_vec()));
        Ok(())
    }

    fn create_slider(&mut self, spec: &SliderSpec) -> Result<SliderId> {
        self.sliders.push(spec.clone());
        Ok(SliderId(self.sliders.len() - 1))
    }

    fn set_caption(&mut self, caption: &str) -> Result<()> {
        self.caption = Some(caption.to_string());
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.frame.clear(self.background);
        for index in 0..self.panels.len() {
            self.paint_panel(index)?;
        }
        self.paint_legend();
        self.frames += 1;
        Ok(())
    }
}
