//! Rendering backend capability set.
//!
//! The faceting engine never draws anything itself. It asks a
//! [`RenderBackend`] to create a panel grid, line primitives, a legend and
//! slider controls once, then mutates line buffers and requests one canvas
//! flush per redraw pass.
//!
//! [`RecordingBackend`] keeps every request in memory. It is what tests and
//! headless callers use; [`crate::raster::RasterBackend`] turns the same
//! requests into pixels.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::layout::GridCell;

/// Handle to a panel created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(pub usize);

/// Handle to a line created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(pub usize);

/// Handle to a slider control created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliderId(pub usize);

/// Visual style of a line primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: f32,
    /// Draw a circle marker on every data point.
    pub markers: bool,
}

/// A figure-level legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Displayed label (the line-domain value).
    pub label: String,
    /// Line whose style the entry shows.
    pub line: LineId,
}

/// An integer slider over `0..=max_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderSpec {
    /// Label shown next to the control (the facet column).
    pub label: String,
    /// Largest selectable index.
    pub max_index: usize,
    /// Initially selected index.
    pub initial: usize,
    /// Whether the raw index is displayed.
    pub readout: bool,
}

/// Operations a rendering collaborator must provide.
///
/// Slider controls are created here but their change events are delivered by
/// the caller through [`crate::figure::FacetFigure::set_slider`], which keeps
/// the binding between controls and state static and typed.
pub trait RenderBackend {
    /// Prepare a `rows` x `cols` panel grid with no gaps between panels.
    fn create_grid(&mut self, rows: usize, cols: usize) -> Result<()>;

    /// Create a panel at `cell`. Only panels with `value_ticks` show
    /// tick labels on the shared value axis.
    fn create_panel(&mut self, cell: GridCell, value_ticks: bool) -> Result<PanelId>;

    /// Set a panel's axis limits.
    fn set_panel_limits(&mut self, panel: PanelId, xlim: (f64, f64), ylim: (f64, f64)) -> Result<()>;

    /// Set a panel's title.
    fn set_panel_title(&mut self, panel: PanelId, title: &str, size: f32) -> Result<()>;

    /// Create an empty line on a panel.
    fn create_line(&mut self, panel: PanelId, style: &LineStyle) -> Result<LineId>;

    /// Overwrite a line's data buffer.
    fn set_line_data(&mut self, line: LineId, xs: &[f64], ys: &[f64]) -> Result<()>;

    /// Attach a single legend to the figure.
    fn create_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()>;

    /// Create a slider control.
    fn create_slider(&mut self, spec: &SliderSpec) -> Result<SliderId>;

    /// Set the figure-level caption.
    fn set_caption(&mut self, caption: &str) -> Result<()>;

    /// Flush all pending changes to the canvas.
    fn draw(&mut self) -> Result<()>;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn create_grid(&mut self, rows: usize, cols: usize) -> Result<()> {
        (**self).create_grid(rows, cols)
    }

    fn create_panel(&mut self, cell: GridCell, value_ticks: bool) -> Result<PanelId> {
        (**self).create_panel(cell, value_ticks)
    }

    fn set_panel_limits(&mut self, panel: PanelId, xlim: (f64, f64), ylim: (f64, f64)) -> Result<()> {
        (**self).set_panel_limits(panel, xlim, ylim)
    }

    fn set_panel_title(&mut self, panel: PanelId, title: &str, size: f32) -> Result<()> {
        (**self).set_panel_title(panel, title, size)
    }

    fn create_line(&mut self, panel: PanelId, style: &LineStyle) -> Result<LineId> {
        (**self).create_line(panel, style)
    }

    fn set_line_data(&mut self, line: LineId, xs: &[f64], ys: &[f64]) -> Result<()> {
        (**self).set_line_data(line, xs, ys)
    }

    fn create_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()> {
        (**self).create_legend(title, entries)
    }

    fn create_slider(&mut self, spec: &SliderSpec) -> Result<SliderId> {
        (**self).create_slider(spec)
    }

    fn set_caption(&mut self, caption: &str) -> Result<()> {
        (**self).set_caption(caption)
    }

    fn draw(&mut self) -> Result<()> {
        (**self).draw()
    }
}

/// A panel as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPanel {
    /// Grid position.
    pub cell: GridCell,
    /// Whether value-axis tick labels are shown.
    pub value_ticks: bool,
    /// Title and its font size.
    pub title: Option<(String, f32)>,
    /// Axis limits.
    pub limits: Option<((f64, f64), (f64, f64))>,
}

/// A line as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLine {
    /// Owning panel.
    pub panel: PanelId,
    /// Style at creation.
    pub style: LineStyle,
    /// Current x buffer.
    pub xs: Vec<f64>,
    /// Current y buffer.
    pub ys: Vec<f64>,
}

/// In-memory backend that records every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    grid: Option<(usize, usize)>,
    panels: Vec<RecordedPanel>,
    lines: Vec<RecordedLine>,
    legend: Option<(String, Vec<LegendEntry>)>,
    sliders: Vec<SliderSpec>,
    caption: Option<String>,
    draws: usize,
    calls: usize,
}

impl RecordingBackend {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid shape, once created.
    #[must_use]
    pub fn grid(&self) -> Option<(usize, usize)> {
        self.grid
    }

    /// Panels in creation order.
    #[must_use]
    pub fn panels(&self) -> &[RecordedPanel] {
        &self.panels
    }

    /// Lines in creation order.
    #[must_use]
    pub fn lines(&self) -> &[RecordedLine] {
        &self.lines
    }

    /// Line by handle.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&RecordedLine> {
        self.lines.get(id.0)
    }

    /// Legend title and entries, if one was attached.
    #[must_use]
    pub fn legend(&self) -> Option<&(String, Vec<LegendEntry>)> {
        self.legend.as_ref()
    }

    /// Slider controls in creation order.
    #[must_use]
    pub fn sliders(&self) -> &[SliderSpec] {
        &self.sliders
    }

    /// Current figure caption.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Number of canvas flushes so far.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Total number of backend requests so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut RecordedPanel> {
        self.panels.get_mut(id.0).ok_or_else(|| Error::Backend(format!("unknown panel {}", id.0)))
    }
}

impl RenderBackend for RecordingBackend {
    fn create_grid(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.calls += 1;
        self.grid = Some((rows, cols));
        Ok(())
    }

    fn create_panel(&mut self, cell: GridCell, value_ticks: bool) -> Result<PanelId> {
        self.calls += 1;
        self.panels.push(RecordedPanel { cell, value_ticks, title: None, limits: None });
        Ok(PanelId(self.panels.len() - 1))
    }

    fn set_panel_limits(&mut self, panel: PanelId, xlim: (f64, f64), ylim: (f64, f64)) -> Result<()> {
        self.calls += 1;
        self.panel_mut(panel)?.limits = Some((xlim, ylim));
        Ok(())
    }

    fn set_panel_title(&mut self, panel: PanelId, title: &str, size: f32) -> Result<()> {
        self.calls += 1;
        self.panel_mut(panel)?.title = Some((title.to_string(), size));
        Ok(())
    }

    fn create_line(&mut self, panel: PanelId, style: &LineStyle) -> Result<LineId> {
        self.calls += 1;
        if panel.0 >= self.panels.len() {
            return Err(Error::Backend(format!("unknown panel {}", panel.0)));
        }
        self.lines.push(RecordedLine { panel, style: *style, xs: Vec::new(), ys: Vec::new() });
        Ok(LineId(self.lines.len() - 1))
    }

    fn set_line_data(&mut self, line: LineId, xs: &[f64], ys: &[f64]) -> Result<()> {
        self.calls += 1;
        let recorded = self
            .lines
            .get_mut(line.0)
            .ok_or_else(|| Error::Backend(format!("unknown line {}", line.0)))?;
        recorded.xs = xs.to_vec();
        recorded.ys = ys.to_vec();
        Ok(())
    }

    fn create_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()> {
        self.calls += 1;
        self.legend = Some((title.to_string(), entries.to_vec()));
        Ok(())
    }

    fn create_slider(&mut self, spec: &SliderSpec) -> Result<SliderId> {
        self.calls += 1;
        self.sliders.push(spec.clone());
        Ok(SliderId(self.sliders.len() - 1))
    }

    fn set_caption(&mut self, caption: &str) -> Result<()> {
        self.calls += 1;
        self.caption = Some(caption.to_string());
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        self.calls += 1;
        self.draws += 1;
        Ok(())
    }
}
